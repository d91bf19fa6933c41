//! Cut and view-configuration files (JSON).

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;
use matview_core::{Cut, ViewConfig};
use serde::{Deserialize, Serialize};

use crate::Result;

/// On-disk layout of a cut file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CutFile {
    pub cuts: Vec<Cut>,
}

/// Read cuts from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or is not a valid cut file.
pub fn load_cuts<P: AsRef<Path>>(path: P) -> Result<Vec<Cut>> {
    let reader = BufReader::new(File::open(&path)?);
    let file: CutFile = serde_json::from_reader(reader)?;
    debug!(
        "loaded {} cuts from {}",
        file.cuts.len(),
        path.as_ref().display()
    );
    Ok(file.cuts)
}

/// Write cuts to a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn save_cuts<P: AsRef<Path>>(cuts: &[Cut], path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(&path)?);
    let file = CutFile {
        cuts: cuts.to_vec(),
    };
    serde_json::to_writer_pretty(&mut writer, &file)?;
    writer.flush()?;
    Ok(())
}

/// Read and validate a view configuration; missing fields take defaults.
///
/// # Errors
/// Returns an error if the file cannot be parsed or the configuration is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ViewConfig> {
    let reader = BufReader::new(File::open(&path)?);
    let config: ViewConfig = serde_json::from_reader(reader)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use tempfile::tempdir;

    #[test]
    fn test_cuts_survive_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cuts.json");
        let cuts = vec![
            Cut::new("gate", vec![(1.0, 2.0), (3.0, 4.0), (5.0, 0.5)], false),
            Cut::new("swapped", vec![(0.0, 0.0), (9.0, 9.0)], true).with_color([1, 2, 3, 255]),
        ];
        save_cuts(&cuts, &path).unwrap();
        assert_eq!(load_cuts(&path).unwrap(), cuts);
    }

    #[test]
    fn test_cut_defaults_apply() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cuts.json");
        std::fs::write(&path, r#"{"cuts": [{"name": "a", "points": [[0, 0], [1, 1]]}]}"#).unwrap();
        let cuts = load_cuts(&path).unwrap();
        assert!(!cuts[0].invert_axes);
        assert_eq!(cuts[0].points, vec![(0.0, 0.0), (1.0, 1.0)]);
    }

    #[test]
    fn test_config_is_validated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("view.json");
        std::fs::write(&path, r#"{"zoom_step": 4.0, "log_scale": true}"#).unwrap();
        let config = load_config(&path).unwrap();
        assert!(config.log_scale);
        assert_eq!(config.tile_margin, 1);

        std::fs::write(&path, r#"{"zoom_step": 0.5}"#).unwrap();
        assert!(matches!(load_config(&path), Err(Error::CoreError(_))));
    }
}
