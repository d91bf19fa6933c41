//! Matrix file writers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;
use matview_core::{DenseMatrix, Matrix};
use tiff::encoder::{colortype, TiffEncoder};

use crate::{Error, Result};

/// Write a matrix as text, one row per line starting at `y = 0`.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn save_matrix_text<P: AsRef<Path>>(matrix: &DenseMatrix, path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(&path)?);
    writeln!(writer, "# {} x {}", matrix.width(), matrix.height())?;
    for row in matrix.data().chunks(matrix.width().max(1)) {
        let line: Vec<String> = row.iter().map(f64::to_string).collect();
        writeln!(writer, "{}", line.join(" "))?;
    }
    writer.flush()?;
    debug!("wrote text matrix to {}", path.as_ref().display());
    Ok(())
}

/// Write a matrix as a 64-bit float grayscale TIFF, top row first.
///
/// # Errors
/// Returns an error if the file cannot be written or the matrix is too
/// large for TIFF dimensions.
pub fn save_matrix_tiff<P: AsRef<Path>>(matrix: &DenseMatrix, path: P) -> Result<()> {
    let width = u32::try_from(matrix.width())
        .map_err(|_| Error::InvalidFormat(format!("width {} too large", matrix.width())))?;
    let height = u32::try_from(matrix.height())
        .map_err(|_| Error::InvalidFormat(format!("height {} too large", matrix.height())))?;

    let mut samples = Vec::with_capacity(matrix.data().len());
    for row in matrix.data().chunks(matrix.width().max(1)).rev() {
        samples.extend_from_slice(row);
    }

    let mut writer = BufWriter::new(File::create(&path)?);
    let mut encoder = TiffEncoder::new(&mut writer)?;
    encoder.write_image::<colortype::Gray64Float>(width, height, &samples)?;
    writer.flush()?;
    debug!("wrote TIFF matrix to {}", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_matrix;
    use tempfile::tempdir;

    fn sample() -> DenseMatrix {
        DenseMatrix::from_vec(3, 2, vec![0.0, 1.0, 2.0, 10.0, 11.5, 12.0]).unwrap()
    }

    #[test]
    fn test_text_written_matrix_loads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.txt");
        save_matrix_text(&sample(), &path).unwrap();
        assert_eq!(load_matrix(&path).unwrap(), sample());
    }

    #[test]
    fn test_tiff_keeps_orientation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.tif");
        save_matrix_tiff(&sample(), &path).unwrap();
        let loaded = load_matrix(&path).unwrap();
        assert_eq!(loaded.get(0, 1), Some(10.0));
        assert_eq!(loaded.get(1, 1), Some(11.5));
        assert_eq!(loaded, sample());
    }
}
