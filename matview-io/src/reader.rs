//! Matrix file readers.
//!
//! Two formats are understood:
//!
//! * Text: one matrix row per line, values separated by whitespace or commas.
//!   The first data line is row `y = 0`. `#` starts a comment; lines that do
//!   not parse as numbers are skipped with a warning.
//! * TIFF: a single-channel (grayscale) image of any integer or float sample
//!   type. The bottom image row becomes `y = 0` so the matrix shows upright.

use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use matview_core::DenseMatrix;
use memmap2::Mmap;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::ColorType;

use crate::{Error, Result};

/// A memory-mapped matrix file.
pub struct MappedFileReader {
    mmap: Mmap,
    path: PathBuf,
}

impl MappedFileReader {
    /// Opens a file for memory-mapped reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        // SAFETY: The file is opened read-only and we assume it is not modified concurrently.
        // This is the standard safety contract for memory mapping.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self {
            mmap,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Returns the file contents as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap[..]
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Returns true if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Format chosen from the file extension, falling back to content sniffing.
    #[must_use]
    pub fn format(&self) -> MatrixFormat {
        MatrixFormat::from_path(&self.path).unwrap_or_else(|| MatrixFormat::sniff(self.as_bytes()))
    }

    /// Decode the file into a matrix.
    ///
    /// # Errors
    /// Returns an error if the contents are not a valid matrix in the detected format.
    pub fn read_matrix(&self) -> Result<DenseMatrix> {
        let format = self.format();
        debug!("reading {} as {format:?}", self.path.display());
        match format {
            MatrixFormat::Text => {
                let text = std::str::from_utf8(self.as_bytes()).map_err(|e| {
                    Error::InvalidFormat(format!("{}: not UTF-8 text: {e}", self.path.display()))
                })?;
                parse_text(text)
            }
            MatrixFormat::Tiff => decode_tiff(self.as_bytes()),
        }
    }
}

/// Supported matrix file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixFormat {
    Text,
    Tiff,
}

impl MatrixFormat {
    /// Format implied by the file extension, if recognised.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "tif" | "tiff" => Some(Self::Tiff),
            "txt" | "dat" | "asc" | "csv" | "mtx" => Some(Self::Text),
            _ => None,
        }
    }

    /// Guess the format from the leading bytes.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
            Self::Tiff
        } else {
            Self::Text
        }
    }
}

/// Load a matrix file, choosing the format from its extension or contents.
///
/// # Errors
/// Returns an error if the file cannot be read or decoded.
pub fn load_matrix<P: AsRef<Path>>(path: P) -> Result<DenseMatrix> {
    MappedFileReader::open(path)?.read_matrix()
}

/// Parse a text matrix.
///
/// Non-numeric lines before the first data row are treated as a header and
/// skipped.
///
/// # Errors
/// Returns [`Error::InvalidFormat`] for ragged rows, a non-numeric line after
/// the data has started, or when no data line is found.
pub fn parse_text(text: &str) -> Result<DenseMatrix> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let data = line.split_once('#').map_or(line, |(data, _)| data).trim();
        if data.is_empty() {
            continue;
        }
        let parsed: std::result::Result<Vec<f64>, _> = data
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(str::parse::<f64>)
            .collect();
        let values = match parsed {
            Ok(values) => values,
            Err(err) if rows.is_empty() => {
                warn!("skipping header line {}: {err}", index + 1);
                continue;
            }
            Err(err) => {
                return Err(Error::InvalidFormat(format!("line {}: {err}", index + 1)));
            }
        };
        if let Some(first) = rows.first() {
            if first.len() != values.len() {
                return Err(Error::InvalidFormat(format!(
                    "line {}: expected {} columns, found {}",
                    index + 1,
                    first.len(),
                    values.len()
                )));
            }
        }
        rows.push(values);
    }

    let height = rows.len();
    let width = rows.first().map_or(0, Vec::len);
    if width == 0 {
        return Err(Error::InvalidFormat("no matrix data found".to_string()));
    }
    let data: Vec<f64> = rows.into_iter().flatten().collect();
    DenseMatrix::from_vec(width, height, data)
        .ok_or_else(|| Error::InvalidFormat(format!("inconsistent {width}x{height} matrix")))
}

/// Decode a grayscale TIFF image held in memory.
///
/// # Errors
/// Returns an error for malformed TIFF data or multi-channel images.
#[allow(clippy::cast_precision_loss)]
pub fn decode_tiff(bytes: &[u8]) -> Result<DenseMatrix> {
    let mut decoder = Decoder::new(Cursor::new(bytes))?;
    let (width, height) = decoder.dimensions()?;
    match decoder.colortype()? {
        ColorType::Gray(_) => {}
        other => {
            return Err(Error::InvalidFormat(format!(
                "expected a single-channel TIFF, found {other:?}"
            )))
        }
    }

    let samples: Vec<f64> = match decoder.read_image()? {
        DecodingResult::U8(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::U16(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::U32(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::U64(data) => data.into_iter().map(|v| v as f64).collect(),
        DecodingResult::I8(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::I16(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::I32(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::I64(data) => data.into_iter().map(|v| v as f64).collect(),
        DecodingResult::F32(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::F64(data) => data,
        #[allow(unreachable_patterns)]
        _ => {
            return Err(Error::InvalidFormat(
                "unsupported TIFF sample format".to_string(),
            ))
        }
    };

    let width = usize::try_from(width)
        .map_err(|_| Error::InvalidFormat(format!("TIFF width {width} too large")))?;
    let height = usize::try_from(height)
        .map_err(|_| Error::InvalidFormat(format!("TIFF height {height} too large")))?;
    if samples.len() != width * height {
        return Err(Error::InvalidFormat(format!(
            "TIFF holds {} samples for a {width}x{height} image",
            samples.len()
        )));
    }

    // Image rows run top to bottom; matrix rows bottom to top.
    let mut data = Vec::with_capacity(samples.len());
    for row in samples.chunks_exact(width.max(1)).rev() {
        data.extend_from_slice(row);
    }
    DenseMatrix::from_vec(width, height, data)
        .ok_or_else(|| Error::InvalidFormat(format!("inconsistent {width}x{height} TIFF")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use matview_core::Matrix;

    #[test]
    fn test_parse_text_rows_and_comments() {
        let text = "# header\n1 2 3\n\n4,5,6  # trailing\n";
        let matrix = parse_text(text).unwrap();
        assert_eq!(matrix.width(), 3);
        assert_eq!(matrix.height(), 2);
        assert_eq!(matrix.get(0, 0), Some(1.0));
        assert_eq!(matrix.get(2, 1), Some(6.0));
        assert!((matrix.maximum() - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_text_skips_header_lines() {
        let matrix = parse_text("counts\nx y\n1 2\n3 4\n").unwrap();
        assert_eq!(matrix.height(), 2);
        assert_eq!(matrix.get(1, 1), Some(4.0));
    }

    #[test]
    fn test_parse_text_rejects_corrupt_row_after_data() {
        match parse_text("1 2\n3 x\n5 6\n") {
            Err(Error::InvalidFormat(msg)) => assert!(msg.starts_with("line 2"), "{msg}"),
            other => panic!("expected InvalidFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_text_rejects_ragged_rows() {
        assert!(matches!(
            parse_text("1 2 3\n4 5\n"),
            Err(Error::InvalidFormat(_))
        ));
        assert!(matches!(parse_text("# nothing\n"), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            MatrixFormat::from_path(Path::new("run.TIFF")),
            Some(MatrixFormat::Tiff)
        );
        assert_eq!(
            MatrixFormat::from_path(Path::new("m.dat")),
            Some(MatrixFormat::Text)
        );
        assert_eq!(MatrixFormat::from_path(Path::new("m")), None);
        assert_eq!(MatrixFormat::sniff(b"II*\0rest"), MatrixFormat::Tiff);
        assert_eq!(MatrixFormat::sniff(b"1 2 3"), MatrixFormat::Text);
    }

    #[test]
    fn test_decode_tiff_rejects_garbage() {
        assert!(decode_tiff(b"not a tiff").is_err());
    }
}
