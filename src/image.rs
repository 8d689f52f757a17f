//! Assembling a program image (a raw byte stream) into the big-endian
//! words that become segment 0.

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::ImageError;

/// Read `path` and pack its bytes, four at a time and big-endian, into
/// `u32` words. A trailing group of 1-3 bytes is discarded, matching
/// the reference corpus and the Open Question in the spec: this is
/// logged, not silently swallowed, but never rejected.
pub fn load(path: &Path) -> Result<Vec<u32>, ImageError> {
    let bytes = fs::read(path).map_err(|source| ImageError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let trailing = bytes.len() % 4;
    if trailing != 0 {
        debug!("discarding {trailing} trailing byte(s) of {}: not a whole word", path.display());
    }

    let words = bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn packs_four_bytes_big_endian_per_word() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x00, 0x00, 0x00, 0x07, 0xFF, 0x00, 0x00, 0x01]).unwrap();
        let words = load(file.path()).unwrap();
        assert_eq!(words, vec![7, 0xFF00_0001]);
    }

    #[test]
    fn discards_a_trailing_partial_word() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x00, 0x00, 0x00, 0x01, 0xAB, 0xCD]).unwrap();
        let words = load(file.path()).unwrap();
        assert_eq!(words, vec![1]);
    }

    #[test]
    fn missing_file_is_an_image_error() {
        let missing = Path::new("/nonexistent/path/to/nowhere.um");
        assert!(matches!(load(missing), Err(ImageError::Read { .. })));
    }
}
