use std::fs;
use std::path::Path;

use super::UmError;

/// Decodes a program image: big-endian 32-bit words, no header or footer.
pub fn words_from_bytes(bytes: &[u8]) -> Result<Vec<u32>, UmError> {
    if bytes.len() % 4 != 0 {
        return Err(UmError::InvalidProgram { len: bytes.len() });
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Reads and decodes the program file at `path`.
pub fn read_program(path: impl AsRef<Path>) -> Result<Vec<u32>, UmError> {
    let path = path.as_ref();
    let span = tracing::info_span!("read_program", path = %path.display());
    let _guard = span.enter();

    let bytes = fs::read(path).map_err(|e| UmError::FileRead {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let words = words_from_bytes(&bytes)?;
    tracing::info!(words = words.len(), "Program read");
    Ok(words)
}

/// Inverse of [`words_from_bytes`].
pub fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_be_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_are_big_endian() {
        let bytes = [0xD0, 0x00, 0x00, 0x07, 0x70, 0x00, 0x00, 0x00];
        assert_eq!(
            words_from_bytes(&bytes),
            Ok(vec![0xD000_0007, 0x7000_0000])
        );
    }

    #[test]
    fn test_empty_image_is_empty_program() {
        assert_eq!(words_from_bytes(&[]), Ok(vec![]));
    }

    #[test]
    fn test_truncated_image_is_rejected() {
        assert_eq!(
            words_from_bytes(&[0x70, 0x00, 0x00]),
            Err(UmError::InvalidProgram { len: 3 })
        );
        assert_eq!(
            words_from_bytes(&[0; 9]),
            Err(UmError::InvalidProgram { len: 9 })
        );
    }

    #[test]
    fn test_words_to_bytes() {
        assert_eq!(words_to_bytes(&[0x0102_0304]), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = read_program("/definitely/not/here.um").unwrap_err();
        match err {
            UmError::FileRead { path, .. } => assert_eq!(path, "/definitely/not/here.um"),
            other => panic!("Expected FileRead, got {other:?}"),
        }
    }

    #[test]
    fn test_read_program_from_disk() {
        let path = std::env::temp_dir().join(format!("um-loader-{}.um", std::process::id()));
        fs::write(&path, words_to_bytes(&[0xD000_0007, 0x7000_0000])).unwrap();
        let words = read_program(&path);
        let _ = fs::remove_file(&path);
        assert_eq!(words, Ok(vec![0xD000_0007, 0x7000_0000]));
    }
}
