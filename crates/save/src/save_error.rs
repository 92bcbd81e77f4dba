// ---------------------------------------------------------------------------
// SaveError: error type for configuration save/load
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors that can occur while saving or loading the facade configuration.
#[derive(Debug)]
pub enum SaveError {
    /// I/O error (file not found, permission denied, disk full, etc.)
    Io(std::io::Error),
    /// The file header is missing, truncated or fails its checksum.
    Header(String),
    /// The payload could not be decompressed.
    Decompress(String),
    /// Bitcode decoding failed.
    Decode(String),
    /// The file was written by a newer build.
    VersionMismatch { expected_max: u32, found: u32 },
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "I/O error: {e}"),
            SaveError::Header(msg) => write!(f, "Invalid config file: {msg}"),
            SaveError::Decompress(msg) => write!(f, "Decompression error: {msg}"),
            SaveError::Decode(msg) => write!(f, "Decoding error: {msg}"),
            SaveError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch: config is v{found}, but this build only supports up to v{expected_max}"
            ),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<bitcode::Error> for SaveError {
    fn from(e: bitcode::Error) -> Self {
        SaveError::Decode(e.to_string())
    }
}

impl From<lz4_flex::block::DecompressError> for SaveError {
    fn from(e: lz4_flex::block::DecompressError) -> Self {
        SaveError::Decompress(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_error_display_io() {
        let err = SaveError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        let msg = format!("{err}");
        assert!(msg.contains("I/O error"), "got: {msg}");
        assert!(msg.contains("file not found"), "got: {msg}");
    }

    #[test]
    fn test_save_error_display_version_mismatch() {
        let err = SaveError::VersionMismatch {
            expected_max: 1,
            found: 7,
        };
        let msg = format!("{err}");
        assert!(msg.contains("v7"), "got: {msg}");
        assert!(msg.contains("v1"), "got: {msg}");
    }

    #[test]
    fn test_save_error_display_header() {
        let err = SaveError::Header("checksum mismatch".to_string());
        let msg = format!("{err}");
        assert!(msg.contains("Invalid config file"), "got: {msg}");
    }

    #[test]
    fn test_save_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let save_err: SaveError = io_err.into();
        assert!(matches!(save_err, SaveError::Io(_)));
        assert!(std::error::Error::source(&save_err).is_some());
    }
}
