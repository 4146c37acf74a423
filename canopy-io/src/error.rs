//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur during I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IoError> for canopy_core::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Io(e) => canopy_core::Error::Io(e),
            IoError::FileNotFound { path } => canopy_core::Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {}", path),
            )),
            IoError::InvalidFormat { format } => canopy_core::Error::UnsupportedFormat(format),
            IoError::ParseError { message } => canopy_core::Error::InvalidData(message),
        }
    }
}

/// Open a file, reporting a missing file as [`IoError::FileNotFound`]
pub(crate) fn open(path: &std::path::Path) -> Result<std::fs::File, IoError> {
    std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => IoError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => IoError::Io(e),
    })
}
