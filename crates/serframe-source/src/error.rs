use std::path::PathBuf;

/// Errors that can occur while pulling bytes from a source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Failed to open the specified device or file.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred while reading.
    #[error("source I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The serial port driver reported an error.
    #[cfg(feature = "serial")]
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

pub type Result<T> = std::result::Result<T, SourceError>;
