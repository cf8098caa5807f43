//! Error types for param-fs

use std::path::PathBuf;

/// Result type for param-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing parameter files
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported parameter file format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Parameter file too large: {path} is {size} bytes (max {max})")]
    TooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
