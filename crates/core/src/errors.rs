//! Core error types for the Nisab price service.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the core crate.
///
/// Resolution failures are not part of this enum: they are reported
/// through [`crate::prices::ResolutionError`], which is the only error a
/// resolver caller ever sees.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Snapshot storage failed: {0}")]
    Storage(#[from] StorageError),
}

/// Errors raised while persisting snapshot files.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Storage(StorageError::Io(e))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Storage(StorageError::Serialization(e))
    }
}
