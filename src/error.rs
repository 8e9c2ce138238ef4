//! Error types for log ingestion and conversion

use thiserror::Error;

/// Result type alias for loadsight operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for loadsight
#[derive(Error, Debug)]
pub enum Error {
    /// The caller supplied input that can never convert (empty file, missing
    /// required columns, uneven custom status lists).
    #[error("Invalid input: {0}")]
    ClientInput(String),

    /// A stored artifact failed validation (bad magic, unsupported version,
    /// dictionary reference out of range).
    #[error("Corrupted artifact: {0}")]
    Corrupted(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader/writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Row serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Anything that indicates a defect in this crate rather than its input
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when the failure was caused by the submitted data, so callers can
    /// report it as a bad request rather than a server fault.
    pub fn is_client_fault(&self) -> bool {
        matches!(self, Error::ClientInput(_))
    }
}
