//! Error types for support-bundle
//!
//! A bundle run distinguishes between two kinds of failure:
//! - per-collector errors, which never abort a run and are only surfaced
//!   through [`Progress`](crate::progress::Progress) events
//! - run-level errors (cancellation, deadline expiry, archive close failure),
//!   which abort the run and are returned to the caller

use thiserror::Error;

/// Result type alias for support-bundle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for support-bundle
#[derive(Debug, Error)]
pub enum Error {
    /// The run context was cancelled
    #[error("context canceled")]
    Cancelled,

    /// The run context deadline expired
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// The archive was already closed
    #[error("archive is closed")]
    ArchiveClosed,

    /// A collector failed to gather its data
    #[error("collect error: {0}")]
    Collect(String),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "nodes")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Zip archive error
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A worker task panicked or was aborted
    #[error("worker failed: {0}")]
    WorkerPanicked(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Returns true when the error originates from context cancellation or deadline expiry.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled | Error::DeadlineExceeded)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::WorkerPanicked(err.to_string())
    }
}
