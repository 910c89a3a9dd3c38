//! Error types for Tube Fetcher
//!
//! This module defines comprehensive error types for all components of the
//! application. Errors are designed to be actionable and provide clear context
//! for debugging and user feedback.

use std::path::PathBuf;
use thiserror::Error;

/// Persistent store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// The durable medium cannot be opened or initialized
    #[error("Store unavailable at {path}: {reason}")]
    Unavailable { path: PathBuf, reason: String },

    /// Schema migration failed; the database was left at the old version
    #[error("Schema migration from version {from} to {to} failed: {reason}")]
    Migration {
        from: usize,
        to: usize,
        reason: String,
    },

    /// Database was written by a newer release of this program
    #[error("Database schema version {found} is newer than supported version {supported}")]
    VersionTooNew { found: usize, supported: usize },

    /// Record lookup or update referenced a missing id
    #[error("Record not found: {id}")]
    NotFound { id: String },

    /// A stored column could not be decoded into its record type
    #[error("Corrupt record in {collection}: {reason}")]
    CorruptRecord { collection: String, reason: String },

    /// Underlying SQLite error
    #[error("Database operation failed")]
    Sqlite(#[from] rusqlite::Error),
}

/// Queue manager and job lifecycle errors
#[derive(Error, Debug)]
pub enum QueueError {
    /// Enqueue of an acquisition that already completed at the same quality/format
    #[error("Already downloaded: {source_id} ({quality}, {format}). Use force to re-acquire")]
    DuplicateJob {
        source_id: String,
        quality: String,
        format: String,
    },

    /// Job id not present in the queue
    #[error("Queue item not found: {id}")]
    NotFound { id: String },

    /// Requested status change is not allowed by the job state machine
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Progress report claims more bytes than the known total
    #[error("Progress exceeds total: {downloaded_bytes} of {total_bytes} bytes")]
    ProgressExceedsTotal {
        downloaded_bytes: u64,
        total_bytes: u64,
    },

    /// Store-level failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Resume tracker failure while recording an interruption or cancel
    #[error(transparent)]
    Resume(#[from] ResumeError),
}

/// Resume tracker and checkpoint errors
#[derive(Error, Debug)]
pub enum ResumeError {
    /// Chunk does not start at the current resume offset
    #[error("Out-of-order chunk for job {job_id}: expected offset {expected_offset}, chunk starts at {chunk_start}")]
    OutOfOrderChunk {
        job_id: String,
        expected_offset: u64,
        chunk_start: u64,
    },

    /// Checkpoint requested for a job the queue does not know about
    #[error("Cannot checkpoint unknown job: {job_id}")]
    UnknownJob { job_id: String },

    /// Store-level failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Snapshot export/import errors
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Snapshot document was produced by a newer release
    #[error("Snapshot schema version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// JSON encoding or decoding failed
    #[error("Snapshot serialization failed")]
    Json(#[from] serde_json::Error),

    /// I/O error reading or writing the snapshot file
    #[error("Snapshot I/O failed")]
    Io(#[from] std::io::Error),

    /// Store-level failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Configuration could not be read or written
    #[error("Configuration I/O failed")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Persistent store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Queue manager error
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// Resume tracker error
    #[error(transparent)]
    Resume(#[from] ResumeError),

    /// Snapshot error
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is recoverable by the caller choosing differently
    ///
    /// Duplicate jobs can be forced; an out-of-order chunk is resolved by
    /// invalidating the checkpoint and restarting from offset 0. Store-level
    /// failures are not retried internally and must be surfaced to the user.
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Queue(QueueError::DuplicateJob { .. })
            | AppError::Resume(ResumeError::OutOfOrderChunk { .. }) => true,

            AppError::Store(StoreError::Unavailable { .. })
            | AppError::Store(StoreError::Migration { .. })
            | AppError::Store(StoreError::VersionTooNew { .. }) => false,

            _ => false,
        }
    }

    /// Get error category for logging and metrics
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Store(_) => "store",
            AppError::Queue(_) => "queue",
            AppError::Resume(_) => "resume",
            AppError::Snapshot(_) => "snapshot",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Store result type alias
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Queue result type alias
pub type QueueResult<T> = std::result::Result<T, QueueError>;

/// Resume result type alias
pub type ResumeResult<T> = std::result::Result<T, ResumeError>;

/// Snapshot result type alias
pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_job_is_recoverable() {
        let err = AppError::Queue(QueueError::DuplicateJob {
            source_id: "abc".to_string(),
            quality: "720p".to_string(),
            format: "mp4".to_string(),
        });
        assert!(err.is_recoverable());
        assert_eq!(err.category(), "queue");
    }

    #[test]
    fn test_store_unavailable_is_fatal() {
        let err = AppError::Store(StoreError::Unavailable {
            path: PathBuf::from("/nonexistent/library.db"),
            reason: "permission denied".to_string(),
        });
        assert!(!err.is_recoverable());
        assert_eq!(err.category(), "store");
    }

    #[test]
    fn test_out_of_order_chunk_message_names_offsets() {
        let err = ResumeError::OutOfOrderChunk {
            job_id: "j1".to_string(),
            expected_offset: 1000,
            chunk_start: 900,
        };
        let msg = err.to_string();
        assert!(msg.contains("1000"));
        assert!(msg.contains("900"));
    }
}
