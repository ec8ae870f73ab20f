//! Error types for sequence allocation and code issuance.

use thiserror::Error;

use sfid_core::ValidationError;

/// Failure to allocate a raw sequence number.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The bucket has handed out all 1,000,000,000 sequence numbers.
    #[error("sequence bucket {bucket:?} exhausted")]
    Exhausted {
        /// The exhausted bucket key.
        bucket: String,
    },

    /// The stored counter is outside the representable sequence range.
    #[error("sequence bucket {bucket:?} holds invalid counter {value}")]
    InvalidCounter {
        /// Bucket key.
        bucket: String,
        /// Raw stored value.
        value: i64,
    },

    /// The database rejected the allocation; nothing was committed.
    #[error("sequence database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The database location could not be prepared.
    #[error("failed to prepare sequence database at {path}: {source}")]
    Io {
        /// Database path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl StoreError {
    /// Whether this is the bucket-exhausted condition.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

/// Failure to issue a new code.
#[derive(Error, Debug)]
pub enum IssueError {
    /// The requested fields are invalid; no sequence was allocated.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Sequence allocation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
