//! Store error types.

use uuid::Uuid;

/// Errors that can occur when reading or writing the logbook store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No leg with this id
    #[error("leg {0} not found")]
    NotFound(Uuid),

    /// A leg with this id already exists
    #[error("leg {0} already exists")]
    Duplicate(Uuid),

    /// Reading or writing the backing file failed
    #[error("store I/O error: {message}")]
    Io { message: String },

    /// The backing file is not valid JSON
    #[error("store JSON error: {message}")]
    Json { message: String },

    /// A lock was poisoned by a panicking writer
    #[error("store lock poisoned")]
    Poisoned,
}
