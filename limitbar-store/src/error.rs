//! Store error types.

use thiserror::Error;

/// Errors that can occur in the credential and settings stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// On-disk content is not well-formed.
    ///
    /// Callers recover by treating the store as empty; a corrupt file must
    /// never prevent startup.
    #[error("Corrupt store at {path}: {reason}")]
    CorruptStore {
        /// Path of the offending file.
        path: String,
        /// Why parsing failed.
        reason: String,
    },

    /// Configuration value outside its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
