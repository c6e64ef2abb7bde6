//! Journal errors

use crate::hash::ChainError;
use thiserror::Error;

/// Errors from the transaction journal
#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Chain verification failed: {0}")]
    Chain(#[from] ChainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type for journal operations
pub type JournalResult<T> = Result<T, JournalError>;
