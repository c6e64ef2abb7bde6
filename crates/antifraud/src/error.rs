//! Antifraud errors

use thiserror::Error;

/// Errors from registry mutations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AntifraudError {
    #[error("Device {device_id} trial already claimed by {claimed_by}")]
    TrialAlreadyClaimed {
        device_id: String,
        claimed_by: String,
    },
}

/// Result type for antifraud operations
pub type AntifraudResult<T> = Result<T, AntifraudError>;
