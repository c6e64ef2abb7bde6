//! Service errors
//!
//! The surface callers see, mirroring gate layers and engine failures:
//! precondition and gate failures carry the specific reason so the UI
//! can present an actionable message; system errors are retryable, and
//! retries are safe because every grant's precondition doubles as an
//! idempotency guard.

use ecosort_antifraud::{GateDenial, GateLayer};
use ecosort_core::Credits;
use ecosort_journal::JournalError;
use ecosort_ledger::{DeductionError, GrantError, StoreError};
use thiserror::Error;

/// Errors returned by [`crate::CreditService`]
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Insufficient credits: requested {requested}, available {available}")]
    InsufficientCredits {
        requested: Credits,
        available: Credits,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("System error: {0}")]
    SystemError(String),
}

impl ServiceError {
    /// Whether the caller should retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::SystemError(_))
    }
}

impl From<GateDenial> for ServiceError {
    fn from(denial: GateDenial) -> Self {
        let message = denial.to_string();
        match denial.layer() {
            GateLayer::Account => ServiceError::PreconditionFailed(message),
            GateLayer::Network => ServiceError::ResourceExhausted(message),
            GateLayer::Device | GateLayer::AbuseFlag => ServiceError::PermissionDenied(message),
        }
    }
}

impl From<GrantError> for ServiceError {
    fn from(error: GrantError) -> Self {
        let message = error.to_string();
        match error {
            GrantError::AccountFlagged => ServiceError::PermissionDenied(message),
            GrantError::WrongVideoCount { .. }
            | GrantError::TierWithoutAllotment(_)
            | GrantError::NonPositiveAmount
            | GrantError::AmountOverflow => ServiceError::InvalidArgument(message),
            _ => ServiceError::PreconditionFailed(message),
        }
    }
}

impl From<DeductionError> for ServiceError {
    fn from(error: DeductionError) -> Self {
        match error {
            DeductionError::InsufficientCredits {
                requested,
                available,
            } => ServiceError::InsufficientCredits {
                requested,
                available,
            },
            DeductionError::NonPositiveAmount => {
                ServiceError::InvalidArgument(error.to_string())
            }
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(user_id) => ServiceError::NotFound(user_id),
            StoreError::AlreadyExists(user_id) => {
                ServiceError::PreconditionFailed(format!("User already exists: {user_id}"))
            }
            other => ServiceError::SystemError(other.to_string()),
        }
    }
}

impl From<JournalError> for ServiceError {
    fn from(error: JournalError) -> Self {
        ServiceError::SystemError(error.to_string())
    }
}
