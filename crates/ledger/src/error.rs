//! Ledger errors

use chrono::{DateTime, Utc};
use ecosort_core::{Credits, CreditStatus, SubscriptionTier};
use thiserror::Error;

/// Errors from grant operations.
///
/// Every variant is a precondition failure returned before any mutation,
/// which makes naive caller-side retry safe: a grant that already happened
/// fails cleanly instead of granting twice.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrantError {
    #[error("Trial credits already claimed (status {0})")]
    AlreadyClaimed(CreditStatus),

    #[error("Second trial already claimed")]
    SecondAlreadyClaimed,

    #[error("First trial was never claimed")]
    FirstTrialNotClaimed,

    #[error("Second trial not eligible until {eligible_at}")]
    NotYetEligible { eligible_at: DateTime<Utc> },

    #[error("Requires FREE tier, current tier is {0}")]
    PaidTierIneligible(SubscriptionTier),

    #[error("Account is flagged for abuse")]
    AccountFlagged,

    #[error("Ad-watch bonus already claimed")]
    AdBonusAlreadyClaimed,

    #[error("Balance {total} is not below the ad-bonus ceiling {ceiling}")]
    BalanceAboveCeiling { total: Credits, ceiling: Credits },

    #[error("Expected {expected} videos watched, got {actual}")]
    WrongVideoCount { expected: u32, actual: u32 },

    #[error("Tier {0} has no monthly allotment")]
    TierWithoutAllotment(SubscriptionTier),

    #[error("Grant amount must be positive")]
    NonPositiveAmount,

    #[error("Credit amount overflow")]
    AmountOverflow,
}

/// Errors from deduction operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeductionError {
    #[error("Insufficient credits: requested {requested}, available {available}")]
    InsufficientCredits {
        requested: Credits,
        available: Credits,
    },

    #[error("Deduction amount must be positive")]
    NonPositiveAmount,
}

/// Errors from the balance store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("User already exists: {0}")]
    AlreadyExists(String),

    #[error("Version conflict for {user_id}: expected {expected}, found {actual}")]
    VersionConflict {
        user_id: String,
        expected: u64,
        actual: u64,
    },

    #[error("Unsupported schema version {found} for {user_id} (current is {current})")]
    UnsupportedSchema {
        user_id: String,
        found: u32,
        current: u32,
    },

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
