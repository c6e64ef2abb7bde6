//! Credits - Non-negative integer wrapper for credit amounts
//!
//! All credit amounts in EcoSort MUST be non-negative.
//! This is enforced at the type level.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when working with credit amounts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CreditsError {
    #[error("Credit amount cannot be negative: {0}")]
    NegativeAmount(i64),
}

/// A non-negative integer amount of credits.
///
/// # Invariant
/// The inner value is always >= 0. This is enforced by the constructor.
///
/// # Example
/// ```
/// use ecosort_core::Credits;
///
/// let amount = Credits::new(100).unwrap();
/// assert_eq!(amount.value(), 100);
///
/// // Negative amounts are rejected
/// let negative = Credits::new(-100);
/// assert!(negative.is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Credits(i64);

impl Credits {
    /// Zero credits constant
    pub const ZERO: Self = Self(0);

    /// Create new Credits from an i64.
    ///
    /// Returns an error if the value is negative.
    pub fn new(value: i64) -> Result<Self, CreditsError> {
        if value < 0 {
            Err(CreditsError::NegativeAmount(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Create Credits without validation.
    ///
    /// # Safety
    /// The caller MUST ensure the value is non-negative.
    /// Use only for trusted sources (e.g., policy constants, validated storage).
    #[inline]
    pub const fn new_unchecked(value: i64) -> Self {
        Self(value)
    }

    /// Get the inner value
    #[inline]
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Check if the amount is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition - returns None on overflow
    pub fn checked_add(&self, other: Credits) -> Option<Credits> {
        self.0.checked_add(other.0).map(Credits)
    }

    /// Checked subtraction - returns None if the result would be negative
    pub fn checked_sub(&self, other: Credits) -> Option<Credits> {
        let result = self.0.checked_sub(other.0)?;
        if result < 0 {
            None
        } else {
            Some(Credits(result))
        }
    }

    /// Subtraction clamped at zero
    pub fn saturating_sub(&self, other: Credits) -> Credits {
        Credits(self.0.saturating_sub(other.0).max(0))
    }

    /// The smaller of two amounts
    pub fn min(&self, other: Credits) -> Credits {
        Credits(self.0.min(other.0))
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Credits {
    type Error = CreditsError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Credits> for i64 {
    fn from(credits: Credits) -> Self {
        credits.0
    }
}

impl Default for Credits {
    fn default() -> Self {
        Self::ZERO
    }
}
