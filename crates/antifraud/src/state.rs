//! Per-user antifraud state
//!
//! Created together with the credit balance when the account is created,
//! mutated only by ledger operations and explicit admin flags.

use chrono::{DateTime, Utc};
use ecosort_core::CreditStatus;
use serde::{Deserialize, Serialize};

/// Fraud-relevant account state for a single user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AntifraudState {
    /// Whether the account passed phone verification
    pub phone_verified: bool,

    /// Verified phone number, if any
    pub phone_number: Option<String>,

    /// Trial-grant progression
    pub credit_status: CreditStatus,

    /// Device the first trial was claimed on
    pub initial_device_id: Option<String>,

    /// Manual or automated abuse flag; blocks all trial-family grants
    pub abuse_flagged: bool,

    /// Why the account was flagged
    pub flag_reason: Option<String>,

    /// When the account was flagged
    pub flagged_at: Option<DateTime<Utc>>,
}

impl AntifraudState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the phone as verified
    pub fn verify_phone(&mut self, phone_number: impl Into<String>) {
        self.phone_verified = true;
        self.phone_number = Some(phone_number.into());
    }

    /// Raise the abuse flag. Idempotent; the first reason and timestamp win.
    pub fn flag(&mut self, reason: impl Into<String>, now: DateTime<Utc>) {
        if !self.abuse_flagged {
            self.abuse_flagged = true;
            self.flag_reason = Some(reason.into());
            self.flagged_at = Some(now);
        }
    }
}
