//! Balance store - the per-user atomic commit seam
//!
//! Every ledger operation is a single read-modify-write against one
//! user's record, committed with an optimistic compare-and-swap on the
//! record's version counter. No cross-user locking exists because pools
//! are never shared between users.

use crate::balance::CreditBalance;
use crate::error::StoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ecosort_antifraud::AntifraudState;
use serde::{Deserialize, Serialize};

/// Current on-record schema version. Records written by the legacy
/// single-integer balance format carry version 1 and are rejected at
/// load; migrating them is a one-shot batch concern, not request-path
/// logic.
pub const SCHEMA_VERSION: u32 = 2;

/// The stored unit: one user's balance and antifraud state, with the
/// version counter backing optimistic concurrency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub schema_version: u32,

    /// Bumped by the store on every successful compare-and-swap
    pub version: u64,

    pub balance: CreditBalance,
    pub antifraud: AntifraudState,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// A fresh record: pools zero, status NOT_CLAIMED
    pub fn new(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            schema_version: SCHEMA_VERSION,
            version: 0,
            balance: CreditBalance::new(),
            antifraud: AntifraudState::new(),
            created_at: now,
        }
    }
}

/// Per-user record storage with optimistic concurrency.
///
/// A production deployment binds a document store with per-record
/// transactions behind this trait; the in-process implementations cover
/// tests and single-node use.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Insert a brand-new record. Fails with `AlreadyExists` if the user
    /// is known.
    async fn create(&self, record: UserRecord) -> StoreResult<()>;

    /// Load a user's record. Fails with `NotFound` for unknown users and
    /// `UnsupportedSchema` for records the current code cannot read.
    async fn load(&self, user_id: &str) -> StoreResult<UserRecord>;

    /// Commit `record` only if the stored version still equals
    /// `expected_version`. On success the stored version becomes
    /// `expected_version + 1`; on a concurrent write the call fails with
    /// `VersionConflict` and the caller reloads and retries.
    async fn compare_and_swap(&self, expected_version: u64, record: UserRecord) -> StoreResult<()>;
}
