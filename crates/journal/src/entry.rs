//! Journal entry types

use chrono::{DateTime, Utc};
use ecosort_core::{Credits, PoolKind};
use serde::{Deserialize, Serialize};

/// Point-in-time view of the three pools and the derived total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub trial: Credits,
    pub monthly: Credits,
    pub purchase: Credits,
    pub total: Credits,
}

/// What kind of balance change an entry records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    /// Credits issued into one pool
    Grant { pool: PoolKind },

    /// Credits consumed, split across the pools in priority order
    Deduction {
        trial_used: Credits,
        monthly_used: Credits,
        purchase_used: Credits,
    },
}

/// One immutable journal entry. Never updated or deleted after append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Strictly increasing, starting at 1
    pub sequence: u64,
    pub id: String,
    pub user_id: String,

    #[serde(flatten)]
    pub kind: EntryKind,

    /// Total credits moved by this entry
    pub amount: Credits,

    /// Why the change happened (grant kind, metered feature, admin note)
    pub reason: String,

    /// Metered feature that triggered a deduction, if any
    pub feature: Option<String>,

    pub balance_before: BalanceSnapshot,
    pub balance_after: BalanceSnapshot,
    pub created_at: DateTime<Utc>,

    /// Hash of the previous entry ("GENESIS" for the first)
    pub prev_hash: String,

    /// SHA-256 over this entry's content, excluding this field
    pub hash: String,
}

/// Entry content as submitted by the ledger; the journal assigns the
/// sequence number, id, and hash-chain fields on append
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub user_id: String,
    pub kind: EntryKind,
    pub amount: Credits,
    pub reason: String,
    pub feature: Option<String>,
    pub balance_before: BalanceSnapshot,
    pub balance_after: BalanceSnapshot,
    pub created_at: DateTime<Utc>,
}

impl EntryDraft {
    pub fn grant(
        user_id: impl Into<String>,
        pool: PoolKind,
        amount: Credits,
        reason: impl Into<String>,
        balance_before: BalanceSnapshot,
        balance_after: BalanceSnapshot,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind: EntryKind::Grant { pool },
            amount,
            reason: reason.into(),
            feature: None,
            balance_before,
            balance_after,
            created_at,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn deduction(
        user_id: impl Into<String>,
        trial_used: Credits,
        monthly_used: Credits,
        purchase_used: Credits,
        amount: Credits,
        reason: impl Into<String>,
        feature: Option<String>,
        balance_before: BalanceSnapshot,
        balance_after: BalanceSnapshot,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind: EntryKind::Deduction {
                trial_used,
                monthly_used,
                purchase_used,
            },
            amount,
            reason: reason.into(),
            feature,
            balance_before,
            balance_after,
            created_at,
        }
    }
}
