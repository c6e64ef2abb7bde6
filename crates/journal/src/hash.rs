//! Hash chain utilities for journal integrity

use crate::entry::{BalanceSnapshot, EntryKind, LogEntry};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Calculate the SHA-256 hash of entry content (excluding the hash field)
pub fn calculate_entry_hash(entry: &LogEntry) -> String {
    let mut hasher = Sha256::new();

    hasher.update(entry.sequence.to_le_bytes());
    hasher.update(entry.prev_hash.as_bytes());
    hasher.update(entry.id.as_bytes());
    hasher.update(entry.user_id.as_bytes());
    hasher.update(entry.created_at.to_rfc3339().as_bytes());
    hasher.update(entry.amount.value().to_le_bytes());
    hasher.update(entry.reason.as_bytes());
    if let Some(ref feature) = entry.feature {
        hasher.update(feature.as_bytes());
    }

    match &entry.kind {
        EntryKind::Grant { pool } => {
            hasher.update(b"GRANT");
            hasher.update(pool.to_string().as_bytes());
        }
        EntryKind::Deduction {
            trial_used,
            monthly_used,
            purchase_used,
        } => {
            hasher.update(b"DEDUCTION");
            hasher.update(trial_used.value().to_le_bytes());
            hasher.update(monthly_used.value().to_le_bytes());
            hasher.update(purchase_used.value().to_le_bytes());
        }
    }

    hash_snapshot(&mut hasher, &entry.balance_before);
    hash_snapshot(&mut hasher, &entry.balance_after);

    hex::encode(hasher.finalize())
}

fn hash_snapshot(hasher: &mut Sha256, snapshot: &BalanceSnapshot) {
    hasher.update(snapshot.trial.value().to_le_bytes());
    hasher.update(snapshot.monthly.value().to_le_bytes());
    hasher.update(snapshot.purchase.value().to_le_bytes());
    hasher.update(snapshot.total.value().to_le_bytes());
}

/// Errors in hash chain verification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("Broken link at seq {sequence}: expected prev_hash '{expected}', got '{actual}'")]
    BrokenLink {
        sequence: u64,
        expected: String,
        actual: String,
    },

    #[error("Invalid hash at seq {sequence}: expected '{expected}', got '{actual}'")]
    InvalidHash {
        sequence: u64,
        expected: String,
        actual: String,
    },

    #[error("Invalid sequence: expected {expected}, got {actual}")]
    InvalidSequence { expected: u64, actual: u64 },
}

/// Verify hash chain integrity over a full journal read
pub fn verify_chain(entries: &[LogEntry]) -> Result<(), ChainError> {
    if entries.is_empty() {
        return Ok(());
    }

    let mut prev_hash = "GENESIS".to_string();

    for (i, entry) in entries.iter().enumerate() {
        if entry.prev_hash != prev_hash {
            return Err(ChainError::BrokenLink {
                sequence: entry.sequence,
                expected: prev_hash,
                actual: entry.prev_hash.clone(),
            });
        }

        let calculated = calculate_entry_hash(entry);
        if entry.hash != calculated {
            return Err(ChainError::InvalidHash {
                sequence: entry.sequence,
                expected: calculated,
                actual: entry.hash.clone(),
            });
        }

        if i > 0 && entry.sequence != entries[i - 1].sequence + 1 {
            return Err(ChainError::InvalidSequence {
                expected: entries[i - 1].sequence + 1,
                actual: entry.sequence,
            });
        }

        prev_hash = entry.hash.clone();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ecosort_core::{Credits, PoolKind};

    fn snapshot(total: i64) -> BalanceSnapshot {
        BalanceSnapshot {
            trial: Credits::new_unchecked(total),
            monthly: Credits::ZERO,
            purchase: Credits::ZERO,
            total: Credits::new_unchecked(total),
        }
    }

    fn create_entry(sequence: u64, prev_hash: &str) -> LogEntry {
        let mut entry = LogEntry {
            sequence,
            id: format!("entry-{sequence}"),
            user_id: "alice".to_string(),
            kind: EntryKind::Grant {
                pool: PoolKind::Trial,
            },
            amount: Credits::new_unchecked(500),
            reason: "first_trial".to_string(),
            feature: None,
            balance_before: snapshot(0),
            balance_after: snapshot(500),
            created_at: Utc::now(),
            prev_hash: prev_hash.to_string(),
            hash: String::new(),
        };
        entry.hash = calculate_entry_hash(&entry);
        entry
    }

    #[test]
    fn test_hash_deterministic() {
        let entry = create_entry(1, "GENESIS");
        assert_eq!(calculate_entry_hash(&entry), calculate_entry_hash(&entry));
    }

    #[test]
    fn test_hash_sensitive_to_amount() {
        let entry = create_entry(1, "GENESIS");
        let mut tampered = entry.clone();
        tampered.amount = Credits::new_unchecked(9999);
        assert_ne!(calculate_entry_hash(&entry), calculate_entry_hash(&tampered));
    }

    #[test]
    fn test_verify_valid_chain() {
        let entry1 = create_entry(1, "GENESIS");
        let entry2 = create_entry(2, &entry1.hash);
        let entry3 = create_entry(3, &entry2.hash);

        assert!(verify_chain(&[entry1, entry2, entry3]).is_ok());
    }

    #[test]
    fn test_verify_broken_link() {
        let entry1 = create_entry(1, "GENESIS");
        let entry2 = create_entry(2, "wrong_hash");

        let result = verify_chain(&[entry1, entry2]);
        assert!(matches!(result, Err(ChainError::BrokenLink { .. })));
    }

    #[test]
    fn test_verify_detects_tampering() {
        let entry1 = create_entry(1, "GENESIS");
        let mut entry2 = create_entry(2, &entry1.hash);
        entry2.amount = Credits::new_unchecked(1);

        let result = verify_chain(&[entry1, entry2]);
        assert!(matches!(result, Err(ChainError::InvalidHash { .. })));
    }

    #[test]
    fn test_verify_empty_chain() {
        assert!(verify_chain(&[]).is_ok());
    }
}
