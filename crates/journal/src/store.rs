//! Append-only JSONL journal storage
//!
//! Each line is one JSON-serialized entry. The file is append-only and
//! never rewritten; the sequence counter and chain tail are recovered by
//! reading the file on open.

use crate::entry::{EntryDraft, LogEntry};
use crate::error::JournalResult;
use crate::hash::{calculate_entry_hash, verify_chain};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// The transaction journal
pub struct TransactionJournal {
    path: PathBuf,
    file: Option<File>,
    /// Entries held when running in memory mode (tests)
    mem: Vec<LogEntry>,
    next_sequence: u64,
    last_hash: String,
}

impl TransactionJournal {
    /// Open (or create) a journal file, recovering the chain tail from
    /// any existing entries
    pub fn new(path: impl AsRef<Path>) -> JournalResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        let mut journal = Self {
            path,
            file: Some(file),
            mem: Vec::new(),
            next_sequence: 1,
            last_hash: "GENESIS".to_string(),
        };

        let existing = journal.read_all()?;
        if let Some(last) = existing.last() {
            journal.next_sequence = last.sequence + 1;
            journal.last_hash = last.hash.clone();
        }

        Ok(journal)
    }

    /// In-memory journal (for testing)
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            file: None,
            mem: Vec::new(),
            next_sequence: 1,
            last_hash: "GENESIS".to_string(),
        }
    }

    /// Append a draft, assigning it the next sequence number and linking
    /// it into the hash chain. Returns the completed entry.
    pub fn append(&mut self, draft: EntryDraft) -> JournalResult<LogEntry> {
        let mut entry = LogEntry {
            sequence: self.next_sequence,
            id: Uuid::new_v4().to_string(),
            user_id: draft.user_id,
            kind: draft.kind,
            amount: draft.amount,
            reason: draft.reason,
            feature: draft.feature,
            balance_before: draft.balance_before,
            balance_after: draft.balance_after,
            created_at: draft.created_at,
            prev_hash: self.last_hash.clone(),
            hash: String::new(),
        };
        entry.hash = calculate_entry_hash(&entry);

        if let Some(ref mut file) = self.file {
            let json = serde_json::to_string(&entry)?;
            writeln!(file, "{}", json)?;
            file.flush()?;
        } else {
            self.mem.push(entry.clone());
        }

        self.next_sequence = entry.sequence + 1;
        self.last_hash = entry.hash.clone();

        Ok(entry)
    }

    /// Read every entry in append order
    pub fn read_all(&self) -> JournalResult<Vec<LogEntry>> {
        if self.file.is_none() {
            return Ok(self.mem.clone());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: LogEntry = serde_json::from_str(&line)?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Read every entry for one user, in append order
    pub fn read_user(&self, user_id: &str) -> JournalResult<Vec<LogEntry>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|entry| entry.user_id == user_id)
            .collect())
    }

    /// Verify the full hash chain. Returns the number of entries checked.
    pub fn verify(&self) -> JournalResult<usize> {
        let entries = self.read_all()?;
        verify_chain(&entries)?;
        Ok(entries.len())
    }

    /// Path to the journal file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this journal keeps entries only in memory
    pub fn is_in_memory(&self) -> bool {
        self.file.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::BalanceSnapshot;
    use chrono::Utc;
    use ecosort_core::{Credits, PoolKind};
    use tempfile::tempdir;

    fn snapshot(total: i64) -> BalanceSnapshot {
        BalanceSnapshot {
            trial: Credits::new_unchecked(total),
            monthly: Credits::ZERO,
            purchase: Credits::ZERO,
            total: Credits::new_unchecked(total),
        }
    }

    fn grant_draft(user: &str, amount: i64) -> EntryDraft {
        EntryDraft::grant(
            user,
            PoolKind::Trial,
            Credits::new_unchecked(amount),
            "first_trial",
            snapshot(0),
            snapshot(amount),
            Utc::now(),
        )
    }

    #[test]
    fn test_in_memory_append_and_read() {
        let mut journal = TransactionJournal::in_memory();
        journal.append(grant_draft("alice", 500)).unwrap();
        journal.append(grant_draft("bob", 500)).unwrap();

        let entries = journal.read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].sequence, 1);
        assert_eq!(entries[1].sequence, 2);
        assert_eq!(entries[1].prev_hash, entries[0].hash);
    }

    #[test]
    fn test_chain_verifies() {
        let mut journal = TransactionJournal::in_memory();
        for i in 0..5 {
            journal.append(grant_draft(&format!("user-{i}"), 500)).unwrap();
        }
        assert_eq!(journal.verify().unwrap(), 5);
    }

    #[test]
    fn test_file_roundtrip_and_tail_recovery() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");

        {
            let mut journal = TransactionJournal::new(&path).unwrap();
            journal.append(grant_draft("alice", 500)).unwrap();
            journal.append(grant_draft("bob", 500)).unwrap();
        }

        // Reopen: sequence and chain continue where they left off
        {
            let mut journal = TransactionJournal::new(&path).unwrap();
            let entry = journal.append(grant_draft("carol", 500)).unwrap();
            assert_eq!(entry.sequence, 3);
            assert_eq!(journal.verify().unwrap(), 3);
        }
    }

    #[test]
    fn test_read_user_filters() {
        let mut journal = TransactionJournal::in_memory();
        journal.append(grant_draft("alice", 500)).unwrap();
        journal.append(grant_draft("bob", 500)).unwrap();
        journal.append(grant_draft("alice", 50)).unwrap();

        let entries = journal.read_user("alice").unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.user_id == "alice"));
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("journal.jsonl");

        let journal = TransactionJournal::new(&path).unwrap();
        assert!(!journal.is_in_memory());
        assert!(path.parent().unwrap().exists());
    }
}
