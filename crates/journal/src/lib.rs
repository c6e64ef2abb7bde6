//! EcoSort Transaction Journal
//!
//! Append-only record of every balance change, carrying before/after
//! snapshots. Audit-only by design: the ledger writes here but never
//! reads the journal to make a decision, so there is no read-your-writes
//! dependency on the audit trail.
//!
//! Entries are hash-chained (SHA-256) and the chain is verifiable, so
//! tampering with a past entry is detectable during dispute resolution.

pub mod entry;
pub mod error;
pub mod hash;
pub mod store;

pub use entry::{BalanceSnapshot, EntryDraft, EntryKind, LogEntry};
pub use error::{JournalError, JournalResult};
pub use hash::{calculate_entry_hash, verify_chain, ChainError};
pub use store::TransactionJournal;
