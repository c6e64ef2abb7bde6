//! Application context - wires everything together

use ecosort_journal::TransactionJournal;
use ecosort_ledger::JsonStore;
use ecosort_service::CreditService;
use std::path::{Path, PathBuf};

/// Wires the credit service to file-backed storage under the data
/// directory: user records in `users/`, the journal in `journal.log`.
pub struct AppContext {
    pub service: CreditService<JsonStore>,
    journal_path: PathBuf,
}

impl AppContext {
    pub fn new(data_path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let data_path = data_path.as_ref();
        std::fs::create_dir_all(data_path)?;

        let journal_path = data_path.join("journal.log");
        let store = JsonStore::new(data_path)?;
        let journal = TransactionJournal::new(&journal_path)?;

        Ok(Self {
            service: CreditService::new(store, journal),
            journal_path,
        })
    }

    pub fn journal_path(&self) -> &Path {
        &self.journal_path
    }
}
