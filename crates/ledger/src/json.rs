//! JSON-file balance store (single-process CLI use)
//!
//! One JSON document per user under a data directory. Compare-and-swap
//! is serialized by an in-process lock, which matches the single-node
//! deployment this store is for; multi-node deployments bind a real
//! document store behind [`BalanceStore`] instead.

use crate::error::{StoreError, StoreResult};
use crate::store::{BalanceStore, UserRecord, SCHEMA_VERSION};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File-per-user JSON store
#[derive(Debug)]
pub struct JsonStore {
    base_path: PathBuf,
    cas_lock: Mutex<()>,
}

impl JsonStore {
    /// Create a store rooted at the given directory
    pub fn new(base_path: impl AsRef<Path>) -> StoreResult<Self> {
        let base_path = base_path.as_ref().join("users");
        fs::create_dir_all(&base_path)?;
        Ok(Self {
            base_path,
            cas_lock: Mutex::new(()),
        })
    }

    fn record_path(&self, user_id: &str) -> PathBuf {
        // User ids come from the identity provider; keep the filename safe
        // regardless of what they contain
        let safe: String = user_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{safe}.json"))
    }

    fn read_record(&self, user_id: &str) -> StoreResult<UserRecord> {
        let path = self.record_path(user_id);
        if !path.exists() {
            return Err(StoreError::NotFound(user_id.to_string()));
        }
        let json = fs::read_to_string(&path)?;
        let record: UserRecord = serde_json::from_str(&json)?;
        Ok(record)
    }

    fn write_record(&self, record: &UserRecord) -> StoreResult<()> {
        let path = self.record_path(&record.user_id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(record)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[async_trait]
impl BalanceStore for JsonStore {
    async fn create(&self, record: UserRecord) -> StoreResult<()> {
        let _guard = self.cas_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        if self.record_path(&record.user_id).exists() {
            return Err(StoreError::AlreadyExists(record.user_id));
        }
        self.write_record(&record)
    }

    async fn load(&self, user_id: &str) -> StoreResult<UserRecord> {
        let record = self.read_record(user_id)?;
        if record.schema_version != SCHEMA_VERSION {
            return Err(StoreError::UnsupportedSchema {
                user_id: user_id.to_string(),
                found: record.schema_version,
                current: SCHEMA_VERSION,
            });
        }
        Ok(record)
    }

    async fn compare_and_swap(
        &self,
        expected_version: u64,
        mut record: UserRecord,
    ) -> StoreResult<()> {
        let _guard = self.cas_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let current = self.read_record(&record.user_id)?;

        if current.version != expected_version {
            return Err(StoreError::VersionConflict {
                user_id: record.user_id.clone(),
                expected: expected_version,
                actual: current.version,
            });
        }

        record.version = expected_version + 1;
        self.write_record(&record)
    }
}
