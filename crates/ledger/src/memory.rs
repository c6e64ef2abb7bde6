//! In-memory balance store (tests, simulations)

use crate::error::{StoreError, StoreResult};
use crate::store::{BalanceStore, UserRecord, SCHEMA_VERSION};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// HashMap-backed store with real compare-and-swap semantics, so the
/// service's retry loop is exercised the same way as against a real
/// document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BalanceStore for MemoryStore {
    async fn create(&self, record: UserRecord) -> StoreResult<()> {
        let mut records = self.records.lock().map_err(|_| StoreError::LockPoisoned)?;
        if records.contains_key(&record.user_id) {
            return Err(StoreError::AlreadyExists(record.user_id));
        }
        records.insert(record.user_id.clone(), record);
        Ok(())
    }

    async fn load(&self, user_id: &str) -> StoreResult<UserRecord> {
        let records = self.records.lock().map_err(|_| StoreError::LockPoisoned)?;
        let record = records
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))?;

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
        let mut records = self.records.lock().map_err(|_| StoreError::LockPoisoned)?;
        let current = records
            .get(&record.user_id)
            .ok_or_else(|| StoreError::NotFound(record.user_id.clone()))?;

        if current.version != expected_version {
            return Err(StoreError::VersionConflict {
                user_id: record.user_id.clone(),
                expected: expected_version,
                actual: current.version,
            });
        }

        record.version = expected_version + 1;
        records.insert(record.user_id.clone(), record);
        Ok(())
    }
}
