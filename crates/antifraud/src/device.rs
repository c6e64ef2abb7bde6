//! Device registry - per-device login history and trial claims
//!
//! A device may back at most one trial claim, ever. Records are created
//! lazily on first sighting and never deleted.

use crate::config::GatePolicy;
use crate::error::{AntifraudError, AntifraudResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Everything known about a single device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub device_id: String,

    /// Every user that has logged in on this device
    pub login_history: BTreeSet<String>,

    /// The one user that claimed trial credits on this device, if any.
    /// Write-once: never reassigned after being set.
    pub trial_claimed_by: Option<String>,

    /// Set automatically once the login history exceeds the policy threshold
    pub abuse_flagged: bool,
}

impl DeviceRecord {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            login_history: BTreeSet::new(),
            trial_claimed_by: None,
            abuse_flagged: false,
        }
    }

    /// Record a login. Returns true if this login tipped the device over
    /// the abuse threshold.
    pub fn record_login(&mut self, user_id: impl Into<String>, policy: &GatePolicy) -> bool {
        self.login_history.insert(user_id.into());

        if !self.abuse_flagged && self.login_history.len() > policy.device_login_flag_threshold {
            self.abuse_flagged = true;
            return true;
        }
        false
    }

    /// Claim the device for a trial grant. Fails if another user already
    /// holds the claim; re-claiming by the same user is a no-op.
    pub fn claim_trial(&mut self, user_id: &str) -> AntifraudResult<()> {
        match &self.trial_claimed_by {
            Some(existing) if existing != user_id => Err(AntifraudError::TrialAlreadyClaimed {
                device_id: self.device_id.clone(),
                claimed_by: existing.clone(),
            }),
            Some(_) => Ok(()),
            None => {
                self.trial_claimed_by = Some(user_id.to_string());
                Ok(())
            }
        }
    }
}

/// In-memory registry of device records
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    records: HashMap<String, DeviceRecord>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a device record, if one exists
    pub fn get(&self, device_id: &str) -> Option<&DeviceRecord> {
        self.records.get(device_id)
    }

    /// Get or lazily create the record for a device
    pub fn get_or_create(&mut self, device_id: &str) -> &mut DeviceRecord {
        self.records
            .entry(device_id.to_string())
            .or_insert_with(|| DeviceRecord::new(device_id))
    }

    /// Record a login on a device. Returns true if the device was newly
    /// flagged for abuse as a result.
    pub fn record_login(
        &mut self,
        device_id: &str,
        user_id: &str,
        policy: &GatePolicy,
    ) -> bool {
        let newly_flagged = self.get_or_create(device_id).record_login(user_id, policy);
        if newly_flagged {
            tracing::warn!(device_id, "device flagged: login history over threshold");
        }
        newly_flagged
    }

    /// Mark a device as having backed a trial claim, and record the login
    pub fn claim_trial(
        &mut self,
        device_id: &str,
        user_id: &str,
        policy: &GatePolicy,
    ) -> AntifraudResult<()> {
        let record = self.get_or_create(device_id);
        record.claim_trial(user_id)?;
        record.record_login(user_id, policy);
        Ok(())
    }

    /// Number of known devices
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_is_write_once() {
        let mut record = DeviceRecord::new("DEV-1");
        record.claim_trial("alice").unwrap();

        let result = record.claim_trial("bob");
        assert!(matches!(
            result,
            Err(AntifraudError::TrialAlreadyClaimed { ref claimed_by, .. }) if claimed_by == "alice"
        ));
        assert_eq!(record.trial_claimed_by.as_deref(), Some("alice"));
    }

    #[test]
    fn test_reclaim_by_same_user_is_noop() {
        let mut record = DeviceRecord::new("DEV-1");
        record.claim_trial("alice").unwrap();
        record.claim_trial("alice").unwrap();
        assert_eq!(record.trial_claimed_by.as_deref(), Some("alice"));
    }

    #[test]
    fn test_login_history_flags_abuse() {
        let policy = GatePolicy::default();
        let mut registry = DeviceRegistry::new();

        // 10 distinct users: at the threshold, not over it
        for i in 0..10 {
            let flagged = registry.record_login("DEV-1", &format!("user-{i}"), &policy);
            assert!(!flagged);
        }
        assert!(!registry.get("DEV-1").unwrap().abuse_flagged);

        // The 11th crosses the threshold
        let flagged = registry.record_login("DEV-1", "user-10", &policy);
        assert!(flagged);
        assert!(registry.get("DEV-1").unwrap().abuse_flagged);

        // Only reported once
        let flagged = registry.record_login("DEV-1", "user-11", &policy);
        assert!(!flagged);
    }

    #[test]
    fn test_repeat_login_not_double_counted() {
        let policy = GatePolicy::default();
        let mut record = DeviceRecord::new("DEV-1");
        for _ in 0..20 {
            record.record_login("alice", &policy);
        }
        assert_eq!(record.login_history.len(), 1);
        assert!(!record.abuse_flagged);
    }

    #[test]
    fn test_lazy_creation() {
        let mut registry = DeviceRegistry::new();
        assert!(registry.get("DEV-1").is_none());
        registry.get_or_create("DEV-1");
        assert!(registry.get("DEV-1").is_some());
    }
}
