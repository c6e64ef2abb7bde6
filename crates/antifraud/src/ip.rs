//! IP registry - rolling signup window per source address
//!
//! Tracks how many accounts claimed a trial from one address inside a
//! rolling window. The window resets on the first signup after expiry;
//! the account set accumulates for audit and never shrinks.

use crate::config::GatePolicy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::net::IpAddr;

/// Signup activity for a single source address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpRecord {
    pub ip: IpAddr,

    /// Every account that claimed a trial from this address
    pub accounts_created: BTreeSet<String>,

    /// Start of the current rolling window
    pub window_start: DateTime<Utc>,

    /// Signups inside the current window
    pub count: u32,
}

impl IpRecord {
    pub fn new(ip: IpAddr, user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        let mut accounts = BTreeSet::new();
        accounts.insert(user_id.into());
        Self {
            ip,
            accounts_created: accounts,
            window_start: now,
            count: 1,
        }
    }

    /// Whether the current window has elapsed
    pub fn window_expired(&self, now: DateTime<Utc>, policy: &GatePolicy) -> bool {
        now - self.window_start >= policy.ip_window()
    }

    /// Whether the address has hit the signup limit inside a live window
    pub fn is_saturated(&self, now: DateTime<Utc>, policy: &GatePolicy) -> bool {
        !self.window_expired(now, policy) && self.count >= policy.ip_max_signups
    }

    /// Record one more signup: reset the window if it expired, otherwise
    /// increment the counter
    pub fn record_signup(
        &mut self,
        user_id: impl Into<String>,
        now: DateTime<Utc>,
        policy: &GatePolicy,
    ) {
        if self.window_expired(now, policy) {
            self.window_start = now;
            self.count = 1;
        } else {
            self.count += 1;
        }
        self.accounts_created.insert(user_id.into());
    }
}

/// In-memory registry of per-IP signup records
#[derive(Debug, Default)]
pub struct IpRegistry {
    records: HashMap<IpAddr, IpRecord>,
}

impl IpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the record for an address, if one exists
    pub fn get(&self, ip: &IpAddr) -> Option<&IpRecord> {
        self.records.get(ip)
    }

    /// Record a trial signup from an address, creating the record lazily
    pub fn record_signup(
        &mut self,
        ip: IpAddr,
        user_id: &str,
        now: DateTime<Utc>,
        policy: &GatePolicy,
    ) {
        match self.records.get_mut(&ip) {
            Some(record) => record.record_signup(user_id, now, policy),
            None => {
                self.records.insert(ip, IpRecord::new(ip, user_id, now));
            }
        }
    }

    /// Number of known addresses
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
