//! Credit service - the operation surface
//!
//! Wires the eligibility gate, the grant/deduction engines, the balance
//! store, the transaction journal, and the device/IP registries together
//! in the required order: gate, atomic ledger commit, journal append,
//! registry update.

use crate::clock::{Clock, SystemClock};
use crate::error::ServiceError;
use ecosort_antifraud::{DeviceRegistry, EligibilityGate, GatePolicy, IpRegistry};
use ecosort_core::{Credits, PoolKind, SubscriptionTier};
use ecosort_journal::{BalanceSnapshot, EntryDraft, LogEntry, TransactionJournal};
use ecosort_ledger::{
    deduct as apply_deduction, BalanceStore, CreditBalance, CreditPolicy, DeductionBreakdown,
    GrantEngine, StoreError, UserRecord,
};
use std::net::IpAddr;
use std::sync::Mutex;

/// Bounded optimistic retry before a commit is reported as a (retryable)
/// system error
const MAX_CAS_RETRIES: usize = 5;

/// Result of a successful grant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantOutcome {
    /// Credits added by this grant
    pub granted: Credits,
    /// Balance total after the commit
    pub new_total: Credits,
}

/// Result of a successful deduction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeductOutcome {
    /// Per-pool split of the deduction
    pub breakdown: DeductionBreakdown,
    /// Balance total after the commit
    pub new_total: Credits,
}

/// The credit ledger's caller-facing surface
pub struct CreditService<S: BalanceStore> {
    store: S,
    journal: Mutex<TransactionJournal>,
    devices: Mutex<DeviceRegistry>,
    ips: Mutex<IpRegistry>,
    gate: EligibilityGate,
    grants: GrantEngine,
    clock: Box<dyn Clock>,
}

impl<S: BalanceStore> CreditService<S> {
    /// Service with default policies and the system clock
    pub fn new(store: S, journal: TransactionJournal) -> Self {
        Self::with_policies(
            store,
            journal,
            CreditPolicy::default(),
            GatePolicy::default(),
            Box::new(SystemClock),
        )
    }

    pub fn with_policies(
        store: S,
        journal: TransactionJournal,
        credit_policy: CreditPolicy,
        gate_policy: GatePolicy,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            store,
            journal: Mutex::new(journal),
            devices: Mutex::new(DeviceRegistry::new()),
            ips: Mutex::new(IpRegistry::new()),
            gate: EligibilityGate::new(gate_policy),
            grants: GrantEngine::new(credit_policy),
            clock,
        }
    }

    // === Account lifecycle ===

    /// Create the balance and antifraud records for a new account
    /// (pools zero, status NOT_CLAIMED)
    pub async fn register_user(&self, user_id: &str) -> Result<(), ServiceError> {
        self.store
            .create(UserRecord::new(user_id, self.clock.now()))
            .await?;
        tracing::info!(user_id, "user registered");
        Ok(())
    }

    /// Mark the user's phone as verified (gate layer 1 requirement)
    pub async fn verify_phone(&self, user_id: &str, phone_number: &str) -> Result<(), ServiceError> {
        self.commit(user_id, |record| {
            record.antifraud.verify_phone(phone_number);
            Ok(())
        })
        .await?;
        Ok(())
    }

    /// Raise a manual abuse flag on the account
    pub async fn flag_user(&self, user_id: &str, reason: &str) -> Result<(), ServiceError> {
        let now = self.clock.now();
        self.commit(user_id, |record| {
            record.antifraud.flag(reason, now);
            Ok(())
        })
        .await?;
        tracing::warn!(user_id, reason, "user flagged for abuse");
        Ok(())
    }

    // === Grants ===

    /// First trial grant, behind the four-layer eligibility gate
    pub async fn grant_first_trial(
        &self,
        user_id: &str,
        device_id: &str,
        ip: IpAddr,
    ) -> Result<GrantOutcome, ServiceError> {
        let now = self.clock.now();

        // Gate first: no side effects on denial
        let record = self.store.load(user_id).await?;
        {
            let devices = self.devices.lock().unwrap_or_else(|e| e.into_inner());
            let ips = self.ips.lock().unwrap_or_else(|e| e.into_inner());
            self.gate
                .check(&record.antifraud, devices.get(device_id), ips.get(&ip), now)?;
        }

        let (record, (granted, before)) = self
            .commit(user_id, |record| {
                let before = snapshot(&record.balance);
                let granted =
                    self.grants
                        .first_trial(&mut record.balance, &mut record.antifraud, device_id, now)?;
                Ok((granted, before))
            })
            .await?;

        self.append_grant(&record, PoolKind::Trial, granted, "first_trial", before)?;

        // Registry updates trail the commit; losing them only under-counts
        // abuse signals
        {
            let mut ips = self.ips.lock().unwrap_or_else(|e| e.into_inner());
            ips.record_signup(ip, user_id, now, self.gate.policy());
        }
        {
            let mut devices = self.devices.lock().unwrap_or_else(|e| e.into_inner());
            if let Err(error) = devices.claim_trial(device_id, user_id, self.gate.policy()) {
                tracing::warn!(user_id, device_id, %error, "device claim lost the race");
            }
        }

        tracing::info!(user_id, device_id, granted = granted.value(), "first trial granted");
        Ok(GrantOutcome {
            granted,
            new_total: record.balance.total(),
        })
    }

    /// Second trial grant, once the first trial has expired
    pub async fn grant_second_trial(&self, user_id: &str) -> Result<GrantOutcome, ServiceError> {
        let now = self.clock.now();
        let (record, (granted, before)) = self
            .commit(user_id, |record| {
                let before = snapshot(&record.balance);
                let granted =
                    self.grants
                        .second_trial(&mut record.balance, &mut record.antifraud, now)?;
                Ok((granted, before))
            })
            .await?;

        self.append_grant(&record, PoolKind::Trial, granted, "second_trial", before)?;
        tracing::info!(user_id, granted = granted.value(), "second trial granted");
        Ok(GrantOutcome {
            granted,
            new_total: record.balance.total(),
        })
    }

    /// Flat ad-watch bonus for FREE-tier users below the ceiling
    pub async fn grant_ad_watch_bonus(
        &self,
        user_id: &str,
        videos_watched: u32,
    ) -> Result<GrantOutcome, ServiceError> {
        let now = self.clock.now();
        let (record, (granted, before)) = self
            .commit(user_id, |record| {
                let before = snapshot(&record.balance);
                let granted = self.grants.ad_watch_bonus(
                    &mut record.balance,
                    &record.antifraud,
                    videos_watched,
                    now,
                )?;
                Ok((granted, before))
            })
            .await?;

        self.append_grant(&record, PoolKind::Trial, granted, "ad_watch_bonus", before)?;
        tracing::info!(user_id, granted = granted.value(), "ad-watch bonus granted");
        Ok(GrantOutcome {
            granted,
            new_total: record.balance.total(),
        })
    }

    /// Subscription purchase/renewal from the billing webhook. Replaces
    /// the monthly pool with the tier's allotment.
    pub async fn grant_monthly_credits(
        &self,
        user_id: &str,
        tier: SubscriptionTier,
    ) -> Result<GrantOutcome, ServiceError> {
        let now = self.clock.now();
        let (record, (granted, before)) = self
            .commit(user_id, |record| {
                let before = snapshot(&record.balance);
                let granted = self.grants.monthly(&mut record.balance, tier, now)?;
                Ok((granted, before))
            })
            .await?;

        self.append_grant(&record, PoolKind::Monthly, granted, "monthly_subscription", before)?;
        tracing::info!(user_id, %tier, granted = granted.value(), "monthly credits granted");
        Ok(GrantOutcome {
            granted,
            new_total: record.balance.total(),
        })
    }

    /// Outright credit purchase from the billing webhook
    pub async fn grant_purchase_credits(
        &self,
        user_id: &str,
        amount: Credits,
    ) -> Result<GrantOutcome, ServiceError> {
        let (record, before) = self
            .commit(user_id, |record| {
                let before = snapshot(&record.balance);
                self.grants.purchase(&mut record.balance, amount)?;
                Ok(before)
            })
            .await?;

        self.append_grant(&record, PoolKind::Purchase, amount, "purchase", before)?;
        tracing::info!(user_id, granted = amount.value(), "purchased credits granted");
        Ok(GrantOutcome {
            granted: amount,
            new_total: record.balance.total(),
        })
    }

    // === Deduction ===

    /// Pay for a metered AI operation. All-or-nothing; consumes trial,
    /// then monthly, then purchase credits.
    pub async fn deduct(
        &self,
        user_id: &str,
        amount: Credits,
        reason: &str,
        feature: Option<&str>,
    ) -> Result<DeductOutcome, ServiceError> {
        let now = self.clock.now();
        let (record, (breakdown, before)) = self
            .commit(user_id, |record| {
                let before = snapshot(&record.balance);
                let breakdown = apply_deduction(&mut record.balance, amount, now)?;
                Ok((breakdown, before))
            })
            .await?;

        {
            let mut journal = self.journal.lock().unwrap_or_else(|e| e.into_inner());
            journal.append(EntryDraft::deduction(
                user_id,
                breakdown.trial_used,
                breakdown.monthly_used,
                breakdown.purchase_used,
                amount,
                reason,
                feature.map(str::to_string),
                before,
                snapshot(&record.balance),
                now,
            ))?;
        }

        tracing::info!(
            user_id,
            amount = amount.value(),
            trial = breakdown.trial_used.value(),
            monthly = breakdown.monthly_used.value(),
            purchase = breakdown.purchase_used.value(),
            "credits deducted"
        );
        Ok(DeductOutcome {
            breakdown,
            new_total: record.balance.total(),
        })
    }

    // === Queries and registry maintenance ===

    /// Record a login on a device; may flip the device abuse flag
    pub async fn track_device_login(&self, user_id: &str, device_id: &str) -> Result<(), ServiceError> {
        // Unknown users stay out of the registry
        self.store.load(user_id).await?;

        let mut devices = self.devices.lock().unwrap_or_else(|e| e.into_inner());
        devices.record_login(device_id, user_id, self.gate.policy());
        Ok(())
    }

    /// The user's balance with lazy expiry applied (read-only view,
    /// nothing persisted)
    pub async fn balance(&self, user_id: &str) -> Result<CreditBalance, ServiceError> {
        let record = self.store.load(user_id).await?;
        Ok(record.balance.effective(self.clock.now()))
    }

    /// A user's full audit trail, in append order
    pub fn history(&self, user_id: &str) -> Result<Vec<LogEntry>, ServiceError> {
        let journal = self.journal.lock().unwrap_or_else(|e| e.into_inner());
        Ok(journal.read_user(user_id)?)
    }

    /// Verify the journal hash chain. Returns the number of entries
    /// checked.
    pub fn audit(&self) -> Result<usize, ServiceError> {
        let journal = self.journal.lock().unwrap_or_else(|e| e.into_inner());
        Ok(journal.verify()?)
    }

    // === Internals ===

    /// One atomic read-modify-write against the user's record, retried on
    /// concurrent writers. Precondition failures inside `apply` abort
    /// without committing.
    async fn commit<T, F>(&self, user_id: &str, mut apply: F) -> Result<(UserRecord, T), ServiceError>
    where
        F: FnMut(&mut UserRecord) -> Result<T, ServiceError>,
    {
        for _ in 0..MAX_CAS_RETRIES {
            let mut record = self.store.load(user_id).await?;
            let expected = record.version;

            let outcome = apply(&mut record)?;
            debug_assert!(record.balance.invariant_holds());

            match self.store.compare_and_swap(expected, record.clone()).await {
                Ok(()) => return Ok((record, outcome)),
                Err(StoreError::VersionConflict { .. }) => continue,
                Err(other) => return Err(other.into()),
            }
        }

        Err(ServiceError::SystemError(format!(
            "commit for {user_id} lost {MAX_CAS_RETRIES} races, giving up"
        )))
    }

    fn append_grant(
        &self,
        record: &UserRecord,
        pool: PoolKind,
        granted: Credits,
        reason: &str,
        before: BalanceSnapshot,
    ) -> Result<(), ServiceError> {
        let after = snapshot(&record.balance);
        let mut journal = self.journal.lock().unwrap_or_else(|e| e.into_inner());
        journal.append(EntryDraft::grant(
            &record.user_id,
            pool,
            granted,
            reason,
            before,
            after,
            self.clock.now(),
        ))?;
        Ok(())
    }
}

fn snapshot(balance: &CreditBalance) -> BalanceSnapshot {
    BalanceSnapshot {
        trial: balance.trial.amount,
        monthly: balance.monthly.amount,
        purchase: balance.purchase.amount,
        total: balance.total(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use ecosort_ledger::MemoryStore;

    fn service() -> CreditService<MemoryStore> {
        CreditService::new(MemoryStore::new(), TransactionJournal::in_memory())
    }

    #[tokio::test]
    async fn test_register_then_balance_is_zero() {
        let svc = service();
        svc.register_user("alice").await.unwrap();

        let balance = svc.balance("alice").await.unwrap();
        assert!(balance.total().is_zero());
    }

    #[tokio::test]
    async fn test_register_twice_fails_cleanly() {
        let svc = service();
        svc.register_user("alice").await.unwrap();

        let result = svc.register_user("alice").await;
        assert!(matches!(result, Err(ServiceError::PreconditionFailed(_))));
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let svc = service();
        let result = svc.balance("ghost").await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_track_device_login_requires_known_user() {
        let svc = service();
        let result = svc.track_device_login("ghost", "DEV-1").await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_flag_user_blocks_trial() {
        let svc = service();
        svc.register_user("alice").await.unwrap();
        svc.verify_phone("alice", "+84900000001").await.unwrap();
        svc.flag_user("alice", "chargeback fraud").await.unwrap();

        let result = svc
            .grant_first_trial("alice", "DEV-1", "203.0.113.7".parse().unwrap())
            .await;
        assert!(matches!(result, Err(ServiceError::PermissionDenied(_))));
    }
}
