//! Credit balance - three pools plus the derived total
//!
//! The stored `total` always equals the sum of the three pool amounts.
//! Mutators in this crate recompute it on every write; it is never
//! adjusted independently.

use chrono::{DateTime, Utc};
use ecosort_core::{Credits, SubscriptionTier};
use serde::{Deserialize, Serialize};

/// Time-limited trial credits and the state of the two trial grants
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialPool {
    pub amount: Credits,
    pub granted_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub first_grant_claimed: bool,
    pub second_grant_claimed: bool,

    /// When the second grant becomes available (the first trial's expiry)
    pub second_grant_eligible_at: Option<DateTime<Utc>>,

    /// Trial balance snapshotted when lazy expiry fired. Drives the
    /// second-grant amount branch.
    pub amount_at_expiry: Option<Credits>,
}

impl TrialPool {
    /// Whether the pool's expiry time has passed
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Subscription credits, fully replaced each billing cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPool {
    pub amount: Credits,
    pub reset_at: Option<DateTime<Utc>>,
    pub tier: SubscriptionTier,
}

/// Permanently-owned purchased credits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasePool {
    pub amount: Credits,
    pub total_purchased_lifetime: Credits,
}

/// One-shot ad-watch bonus claim, orthogonal to the trial-grant progression
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdWatchBonus {
    pub claimed: bool,
    pub claimed_at: Option<DateTime<Utc>>,
}

/// A user's full credit balance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditBalance {
    pub trial: TrialPool,
    pub monthly: MonthlyPool,
    pub purchase: PurchasePool,
    pub ad_watch: AdWatchBonus,
    pub(crate) total: Credits,
}

impl CreditBalance {
    /// A fresh balance: all pools zero
    pub fn new() -> Self {
        Self::default()
    }

    /// The derived total across all three pools
    pub fn total(&self) -> Credits {
        self.total
    }

    /// Recompute the stored total from the pool amounts
    pub(crate) fn recompute_total(&mut self) {
        self.total = Credits::new_unchecked(
            self.trial.amount.value() + self.monthly.amount.value() + self.purchase.amount.value(),
        );
    }

    /// Lazy expiry: if the trial pool holds credits past their expiry,
    /// snapshot the amount, zero the pool, and recompute the total.
    /// Returns the expired amount when it fires.
    pub fn settle_trial_expiry(&mut self, now: DateTime<Utc>) -> Option<Credits> {
        if self.trial.amount.is_zero() || !self.trial.is_expired(now) {
            return None;
        }
        let expired = self.trial.amount;
        self.trial.amount_at_expiry = Some(expired);
        self.trial.amount = Credits::ZERO;
        self.recompute_total();
        Some(expired)
    }

    /// Read-side view with lazy expiry applied, without persisting it
    pub fn effective(&self, now: DateTime<Utc>) -> CreditBalance {
        let mut view = self.clone();
        view.settle_trial_expiry(now);
        view
    }

    /// Whether the stored total matches the pool sum
    pub fn invariant_holds(&self) -> bool {
        self.total.value()
            == self.trial.amount.value()
                + self.monthly.amount.value()
                + self.purchase.amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_fresh_balance_is_zero() {
        let balance = CreditBalance::new();
        assert!(balance.total().is_zero());
        assert!(balance.invariant_holds());
    }

    #[test]
    fn test_recompute_total() {
        let mut balance = CreditBalance::new();
        balance.trial.amount = Credits::new_unchecked(100);
        balance.monthly.amount = Credits::new_unchecked(200);
        balance.purchase.amount = Credits::new_unchecked(50);
        balance.recompute_total();

        assert_eq!(balance.total().value(), 350);
        assert!(balance.invariant_holds());
    }

    #[test]
    fn test_settle_before_expiry_is_noop() {
        let now = Utc::now();
        let mut balance = CreditBalance::new();
        balance.trial.amount = Credits::new_unchecked(500);
        balance.trial.expires_at = Some(now + Duration::days(14));
        balance.recompute_total();

        assert!(balance.settle_trial_expiry(now).is_none());
        assert_eq!(balance.trial.amount.value(), 500);
    }

    #[test]
    fn test_settle_after_expiry_snapshots_amount() {
        let now = Utc::now();
        let mut balance = CreditBalance::new();
        balance.trial.amount = Credits::new_unchecked(350);
        balance.trial.expires_at = Some(now - Duration::seconds(1));
        balance.monthly.amount = Credits::new_unchecked(100);
        balance.recompute_total();

        let expired = balance.settle_trial_expiry(now).unwrap();
        assert_eq!(expired.value(), 350);
        assert!(balance.trial.amount.is_zero());
        assert_eq!(balance.trial.amount_at_expiry, Some(expired));
        assert_eq!(balance.total().value(), 100);
        assert!(balance.invariant_holds());
    }

    #[test]
    fn test_settle_fires_once() {
        let now = Utc::now();
        let mut balance = CreditBalance::new();
        balance.trial.amount = Credits::new_unchecked(350);
        balance.trial.expires_at = Some(now - Duration::seconds(1));
        balance.recompute_total();

        assert!(balance.settle_trial_expiry(now).is_some());
        assert!(balance.settle_trial_expiry(now).is_none());
        // The snapshot survives the second call
        assert_eq!(balance.trial.amount_at_expiry.unwrap().value(), 350);
    }

    #[test]
    fn test_effective_does_not_mutate() {
        let now = Utc::now();
        let mut balance = CreditBalance::new();
        balance.trial.amount = Credits::new_unchecked(500);
        balance.trial.expires_at = Some(now - Duration::seconds(1));
        balance.recompute_total();

        let view = balance.effective(now);
        assert!(view.trial.amount.is_zero());
        assert!(view.total().is_zero());
        // Stored balance untouched
        assert_eq!(balance.trial.amount.value(), 500);
    }
}
