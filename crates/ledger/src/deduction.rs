//! Deduction engine - priority consumption across the three pools
//!
//! Consumption order is fixed economic policy: trial first (soonest to
//! expire), then monthly (use it or lose it), then purchase (never
//! expires, spent last). A failed deduction mutates nothing.

use crate::balance::CreditBalance;
use crate::error::DeductionError;
use chrono::{DateTime, Utc};
use ecosort_core::Credits;

/// How a deduction was split across the pools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeductionBreakdown {
    pub trial_used: Credits,
    pub monthly_used: Credits,
    pub purchase_used: Credits,
}

impl DeductionBreakdown {
    /// Sum of the three per-pool amounts
    pub fn total_used(&self) -> Credits {
        Credits::new_unchecked(
            self.trial_used.value() + self.monthly_used.value() + self.purchase_used.value(),
        )
    }
}

/// Deduct `amount` from the balance, all-or-nothing.
///
/// Applies lazy trial expiry first so a user never pays with credits that
/// have already expired, then checks sufficiency against the settled
/// total, then drains the pools in priority order.
pub fn deduct(
    balance: &mut CreditBalance,
    amount: Credits,
    now: DateTime<Utc>,
) -> Result<DeductionBreakdown, DeductionError> {
    if amount.is_zero() {
        return Err(DeductionError::NonPositiveAmount);
    }

    balance.settle_trial_expiry(now);

    if balance.total() < amount {
        return Err(DeductionError::InsufficientCredits {
            requested: amount,
            available: balance.total(),
        });
    }

    let trial_used = amount.min(balance.trial.amount);
    let mut remaining = amount.saturating_sub(trial_used);

    let monthly_used = remaining.min(balance.monthly.amount);
    remaining = remaining.saturating_sub(monthly_used);

    let purchase_used = remaining.min(balance.purchase.amount);
    remaining = remaining.saturating_sub(purchase_used);

    // Sufficiency passed above, so the pools cover the full amount
    debug_assert!(remaining.is_zero());

    balance.trial.amount = balance.trial.amount.saturating_sub(trial_used);
    balance.monthly.amount = balance.monthly.amount.saturating_sub(monthly_used);
    balance.purchase.amount = balance.purchase.amount.saturating_sub(purchase_used);
    balance.recompute_total();

    Ok(DeductionBreakdown {
        trial_used,
        monthly_used,
        purchase_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn balance(trial: i64, monthly: i64, purchase: i64, now: DateTime<Utc>) -> CreditBalance {
        let mut b = CreditBalance::new();
        b.trial.amount = Credits::new_unchecked(trial);
        b.trial.expires_at = Some(now + Duration::days(14));
        b.monthly.amount = Credits::new_unchecked(monthly);
        b.purchase.amount = Credits::new_unchecked(purchase);
        b.recompute_total();
        b
    }

    #[test]
    fn test_priority_order_across_pools() {
        // trial=100, monthly=200, purchase=50; deduct 250
        let now = Utc::now();
        let mut b = balance(100, 200, 50, now);

        let breakdown = deduct(&mut b, Credits::new_unchecked(250), now).unwrap();
        assert_eq!(breakdown.trial_used.value(), 100);
        assert_eq!(breakdown.monthly_used.value(), 150);
        assert_eq!(breakdown.purchase_used.value(), 0);

        assert_eq!(b.trial.amount.value(), 0);
        assert_eq!(b.monthly.amount.value(), 50);
        assert_eq!(b.purchase.amount.value(), 50);
        assert_eq!(b.total().value(), 100);
        assert!(b.invariant_holds());
    }

    #[test]
    fn test_monthly_only_touched_after_trial_drained() {
        let now = Utc::now();
        let mut b = balance(300, 100, 0, now);

        let breakdown = deduct(&mut b, Credits::new_unchecked(200), now).unwrap();
        assert_eq!(breakdown.trial_used.value(), 200);
        assert!(breakdown.monthly_used.is_zero());
        assert_eq!(b.trial.amount.value(), 100);
    }

    #[test]
    fn test_purchase_spent_last() {
        let now = Utc::now();
        let mut b = balance(10, 10, 100, now);

        let breakdown = deduct(&mut b, Credits::new_unchecked(50), now).unwrap();
        assert_eq!(breakdown.trial_used.value(), 10);
        assert_eq!(breakdown.monthly_used.value(), 10);
        assert_eq!(breakdown.purchase_used.value(), 30);
        assert_eq!(breakdown.total_used().value(), 50);
    }

    #[test]
    fn test_insufficient_is_all_or_nothing() {
        // trial=500; deduct 600 fails, balances unchanged
        let now = Utc::now();
        let mut b = balance(500, 0, 0, now);
        let before = b.clone();

        let result = deduct(&mut b, Credits::new_unchecked(600), now);
        assert!(matches!(
            result,
            Err(DeductionError::InsufficientCredits { requested, available })
                if requested.value() == 600 && available.value() == 500
        ));
        assert_eq!(b, before);
    }

    #[test]
    fn test_expired_trial_cannot_pay() {
        let now = Utc::now();
        let mut b = balance(500, 0, 0, now);
        b.trial.expires_at = Some(now - Duration::seconds(1));

        let result = deduct(&mut b, Credits::new_unchecked(100), now);
        assert!(matches!(
            result,
            Err(DeductionError::InsufficientCredits { available, .. }) if available.is_zero()
        ));
        // Lazy expiry persisted even though the deduction failed
        assert!(b.trial.amount.is_zero());
        assert_eq!(b.trial.amount_at_expiry.unwrap().value(), 500);
    }

    #[test]
    fn test_expired_trial_falls_through_to_monthly() {
        let now = Utc::now();
        let mut b = balance(500, 200, 0, now);
        b.trial.expires_at = Some(now - Duration::seconds(1));

        let breakdown = deduct(&mut b, Credits::new_unchecked(150), now).unwrap();
        assert!(breakdown.trial_used.is_zero());
        assert_eq!(breakdown.monthly_used.value(), 150);
        assert_eq!(b.total().value(), 50);
    }

    #[test]
    fn test_zero_amount_rejected() {
        let now = Utc::now();
        let mut b = balance(100, 0, 0, now);
        assert!(matches!(
            deduct(&mut b, Credits::ZERO, now),
            Err(DeductionError::NonPositiveAmount)
        ));
    }

    #[test]
    fn test_exact_drain() {
        let now = Utc::now();
        let mut b = balance(100, 200, 50, now);

        let breakdown = deduct(&mut b, Credits::new_unchecked(350), now).unwrap();
        assert_eq!(breakdown.total_used().value(), 350);
        assert!(b.total().is_zero());
        assert!(b.invariant_holds());
    }
}
