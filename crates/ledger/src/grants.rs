//! Grant engine - the four grant kinds
//!
//! Each grant validates its own preconditions before mutating anything,
//! so a retried request fails cleanly instead of granting twice. The
//! eligibility gate runs at the service layer before `first_trial`; the
//! engine re-checks only the cheap guards it needs for idempotency.

use crate::balance::CreditBalance;
use crate::config::CreditPolicy;
use crate::error::GrantError;
use chrono::{DateTime, Utc};
use ecosort_antifraud::AntifraudState;
use ecosort_core::{Credits, CreditStatus, SubscriptionTier};

/// Issues credits into the three pools according to policy
#[derive(Debug, Clone, Default)]
pub struct GrantEngine {
    policy: CreditPolicy,
}

impl GrantEngine {
    pub fn new(policy: CreditPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &CreditPolicy {
        &self.policy
    }

    /// First trial grant. The caller must have passed the eligibility
    /// gate; the status guard here keeps a retried call from granting
    /// twice.
    pub fn first_trial(
        &self,
        balance: &mut CreditBalance,
        antifraud: &mut AntifraudState,
        device_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Credits, GrantError> {
        if antifraud.credit_status != CreditStatus::NotClaimed {
            return Err(GrantError::AlreadyClaimed(antifraud.credit_status));
        }
        if antifraud.abuse_flagged {
            return Err(GrantError::AccountFlagged);
        }

        let grant = self.policy.first_trial_grant;
        let expires_at = now + self.policy.trial_validity();

        balance.trial.amount = grant;
        balance.trial.granted_at = Some(now);
        balance.trial.expires_at = Some(expires_at);
        balance.trial.first_grant_claimed = true;
        balance.trial.second_grant_eligible_at = Some(expires_at);
        balance.trial.amount_at_expiry = None;
        balance.recompute_total();

        antifraud.credit_status = CreditStatus::Claimed;
        antifraud.initial_device_id = Some(device_id.to_string());

        Ok(grant)
    }

    /// Second trial grant, available once the first trial has expired.
    ///
    /// The amount branches on the trial balance at the moment of expiry:
    /// the snapshot taken when lazy expiry fired, or the stored amount if
    /// this request is the first touch since expiry.
    pub fn second_trial(
        &self,
        balance: &mut CreditBalance,
        antifraud: &mut AntifraudState,
        now: DateTime<Utc>,
    ) -> Result<Credits, GrantError> {
        if balance.monthly.tier != SubscriptionTier::Free {
            return Err(GrantError::PaidTierIneligible(balance.monthly.tier));
        }
        if balance.trial.second_grant_claimed {
            return Err(GrantError::SecondAlreadyClaimed);
        }
        if antifraud.abuse_flagged {
            return Err(GrantError::AccountFlagged);
        }
        let eligible_at = balance
            .trial
            .second_grant_eligible_at
            .ok_or(GrantError::FirstTrialNotClaimed)?;
        if now < eligible_at {
            return Err(GrantError::NotYetEligible { eligible_at });
        }

        // Eligibility implies the first trial's expiry has passed, so this
        // settles any still-stored trial amount and records the snapshot.
        balance.settle_trial_expiry(now);
        let at_expiry = balance.trial.amount_at_expiry.unwrap_or(Credits::ZERO);

        let grant = if at_expiry >= self.policy.second_grant_threshold {
            self.policy.second_grant_high
        } else {
            self.policy.second_grant_low
        };

        // Anything still in the pool after settling is unexpired (an
        // ad-watch bonus claimed post-expiry stamps a fresh window), so
        // the grant adds to it instead of replacing it
        balance.trial.amount = balance
            .trial
            .amount
            .checked_add(grant)
            .ok_or(GrantError::AmountOverflow)?;
        balance.trial.granted_at = Some(now);
        balance.trial.expires_at = Some(now + self.policy.trial_validity());
        balance.trial.second_grant_claimed = true;
        balance.recompute_total();

        antifraud.credit_status = CreditStatus::SecondGrantClaimed;

        Ok(grant)
    }

    /// One-shot ad-watch bonus: a flat top-up for FREE-tier users running
    /// on fumes. Does not extend an active trial window; if the window is
    /// absent or already past, a fresh one is stamped so the bonus is
    /// spendable.
    pub fn ad_watch_bonus(
        &self,
        balance: &mut CreditBalance,
        antifraud: &AntifraudState,
        videos_watched: u32,
        now: DateTime<Utc>,
    ) -> Result<Credits, GrantError> {
        if videos_watched != self.policy.ad_bonus_required_videos {
            return Err(GrantError::WrongVideoCount {
                expected: self.policy.ad_bonus_required_videos,
                actual: videos_watched,
            });
        }
        if balance.monthly.tier != SubscriptionTier::Free {
            return Err(GrantError::PaidTierIneligible(balance.monthly.tier));
        }
        if balance.ad_watch.claimed {
            return Err(GrantError::AdBonusAlreadyClaimed);
        }
        if antifraud.abuse_flagged {
            return Err(GrantError::AccountFlagged);
        }

        balance.settle_trial_expiry(now);
        if balance.total() >= self.policy.ad_bonus_ceiling {
            return Err(GrantError::BalanceAboveCeiling {
                total: balance.total(),
                ceiling: self.policy.ad_bonus_ceiling,
            });
        }

        let bonus = self.policy.ad_bonus;
        balance.trial.amount = balance
            .trial
            .amount
            .checked_add(bonus)
            .ok_or(GrantError::AmountOverflow)?;
        let window_active = balance.trial.expires_at.is_some_and(|at| now < at);
        if !window_active {
            balance.trial.expires_at = Some(now + self.policy.trial_validity());
        }
        balance.ad_watch.claimed = true;
        balance.ad_watch.claimed_at = Some(now);
        balance.recompute_total();

        Ok(bonus)
    }

    /// Subscription purchase/renewal: replaces the monthly pool with the
    /// tier's allotment and starts a fresh reset window. Trial and
    /// purchase pools are untouched.
    pub fn monthly(
        &self,
        balance: &mut CreditBalance,
        tier: SubscriptionTier,
        now: DateTime<Utc>,
    ) -> Result<Credits, GrantError> {
        let allotment = tier.monthly_allotment();
        if allotment.is_zero() {
            return Err(GrantError::TierWithoutAllotment(tier));
        }

        balance.monthly.amount = allotment;
        balance.monthly.reset_at = Some(now + self.policy.monthly_reset());
        balance.monthly.tier = tier;
        balance.recompute_total();

        Ok(allotment)
    }

    /// Outright purchase: adds to the purchase pool and the lifetime
    /// counter. Never expires, never reset.
    pub fn purchase(
        &self,
        balance: &mut CreditBalance,
        amount: Credits,
    ) -> Result<Credits, GrantError> {
        if amount.is_zero() {
            return Err(GrantError::NonPositiveAmount);
        }

        balance.purchase.amount = balance
            .purchase
            .amount
            .checked_add(amount)
            .ok_or(GrantError::AmountOverflow)?;
        balance.purchase.total_purchased_lifetime = balance
            .purchase
            .total_purchased_lifetime
            .checked_add(amount)
            .ok_or(GrantError::AmountOverflow)?;
        balance.recompute_total();

        Ok(balance.purchase.amount)
    }
}
