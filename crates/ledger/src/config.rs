//! Credit policy - grant amounts, expiry windows, thresholds
//!
//! Everything the ledger treats as an economic constant lives here rather
//! than inline, so policy changes never touch engine code.

use chrono::Duration;
use ecosort_core::Credits;

/// Economic policy for grants and expiry
#[derive(Debug, Clone)]
pub struct CreditPolicy {
    /// Credits granted on the first (gated) trial
    pub first_trial_grant: Credits,

    /// Trial pool lifetime in days
    pub trial_validity_days: i64,

    /// Second-grant amount when the balance at expiry met the threshold
    pub second_grant_high: Credits,

    /// Second-grant amount otherwise
    pub second_grant_low: Credits,

    /// Balance-at-expiry threshold selecting the high second grant
    pub second_grant_threshold: Credits,

    /// Flat ad-watch bonus added to the trial pool
    pub ad_bonus: Credits,

    /// Exact number of videos required for the ad-watch bonus
    pub ad_bonus_required_videos: u32,

    /// The ad-watch bonus requires the effective total to be below this
    pub ad_bonus_ceiling: Credits,

    /// Monthly pool reset window in days
    pub monthly_reset_days: i64,
}

impl Default for CreditPolicy {
    fn default() -> Self {
        Self {
            first_trial_grant: Credits::new_unchecked(500),
            trial_validity_days: 14,
            second_grant_high: Credits::new_unchecked(300),
            second_grant_low: Credits::new_unchecked(100),
            second_grant_threshold: Credits::new_unchecked(300),
            ad_bonus: Credits::new_unchecked(50),
            ad_bonus_required_videos: 4,
            ad_bonus_ceiling: Credits::new_unchecked(50),
            monthly_reset_days: 30,
        }
    }
}

impl CreditPolicy {
    /// Trial lifetime as a chrono Duration
    pub fn trial_validity(&self) -> Duration {
        Duration::days(self.trial_validity_days)
    }

    /// Monthly reset window as a chrono Duration
    pub fn monthly_reset(&self) -> Duration {
        Duration::days(self.monthly_reset_days)
    }
}
