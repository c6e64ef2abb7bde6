//! Subscription tiers and their monthly credit allotments

use crate::credits::Credits;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Subscription tier for a user account.
///
/// Monthly credits are replaced (not accumulated) on each billing cycle
/// with the tier's fixed allotment.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionTier {
    /// No paid subscription; only trial and purchased credits
    #[default]
    Free,

    /// PRO subscription: 3000 credits per 30-day cycle
    Pro,

    /// ULTRA subscription: 10000 credits per 30-day cycle
    Ultra,
}

impl SubscriptionTier {
    /// Fixed monthly allotment for this tier (zero for FREE)
    pub fn monthly_allotment(&self) -> Credits {
        match self {
            SubscriptionTier::Free => Credits::ZERO,
            SubscriptionTier::Pro => Credits::new_unchecked(3000),
            SubscriptionTier::Ultra => Credits::new_unchecked(10000),
        }
    }

    /// Whether this tier carries a paid subscription
    pub fn is_paid(&self) -> bool {
        !matches!(self, SubscriptionTier::Free)
    }
}
