//! Trial-grant progression state machine
//!
//! `NOT_CLAIMED → CLAIMED → SECOND_GRANT_CLAIMED`. No transition is
//! reversible; re-invoking a satisfied precondition fails cleanly rather
//! than re-granting. The ad-watch bonus is tracked as a separate boolean
//! on the balance, not as a status value, so a pending second grant is
//! never lost to an orthogonal claim.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Where a user sits in the trial-grant progression
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditStatus {
    /// Fresh account; eligible for the first trial grant (gate permitting)
    #[default]
    NotClaimed,

    /// First trial granted
    Claimed,

    /// Second (post-expiry) trial granted; terminal
    SecondGrantClaimed,
}

impl CreditStatus {
    /// Whether any trial-family grant has been claimed
    pub fn has_claimed(&self) -> bool {
        !matches!(self, CreditStatus::NotClaimed)
    }
}
