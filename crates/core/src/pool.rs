//! The three independently-tracked credit pools

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// One of the three credit pools making up a user's balance.
///
/// Consumption order is fixed: trial (soonest to expire), then monthly
/// (resets each cycle), then purchase (never expires, spent last).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoolKind {
    /// Time-limited free credits granted through the eligibility gate
    Trial,

    /// Subscription credits, fully replaced each billing cycle
    Monthly,

    /// Permanently-owned purchased credits
    Purchase,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_roundtrip() {
        for kind in [PoolKind::Trial, PoolKind::Monthly, PoolKind::Purchase] {
            let s = kind.to_string();
            assert_eq!(PoolKind::from_str(&s).unwrap(), kind);
        }
    }
}
