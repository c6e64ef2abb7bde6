//! Eligibility gate - four ordered barriers guarding trial-family grants
//!
//! Layers run strictly in order and the first failure short-circuits with
//! no side effects. Cheap account checks run before the secondary-record
//! lookups (IP, device); the explicit abuse flag runs last so a manual
//! flag always overrides the automated heuristics.

use crate::config::GatePolicy;
use crate::device::DeviceRecord;
use crate::ip::IpRecord;
use crate::state::AntifraudState;
use chrono::{DateTime, Utc};
use ecosort_core::CreditStatus;
use std::net::IpAddr;
use strum_macros::Display;
use thiserror::Error;

/// Which barrier denied the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GateLayer {
    /// Layer 1: phone verification and claim status
    Account,
    /// Layer 2: per-IP signup window
    Network,
    /// Layer 3: device claim history and device abuse flag
    Device,
    /// Layer 4: explicit per-user abuse flag
    AbuseFlag,
}

/// A gate denial, naming the failing layer so callers can surface an
/// actionable message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateDenial {
    #[error("Phone verification required")]
    PhoneNotVerified,

    #[error("Trial credits already claimed (status {status})")]
    AlreadyClaimed { status: CreditStatus },

    #[error("Too many signups from {ip} in the current window ({count})")]
    NetworkSaturated { ip: IpAddr, count: u32 },

    #[error("Device already used for a trial claim")]
    DeviceAlreadyUsed { claimed_by: String },

    #[error("Device is flagged for abuse")]
    DeviceFlagged,

    #[error("Account is flagged for abuse")]
    AccountFlagged { reason: Option<String> },
}

impl GateDenial {
    /// The barrier this denial came from
    pub fn layer(&self) -> GateLayer {
        match self {
            GateDenial::PhoneNotVerified | GateDenial::AlreadyClaimed { .. } => GateLayer::Account,
            GateDenial::NetworkSaturated { .. } => GateLayer::Network,
            GateDenial::DeviceAlreadyUsed { .. } | GateDenial::DeviceFlagged => GateLayer::Device,
            GateDenial::AccountFlagged { .. } => GateLayer::AbuseFlag,
        }
    }
}

/// The four-layer eligibility check for trial-family grants
#[derive(Debug, Clone, Default)]
pub struct EligibilityGate {
    policy: GatePolicy,
}

impl EligibilityGate {
    pub fn new(policy: GatePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &GatePolicy {
        &self.policy
    }

    /// Evaluate all four barriers in order. Registry records are passed in
    /// by the caller (None means the device/IP has never been seen, which
    /// always passes those layers).
    pub fn check(
        &self,
        antifraud: &AntifraudState,
        device: Option<&DeviceRecord>,
        ip: Option<&IpRecord>,
        now: DateTime<Utc>,
    ) -> Result<(), GateDenial> {
        // Layer 1: account
        if !antifraud.phone_verified {
            return Err(GateDenial::PhoneNotVerified);
        }
        if antifraud.credit_status != CreditStatus::NotClaimed {
            return Err(GateDenial::AlreadyClaimed {
                status: antifraud.credit_status,
            });
        }

        // Layer 2: network
        if let Some(record) = ip {
            if record.is_saturated(now, &self.policy) {
                return Err(GateDenial::NetworkSaturated {
                    ip: record.ip,
                    count: record.count,
                });
            }
        }

        // Layer 3: device
        if let Some(record) = device {
            if let Some(claimed_by) = &record.trial_claimed_by {
                return Err(GateDenial::DeviceAlreadyUsed {
                    claimed_by: claimed_by.clone(),
                });
            }
            if record.abuse_flagged {
                return Err(GateDenial::DeviceFlagged);
            }
        }

        // Layer 4: explicit abuse flag, independent of device/IP state
        if antifraud.abuse_flagged {
            return Err(GateDenial::AccountFlagged {
                reason: antifraud.flag_reason.clone(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn verified_state() -> AntifraudState {
        let mut state = AntifraudState::new();
        state.verify_phone("+84900000001");
        state
    }

    fn saturated_ip(now: DateTime<Utc>) -> IpRecord {
        let policy = GatePolicy::default();
        let mut record = IpRecord::new("203.0.113.7".parse().unwrap(), "u1", now);
        record.record_signup("u2", now, &policy);
        record.record_signup("u3", now, &policy);
        record
    }

    #[test]
    fn test_pass_with_no_records() {
        let gate = EligibilityGate::default();
        let state = verified_state();
        assert!(gate.check(&state, None, None, Utc::now()).is_ok());
    }

    #[test]
    fn test_layer1_phone_not_verified() {
        let gate = EligibilityGate::default();
        let state = AntifraudState::new();
        let denial = gate.check(&state, None, None, Utc::now()).unwrap_err();
        assert_eq!(denial, GateDenial::PhoneNotVerified);
        assert_eq!(denial.layer(), GateLayer::Account);
    }

    #[test]
    fn test_layer1_already_claimed() {
        let gate = EligibilityGate::default();
        let mut state = verified_state();
        state.credit_status = CreditStatus::Claimed;
        let denial = gate.check(&state, None, None, Utc::now()).unwrap_err();
        assert!(matches!(denial, GateDenial::AlreadyClaimed { .. }));
    }

    #[test]
    fn test_layer2_saturated_ip() {
        let gate = EligibilityGate::default();
        let state = verified_state();
        let now = Utc::now();
        let ip = saturated_ip(now);

        let denial = gate.check(&state, None, Some(&ip), now).unwrap_err();
        assert!(matches!(denial, GateDenial::NetworkSaturated { count: 3, .. }));
        assert_eq!(denial.layer(), GateLayer::Network);
    }

    #[test]
    fn test_layer2_expired_window_passes() {
        let gate = EligibilityGate::default();
        let state = verified_state();
        let now = Utc::now();
        let ip = saturated_ip(now);

        let later = now + Duration::hours(24);
        assert!(gate.check(&state, None, Some(&ip), later).is_ok());
    }

    #[test]
    fn test_layer3_device_already_used() {
        let gate = EligibilityGate::default();
        let state = verified_state();
        let mut device = DeviceRecord::new("DEV-1");
        device.claim_trial("someone-else").unwrap();

        let denial = gate
            .check(&state, Some(&device), None, Utc::now())
            .unwrap_err();
        assert!(matches!(denial, GateDenial::DeviceAlreadyUsed { .. }));
        assert_eq!(denial.layer(), GateLayer::Device);
    }

    #[test]
    fn test_layer3_flagged_device() {
        let gate = EligibilityGate::default();
        let state = verified_state();
        let mut device = DeviceRecord::new("DEV-1");
        device.abuse_flagged = true;

        let denial = gate
            .check(&state, Some(&device), None, Utc::now())
            .unwrap_err();
        assert_eq!(denial, GateDenial::DeviceFlagged);
    }

    #[test]
    fn test_layer4_flagged_account_with_clean_device_and_ip() {
        let gate = EligibilityGate::default();
        let mut state = verified_state();
        state.flag("manual review", Utc::now());

        let device = DeviceRecord::new("DEV-1");
        let denial = gate
            .check(&state, Some(&device), None, Utc::now())
            .unwrap_err();
        assert!(matches!(denial, GateDenial::AccountFlagged { .. }));
        assert_eq!(denial.layer(), GateLayer::AbuseFlag);
    }

    #[test]
    fn test_first_failure_wins() {
        // Unverified phone reported even when the device is also flagged
        let gate = EligibilityGate::default();
        let state = AntifraudState::new();
        let mut device = DeviceRecord::new("DEV-1");
        device.abuse_flagged = true;

        let denial = gate
            .check(&state, Some(&device), None, Utc::now())
            .unwrap_err();
        assert_eq!(denial, GateDenial::PhoneNotVerified);
    }
}
