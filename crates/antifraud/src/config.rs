//! Gate policy - configurable anti-abuse thresholds

use chrono::Duration;

/// Thresholds for the eligibility gate and registries.
///
/// All values are configurable rather than hardcoded so that abuse
/// response can be tuned without a code change.
#[derive(Debug, Clone)]
pub struct GatePolicy {
    /// Length of the per-IP signup window in hours
    pub ip_window_hours: i64,

    /// Signups from one IP within the window before further trial
    /// claims are denied
    pub ip_max_signups: u32,

    /// Distinct logins on one device before it is auto-flagged
    pub device_login_flag_threshold: usize,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            ip_window_hours: 24,
            ip_max_signups: 3,
            device_login_flag_threshold: 10,
        }
    }
}

impl GatePolicy {
    /// The IP signup window as a chrono Duration
    pub fn ip_window(&self) -> Duration {
        Duration::hours(self.ip_window_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = GatePolicy::default();
        assert_eq!(policy.ip_window(), Duration::hours(24));
        assert_eq!(policy.ip_max_signups, 3);
        assert_eq!(policy.device_login_flag_threshold, 10);
    }
}
