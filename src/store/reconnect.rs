//! Reconnect-on-drop policy.
//!
//! Off by default: a dropped channel leaves the store disconnected until
//! someone calls `connect` again. When enabled, the store re-opens the
//! same scope after an exponentially growing delay.

use std::time::Duration;

/// Exponential backoff settings for re-opening a dropped channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Master switch.
    pub enabled: bool,
    /// Delay before the first attempt.
    pub base_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Attempts before giving up; `0` means unlimited.
    pub max_attempts: u32,
}

impl ReconnectPolicy {
    /// Policy that never reconnects.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            max_attempts: 10,
        }
    }

    /// Enabled policy with the given backoff parameters.
    #[must_use]
    pub const fn exponential(base_delay: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        Self {
            enabled: true,
            base_delay,
            max_delay,
            max_attempts,
        }
    }

    /// Delay before attempt number `attempt` (0-based), or `None` when the
    /// policy is off or exhausted.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if !self.enabled || (self.max_attempts != 0 && attempt >= self.max_attempts) {
            return None;
        }
        let factor = 2u32.saturating_pow(attempt);
        Some(self.base_delay.saturating_mul(factor).min(self.max_delay))
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}
