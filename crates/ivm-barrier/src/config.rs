//! Barrier timing configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default minimum display time
pub const DEFAULT_MIN_DURATION_MS: u64 = 2_500;
/// Default exit animation length
pub const DEFAULT_EXIT_DURATION_MS: u64 = 700;
/// Default entrance animation length
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 800;

/// Timing for one barrier instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarrierConfig {
    /// Duration floor measured from construction
    pub min_duration_ms: u64,
    /// Time spent in `Exiting` before `Finished`
    pub exit_duration_ms: u64,
    /// Time spent in `Entering` before `Settled`
    pub settle_delay_ms: u64,
}

impl BarrierConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With duration floor
    #[inline]
    #[must_use]
    pub fn with_min_duration(mut self, min: Duration) -> Self {
        self.min_duration_ms = duration_ms(min);
        self
    }

    /// With exit animation length
    #[inline]
    #[must_use]
    pub fn with_exit_duration(mut self, exit: Duration) -> Self {
        self.exit_duration_ms = duration_ms(exit);
        self
    }

    /// With entrance animation length
    #[inline]
    #[must_use]
    pub fn with_settle_delay(mut self, settle: Duration) -> Self {
        self.settle_delay_ms = duration_ms(settle);
        self
    }

    /// Duration floor
    #[inline]
    #[must_use]
    pub fn min_duration(&self) -> Duration {
        Duration::from_millis(self.min_duration_ms)
    }

    /// Exit animation length
    #[inline]
    #[must_use]
    pub fn exit_duration(&self) -> Duration {
        Duration::from_millis(self.exit_duration_ms)
    }

    /// Entrance animation length
    #[inline]
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for BarrierConfig {
    fn default() -> Self {
        Self {
            min_duration_ms: DEFAULT_MIN_DURATION_MS,
            exit_duration_ms: DEFAULT_EXIT_DURATION_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
