//! Task runner configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing and synthetic-progress shape for a `TaskRunner`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Minimum perceived duration, measured from invocation
    pub min_duration_ms: u64,
    /// Synthetic progress tick period
    pub tick_interval_ms: u64,
    /// Smallest synthetic increment
    pub min_step: f64,
    /// Largest synthetic increment (exclusive)
    pub max_step: f64,
    /// Synthetic progress never passes this before the real result
    pub ceiling: f64,
    /// Time spent at 100% before resolving
    pub success_hold_ms: u64,
    /// Fixed seed for reproducible progress steps
    pub seed: Option<u64>,
}

impl RunnerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With minimum perceived duration
    #[inline]
    #[must_use]
    pub fn with_min_duration(mut self, min: Duration) -> Self {
        self.min_duration_ms = u64::try_from(min.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With hold time at 100%
    #[inline]
    #[must_use]
    pub fn with_success_hold(mut self, hold: Duration) -> Self {
        self.success_hold_ms = u64::try_from(hold.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With deterministic progress steps
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Minimum perceived duration
    #[inline]
    #[must_use]
    pub fn min_duration(&self) -> Duration {
        Duration::from_millis(self.min_duration_ms)
    }

    /// Tick period, never zero
    #[inline]
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Hold time at 100%
    #[inline]
    #[must_use]
    pub fn success_hold(&self) -> Duration {
        Duration::from_millis(self.success_hold_ms)
    }

    /// Ceiling clamped below 100. Non-finite values fall back to the default.
    #[inline]
    #[must_use]
    pub fn effective_ceiling(&self) -> f64 {
        let ceiling = if self.ceiling.is_finite() {
            self.ceiling
        } else {
            DEFAULT_CEILING
        };
        ceiling.clamp(0.0, 99.0)
    }

    /// Step bounds as finite, non-negative `(min, max)`.
    ///
    /// Non-finite bounds fall back to the defaults; `max` is never below `min`.
    #[must_use]
    pub fn step_range(&self) -> (f64, f64) {
        let sane = |value: f64, fallback: f64| {
            if value.is_finite() {
                value.max(0.0)
            } else {
                fallback
            }
        };
        let min = sane(self.min_step, DEFAULT_MIN_STEP);
        let max = sane(self.max_step, DEFAULT_MAX_STEP);
        (min, max.max(min))
    }
}

const DEFAULT_MIN_STEP: f64 = 2.0;
const DEFAULT_MAX_STEP: f64 = 5.0;
const DEFAULT_CEILING: f64 = 92.0;

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            min_duration_ms: 5_000,
            tick_interval_ms: 300,
            min_step: DEFAULT_MIN_STEP,
            max_step: DEFAULT_MAX_STEP,
            ceiling: DEFAULT_CEILING,
            success_hold_ms: 1_500,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RunnerConfig::new();
        assert_eq!(config.min_duration(), Duration::from_secs(5));
        assert_eq!(config.tick_interval(), Duration::from_millis(300));
        assert_eq!(config.success_hold(), Duration::from_millis(1_500));
        assert!((config.effective_ceiling() - 92.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ceiling_stays_below_complete() {
        let config = RunnerConfig {
            ceiling: 150.0,
            ..RunnerConfig::default()
        };
        assert!(config.effective_ceiling() < 100.0);
    }

    #[test]
    fn zero_tick_is_clamped() {
        let config = RunnerConfig {
            tick_interval_ms: 0,
            ..RunnerConfig::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(1));
    }

    #[test]
    fn nan_ceiling_falls_back_to_default() {
        let config = RunnerConfig {
            ceiling: f64::NAN,
            ..RunnerConfig::default()
        };
        assert!((config.effective_ceiling() - 92.0).abs() < f64::EPSILON);

        let config = RunnerConfig {
            ceiling: f64::INFINITY,
            ..RunnerConfig::default()
        };
        assert!((config.effective_ceiling() - 92.0).abs() < f64::EPSILON);
    }

    #[test]
    fn non_finite_steps_fall_back_to_defaults() {
        let config = RunnerConfig {
            min_step: f64::NEG_INFINITY,
            max_step: f64::INFINITY,
            ..RunnerConfig::default()
        };
        assert_eq!(config.step_range(), (2.0, 5.0));

        let config = RunnerConfig {
            min_step: 1.0,
            max_step: f64::NAN,
            ..RunnerConfig::default()
        };
        assert_eq!(config.step_range(), (1.0, 5.0));
    }

    #[test]
    fn inverted_or_negative_steps_are_ordered() {
        let config = RunnerConfig {
            min_step: 4.0,
            max_step: -3.0,
            ..RunnerConfig::default()
        };
        assert_eq!(config.step_range(), (4.0, 4.0));
    }
}
