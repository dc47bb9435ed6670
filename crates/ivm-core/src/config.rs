//! Application configuration
//!
//! One TOML document with a table per concern. Every field is optional;
//! missing values fall back to the product defaults.
//!
//! ```toml
//! auth_prompt_delay_ms = 2000
//!
//! [splash]
//! min_duration_ms = 2500
//!
//! [runner]
//! min_duration_ms = 5000
//! seed = 7
//!
//! [history]
//! capacity = 20
//! path = "history.json"
//! ```

use crate::error::{AppError, Result};
use ivm_barrier::BarrierConfig;
use ivm_generation::{RunnerConfig, SetupRules};
use ivm_history::HistoryConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default delay before the auth prompt opens for guests
pub const DEFAULT_AUTH_PROMPT_DELAY_MS: u64 = 2_000;

/// Whole-application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Splash barrier timing
    pub splash: BarrierConfig,
    /// Generation runner timing and progress shape
    pub runner: RunnerConfig,
    /// Setup form rules
    pub setup: SetupRules,
    /// History persistence
    pub history: HistoryConfig,
    /// Delay before the landing page opens the auth prompt
    pub auth_prompt_delay_ms: u64,
}

impl AppConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document
    ///
    /// # Errors
    /// - `AppError::Config` on malformed TOML or mistyped fields
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| AppError::config(e.to_string()))
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// - `AppError::Config` if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&input)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// With splash timing
    #[inline]
    #[must_use]
    pub fn with_splash(mut self, splash: BarrierConfig) -> Self {
        self.splash = splash;
        self
    }

    /// With runner timing
    #[inline]
    #[must_use]
    pub fn with_runner(mut self, runner: RunnerConfig) -> Self {
        self.runner = runner;
        self
    }

    /// With auth prompt delay
    #[inline]
    #[must_use]
    pub fn with_auth_prompt_delay(mut self, delay: Duration) -> Self {
        self.auth_prompt_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Auth prompt delay
    #[inline]
    #[must_use]
    pub fn auth_prompt_delay(&self) -> Duration {
        Duration::from_millis(self.auth_prompt_delay_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            splash: BarrierConfig::default(),
            runner: RunnerConfig::default(),
            setup: SetupRules::default(),
            history: HistoryConfig::default(),
            auth_prompt_delay_ms: DEFAULT_AUTH_PROMPT_DELAY_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.auth_prompt_delay(), Duration::from_millis(2_000));
        assert_eq!(config.splash.min_duration_ms, 2_500);
        assert_eq!(config.runner.min_duration_ms, 5_000);
        assert_eq!(config.setup.min_description_words, 50);
        assert_eq!(config.history.capacity, 20);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            auth_prompt_delay_ms = 500

            [splash]
            exit_duration_ms = 0

            [runner]
            seed = 7

            [history]
            path = "/tmp/history.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.auth_prompt_delay_ms, 500);
        assert_eq!(config.splash.exit_duration_ms, 0);
        assert_eq!(config.splash.min_duration_ms, 2_500);
        assert_eq!(config.runner.seed, Some(7));
        assert_eq!(config.runner.ceiling, 92.0);
        assert!(config.history.path.is_some());
    }

    #[test]
    fn mistyped_field_is_config_error() {
        let err = AppConfig::from_toml_str("auth_prompt_delay_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn non_finite_runner_values_are_sanitized() {
        let config = AppConfig::from_toml_str("[runner]\nceiling = nan\nmax_step = inf\n").unwrap();
        assert!(config.runner.ceiling.is_nan());
        assert!((config.runner.effective_ceiling() - 92.0).abs() < f64::EPSILON);
        assert_eq!(config.runner.step_range(), (2.0, 5.0));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ivm.toml");
        std::fs::write(&path, "[runner]\nmin_duration_ms = 100\n").unwrap();
        assert_eq!(AppConfig::load(&path).unwrap().runner.min_duration_ms, 100);
        assert!(AppConfig::load(dir.path().join("missing.toml")).is_err());
    }
}
