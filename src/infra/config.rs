//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. CONFIG_FILE environment variable
//! 3. Default: config/dev.toml
//!
//! Every section is optional. Values are validated once, before any engine
//! is built from them, and are read-only afterwards.

use crate::domain::error::TourGuideError;
use crate::domain::types::{Attraction, Coordinate};
use crate::infra::retry::RetryPolicy;
use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Reward eligibility distance in statute miles
pub const DEFAULT_PROXIMITY_BUFFER_MILES: f64 = 10.0;
/// "Nearby" reporting distance in statute miles
pub const DEFAULT_VISIBILITY_RANGE_MILES: f64 = 200.0;
pub const DEFAULT_CONFIG_PATH: &str = "config/dev.toml";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_MIN_WORKERS: usize = 50;
pub const DEFAULT_WORKERS_PER_CORE: usize = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct RewardsSection {
    #[serde(default = "default_proximity_buffer")]
    pub proximity_buffer_miles: f64,
    #[serde(default = "default_visibility_range")]
    pub visibility_range_miles: f64,
}

impl Default for RewardsSection {
    fn default() -> Self {
        Self {
            proximity_buffer_miles: default_proximity_buffer(),
            visibility_range_miles: default_visibility_range(),
        }
    }
}

fn default_proximity_buffer() -> f64 {
    DEFAULT_PROXIMITY_BUFFER_MILES
}

fn default_visibility_range() -> f64 {
    DEFAULT_VISIBILITY_RANGE_MILES
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerSection {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for TrackerSection {
    fn default() -> Self {
        Self { poll_interval_secs: default_poll_interval_secs() }
    }
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolSection {
    /// Floor for the worker pool size (keeps CI hosts with few cores useful)
    #[serde(default = "default_min_workers")]
    pub min_workers: usize,
    #[serde(default = "default_workers_per_core")]
    pub workers_per_core: usize,
}

impl Default for PoolSection {
    fn default() -> Self {
        Self { min_workers: default_min_workers(), workers_per_core: default_workers_per_core() }
    }
}

fn default_min_workers() -> usize {
    DEFAULT_MIN_WORKERS
}

fn default_workers_per_core() -> usize {
    DEFAULT_WORKERS_PER_CORE
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrySection {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self { max_attempts: default_max_attempts(), initial_backoff_ms: default_initial_backoff_ms() }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    100
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedSection {
    /// Number of internal travelers created at startup (0 disables seeding)
    #[serde(default = "default_internal_user_count")]
    pub internal_user_count: usize,
    #[serde(default = "default_visits_per_user")]
    pub visits_per_user: usize,
}

impl Default for SeedSection {
    fn default() -> Self {
        Self {
            internal_user_count: default_internal_user_count(),
            visits_per_user: default_visits_per_user(),
        }
    }
}

fn default_internal_user_count() -> usize {
    100
}

fn default_visits_per_user() -> usize {
    3
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSection {
    #[serde(default = "default_metrics_interval_secs")]
    pub interval_secs: u64,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self { interval_secs: default_metrics_interval_secs() }
    }
}

fn default_metrics_interval_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttractionEntry {
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub rewards: RewardsSection,
    #[serde(default)]
    pub tracker: TrackerSection,
    #[serde(default)]
    pub pool: PoolSection,
    #[serde(default)]
    pub retry: RetrySection,
    #[serde(default)]
    pub seed: SeedSection,
    #[serde(default)]
    pub metrics: MetricsSection,
    #[serde(default)]
    pub attractions: Vec<AttractionEntry>,
}

/// Distance thresholds handed to the rewards engine at construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardsConfig {
    pub proximity_buffer_miles: f64,
    pub visibility_range_miles: f64,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            proximity_buffer_miles: DEFAULT_PROXIMITY_BUFFER_MILES,
            visibility_range_miles: DEFAULT_VISIBILITY_RANGE_MILES,
        }
    }
}

impl RewardsConfig {
    pub fn with_proximity_buffer(mut self, miles: f64) -> Self {
        self.proximity_buffer_miles = miles;
        self
    }

    pub fn validate(&self) -> Result<(), TourGuideError> {
        if !(self.proximity_buffer_miles.is_finite() && self.proximity_buffer_miles > 0.0) {
            return Err(TourGuideError::Configuration(format!(
                "proximity buffer must be positive, got {}",
                self.proximity_buffer_miles
            )));
        }
        if !(self.visibility_range_miles.is_finite() && self.visibility_range_miles > 0.0) {
            return Err(TourGuideError::Configuration(format!(
                "visibility range must be positive, got {}",
                self.visibility_range_miles
            )));
        }
        Ok(())
    }
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    proximity_buffer_miles: f64,
    visibility_range_miles: f64,
    poll_interval_secs: u64,
    min_workers: usize,
    workers_per_core: usize,
    retry_max_attempts: u32,
    retry_initial_backoff_ms: u64,
    internal_user_count: usize,
    visits_per_user: usize,
    metrics_interval_secs: u64,
    attractions: Vec<AttractionEntry>,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), "default")
    }
}

impl Config {
    fn from_toml(toml_config: TomlConfig, config_file: &str) -> Self {
        Self {
            proximity_buffer_miles: toml_config.rewards.proximity_buffer_miles,
            visibility_range_miles: toml_config.rewards.visibility_range_miles,
            poll_interval_secs: toml_config.tracker.poll_interval_secs,
            min_workers: toml_config.pool.min_workers,
            workers_per_core: toml_config.pool.workers_per_core,
            retry_max_attempts: toml_config.retry.max_attempts,
            retry_initial_backoff_ms: toml_config.retry.initial_backoff_ms,
            internal_user_count: toml_config.seed.internal_user_count,
            visits_per_user: toml_config.seed.visits_per_user,
            metrics_interval_secs: toml_config.metrics.interval_secs,
            attractions: toml_config.attractions,
            config_file: config_file.to_string(),
        }
    }

    /// Config path precedence: explicit path, then `CONFIG_FILE`, then the default
    pub fn config_path(explicit: Option<&str>, env_value: Option<String>) -> String {
        match (explicit, env_value) {
            (Some(path), _) => path.to_string(),
            (None, Some(path)) if !path.trim().is_empty() => path,
            _ => DEFAULT_CONFIG_PATH.to_string(),
        }
    }

    /// Resolve the config path against the process environment
    pub fn resolve_config_path(explicit: Option<&str>) -> String {
        Self::config_path(explicit, env::var("CONFIG_FILE").ok())
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str, config_file: &str) -> anyhow::Result<Self> {
        let toml_config: TomlConfig = toml::from_str(content)
            .with_context(|| format!("Failed to parse config file {}", config_file))?;
        Ok(Self::from_toml(toml_config, config_file))
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// Load configuration from a path, falling back to defaults
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), path = %path, "config_fallback_to_defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from the resolved path, falling back to defaults
    pub fn load(explicit: Option<&str>) -> Self {
        Self::load_from_path(&Self::resolve_config_path(explicit))
    }

    /// Check every value the engines depend on
    pub fn validate(&self) -> Result<(), TourGuideError> {
        self.rewards().validate()?;
        if self.poll_interval_secs == 0 {
            return Err(TourGuideError::Configuration("poll interval must be positive".into()));
        }
        if self.min_workers == 0 && self.workers_per_core == 0 {
            return Err(TourGuideError::Configuration("worker pool would be empty".into()));
        }
        if self.retry_max_attempts == 0 {
            return Err(TourGuideError::Configuration("retry max_attempts must be at least 1".into()));
        }
        for entry in &self.attractions {
            if entry.name.trim().is_empty() {
                return Err(TourGuideError::Configuration("attraction with empty name".into()));
            }
            Coordinate::new(entry.latitude, entry.longitude).validate()?;
        }
        Ok(())
    }

    pub fn rewards(&self) -> RewardsConfig {
        RewardsConfig {
            proximity_buffer_miles: self.proximity_buffer_miles,
            visibility_range_miles: self.visibility_range_miles,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_max_attempts,
            Duration::from_millis(self.retry_initial_backoff_ms),
        )
    }

    /// Attractions declared in the config file, if any
    pub fn attractions(&self) -> Vec<Attraction> {
        self.attractions
            .iter()
            .map(|e| Attraction::new(&e.name, &e.city, &e.state, e.latitude, e.longitude))
            .collect()
    }

    // Getters for all config fields
    pub fn proximity_buffer_miles(&self) -> f64 {
        self.proximity_buffer_miles
    }

    pub fn visibility_range_miles(&self) -> f64 {
        self.visibility_range_miles
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn min_workers(&self) -> usize {
        self.min_workers
    }

    pub fn workers_per_core(&self) -> usize {
        self.workers_per_core
    }

    pub fn internal_user_count(&self) -> usize {
        self.internal_user_count
    }

    pub fn visits_per_user(&self) -> usize {
        self.visits_per_user
    }

    pub fn metrics_interval_secs(&self) -> u64 {
        self.metrics_interval_secs
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Builder method for tests to set the proximity buffer
    #[cfg(test)]
    pub fn with_proximity_buffer(mut self, miles: f64) -> Self {
        self.proximity_buffer_miles = miles;
        self
    }

    /// Builder method for tests to set the poll interval
    #[cfg(test)]
    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.proximity_buffer_miles(), 10.0);
        assert_eq!(config.visibility_range_miles(), 200.0);
        assert_eq!(config.poll_interval(), Duration::from_secs(300));
        assert_eq!(config.min_workers(), 50);
        assert_eq!(config.workers_per_core(), 10);
        assert_eq!(config.internal_user_count(), 100);
        assert!(config.attractions().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml_str("[rewards]\nproximity_buffer_miles = 25.5\n", "inline")
            .unwrap();
        assert_eq!(config.proximity_buffer_miles(), 25.5);
        assert_eq!(config.visibility_range_miles(), 200.0);
        assert_eq!(config.poll_interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_validate_rejects_non_positive_buffer() {
        for bad in [0.0, -1.0, f64::NAN] {
            let config = Config::default().with_proximity_buffer(bad);
            assert!(matches!(config.validate(), Err(TourGuideError::Configuration(_))));
        }
    }

    #[test]
    fn test_validate_rejects_zero_poll_interval() {
        let config = Config::default().with_poll_interval_secs(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_malformed_attraction() {
        let content = r#"
[[attractions]]
name = "Nowhere"
latitude = 123.0
longitude = 0.0
"#;
        let config = Config::from_toml_str(content, "inline").unwrap();
        assert!(matches!(config.validate(), Err(TourGuideError::Configuration(_))));
    }

    #[test]
    fn test_config_path_explicit_wins() {
        let path = Config::config_path(Some("config/prod.toml"), Some("/etc/tourguide.toml".into()));
        assert_eq!(path, "config/prod.toml");
    }

    #[test]
    fn test_config_path_from_env() {
        let path = Config::config_path(None, Some("/etc/tourguide.toml".into()));
        assert_eq!(path, "/etc/tourguide.toml");
    }

    #[test]
    fn test_config_path_default() {
        assert_eq!(Config::config_path(None, None), DEFAULT_CONFIG_PATH);
        assert_eq!(Config::config_path(None, Some("  ".into())), DEFAULT_CONFIG_PATH);
    }
}
