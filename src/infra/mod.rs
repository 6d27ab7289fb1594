//! Infrastructure - configuration, metrics and retry
//!
//! This module contains infrastructure concerns:
//! - `config` - Application configuration (TOML loading, defaults, validation)
//! - `metrics` - Lock-free metrics collection
//! - `retry` - Bounded retry with backoff for provider calls

pub mod config;
pub mod metrics;
pub mod retry;

// Re-export commonly used types
pub use config::{Config, RewardsConfig};
pub use metrics::{Metrics, MetricsSummary};
pub use retry::RetryPolicy;
