//! Infrastructure - ambient concerns
//!
//! This module contains code outside the stream and pool logic:
//! - Logging
//! - Pool metrics
//! - Configuration management

pub mod config;
pub mod logging;
pub mod metrics;

pub use config::{Config, ConfigError, ShareConfig, StreamConfig};
pub use metrics::{MetricsSnapshot, PoolMetrics};
