//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::timeout::TimeoutOptions;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Timeout shape.
    pub timeout: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Base (and reset) timeout in milliseconds.
    pub base_ms: u64,

    /// Exponential backoff factor, greater than 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backoff: Option<f64>,

    /// Ceiling for backoff growth in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backoff_max_ms: Option<u64>,

    /// Jitter fraction, strictly between 0 and 1 (e.g., 0.1 for +/-10%).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random: Option<f64>,
}

impl TimeoutConfig {
    /// The optional parts as constructor options.
    pub fn options(&self) -> TimeoutOptions {
        TimeoutOptions {
            backoff: self.backoff,
            backoff_max: self.backoff_max_ms,
            random: self.random,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            base_ms: 1000,
            backoff: None,
            backoff_max_ms: None,
            random: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
