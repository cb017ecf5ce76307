//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MlbConfig {
    /// Remote API endpoint and credentials.
    pub api: ApiConfig,

    /// Per-operation time budgets.
    pub timeouts: TimeoutConfig,

    /// Polling cadence for asynchronous operations.
    pub polling: PollingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Remote API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the load balancer service (without the version segment).
    pub endpoint: String,

    /// Environment variable holding the auth token.
    pub token_env: String,

    /// Timeout for a single HTTP request in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9292".to_string(),
            token_env: "MLB_AUTH_TOKEN".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Time budgets for each operation kind, in seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub create_secs: u64,
    pub update_secs: u64,
    pub delete_secs: u64,
    /// Fleet-wide actions (apply, system update, cancel).
    pub action_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            create_secs: 1800,
            update_secs: 1800,
            delete_secs: 1800,
            action_secs: 3600,
        }
    }
}

impl TimeoutConfig {
    pub fn create(&self) -> Duration {
        Duration::from_secs(self.create_secs)
    }

    pub fn update(&self) -> Duration {
        Duration::from_secs(self.update_secs)
    }

    pub fn delete(&self) -> Duration {
        Duration::from_secs(self.delete_secs)
    }

    pub fn action(&self) -> Duration {
        Duration::from_secs(self.action_secs)
    }
}

/// Polling cadence.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Wait before the first status check, in seconds.
    pub delay_secs: u64,

    /// Wait between status checks, in seconds.
    pub interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            delay_secs: 5,
            interval_secs: 10,
        }
    }
}

impl PollingConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
