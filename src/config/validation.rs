//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, delay shorter than every budget)
//! - Validate addresses (endpoint URL, metrics bind address)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MlbConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;
use url::Url;

use crate::config::schema::MlbConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &MlbConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.api.endpoint) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "api.endpoint",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("api.endpoint", e.to_string())),
    }

    if config.api.token_env.trim().is_empty() {
        errors.push(ValidationError::new("api.token_env", "must name an environment variable"));
    }

    if config.api.request_timeout_secs == 0 {
        errors.push(ValidationError::new("api.request_timeout_secs", "must be greater than 0"));
    }

    let budgets = [
        ("timeouts.create_secs", config.timeouts.create_secs),
        ("timeouts.update_secs", config.timeouts.update_secs),
        ("timeouts.delete_secs", config.timeouts.delete_secs),
        ("timeouts.action_secs", config.timeouts.action_secs),
    ];
    for (field, secs) in budgets {
        if secs == 0 {
            errors.push(ValidationError::new(field, "must be greater than 0"));
        } else if config.polling.delay_secs >= secs {
            errors.push(ValidationError::new(
                field,
                format!("must exceed polling.delay_secs ({})", config.polling.delay_secs),
            ));
        }
    }

    if config.polling.interval_secs == 0 {
        errors.push(ValidationError::new("polling.interval_secs", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
