//! Wire-level error definitions.

use thiserror::Error;

/// Errors returned by remote API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The remote side answered 404.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success HTTP status.
    #[error("HTTP {status} from {path}: {body}")]
    Status {
        status: u16,
        path: String,
        body: String,
    },

    /// Connection, TLS or protocol failure below HTTP status handling.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be decoded.
    #[error("invalid response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Endpoint configuration cannot be turned into request URLs.
    #[error("invalid endpoint: {0}")]
    Endpoint(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    /// A decode error for a body missing the expected envelope.
    pub fn missing_envelope(path: &str, key: &str) -> Self {
        ApiError::Decode {
            path: path.to_string(),
            source: serde::de::Error::custom(format!("missing `{}` object", key)),
        }
    }

    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Status { .. } => "status",
            ApiError::Transport(_) => "transport",
            ApiError::Decode { .. } => "decode",
            ApiError::Endpoint(_) => "endpoint",
        }
    }
}

/// Result type for remote API calls.
pub type ApiResult<T> = Result<T, ApiError>;
