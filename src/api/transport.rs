//! HTTP transport for the remote API.
//!
//! # Responsibilities
//! - Build versioned request URLs from the configured endpoint
//! - Attach auth token and a per-request correlation ID
//! - Map HTTP outcomes onto `ApiError` (404 → NotFound, non-2xx → Status)
//!
//! # Design Decisions
//! - One `reqwest::Client` per transport; clones share the connection pool
//! - No retries at this layer; retry policy belongs to the caller
//! - Bodies are exchanged as `serde_json::Value`; typing happens in client.rs

use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ApiConfig;

const API_VERSION: &str = "v1.0/";

/// Shared HTTP transport, safe for concurrent use.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpTransport {
    /// Create a transport from configuration.
    ///
    /// The token is read once from the configured environment variable.
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let token = std::env::var(&config.token_env).ok();
        if token.is_none() {
            tracing::warn!(
                token_env = %config.token_env,
                "Auth token variable not set; requests will be unauthenticated"
            );
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Self::with_client(client, &config.endpoint, token)
    }

    /// Create a transport around an existing client.
    pub fn with_client(client: reqwest::Client, endpoint: &str, token: Option<String>) -> ApiResult<Self> {
        let mut base = endpoint.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)
            .and_then(|url| url.join(API_VERSION))
            .map_err(|e| ApiError::Endpoint(format!("'{}': {}", endpoint, e)))?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Base URL all request paths are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve path segments against the base URL.
    ///
    /// Each segment is percent-encoded on its own, so IDs containing `/`, `?`
    /// or `#` stay inside their segment. Empty and dot segments are rejected.
    fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        if let Some(segment) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(ApiError::Endpoint(format!("invalid path segment '{}'", segment)));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Endpoint(format!("'{}' cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send one request and decode the JSON response body, if any.
    ///
    /// `segments` are appended to the versioned base URL; errors report them
    /// joined with `/`.
    pub async fn request(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> ApiResult<Option<Value>> {
        let url = self.url(segments)?;
        let path = segments.join("/");
        let request_id = Uuid::new_v4();

        let mut request = self
            .client
            .request(method.clone(), url)
            .header("X-Request-Id", request_id.to_string());
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = &self.token {
            request = request.header("X-Auth-Token", token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(method = %method, path = %path, request_id = %request_id, "API request");

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            tracing::debug!(path = %path, request_id = %request_id, "API resource not found");
            return Err(ApiError::NotFound(path.to_string()));
        }

        let text = response.text().await?;
        if !status.is_success() {
            tracing::warn!(
                method = %method,
                path = %path,
                request_id = %request_id,
                status = status.as_u16(),
                "API request failed"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                path: path.to_string(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| ApiError::Decode {
                path: path.to_string(),
                source,
            })
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_versioned() {
        let transport =
            HttpTransport::with_client(reqwest::Client::new(), "https://mlb.example.com/", None).unwrap();
        assert_eq!(transport.base_url().as_str(), "https://mlb.example.com/v1.0/");
        assert_eq!(
            transport.url(&["health_monitors", "hm-1"]).unwrap().as_str(),
            "https://mlb.example.com/v1.0/health_monitors/hm-1"
        );
        assert_eq!(
            transport.url(&["health_monitors", "hm-1", "staged"]).unwrap().as_str(),
            "https://mlb.example.com/v1.0/health_monitors/hm-1/staged"
        );
    }

    #[test]
    fn test_ids_stay_in_their_segment() {
        let transport =
            HttpTransport::with_client(reqwest::Client::new(), "https://mlb.example.com", None).unwrap();
        assert_eq!(
            transport
                .url(&["health_monitors", "../load_balancers/lb-1"])
                .unwrap()
                .as_str(),
            "https://mlb.example.com/v1.0/health_monitors/..%2Fload_balancers%2Flb-1"
        );
        assert_eq!(
            transport.url(&["listeners", "l-1?x=1#frag"]).unwrap().path(),
            "/v1.0/listeners/l-1%3Fx=1%23frag"
        );

        for id in ["", ".", ".."] {
            let err = transport.url(&["health_monitors", id]).unwrap_err();
            assert!(matches!(err, ApiError::Endpoint(_)), "{:?} accepted", id);
        }
    }

    #[test]
    fn test_endpoint_with_path_prefix() {
        let transport =
            HttpTransport::with_client(reqwest::Client::new(), "https://api.example.com/mlb", None).unwrap();
        assert_eq!(transport.base_url().as_str(), "https://api.example.com/mlb/v1.0/");
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = HttpTransport::with_client(reqwest::Client::new(), "not a url", None).unwrap_err();
        assert!(matches!(err, ApiError::Endpoint(_)));
    }

    #[test]
    fn test_debug_hides_token() {
        let transport = HttpTransport::with_client(
            reqwest::Client::new(),
            "https://mlb.example.com",
            Some("secret".into()),
        )
        .unwrap();
        let debug = format!("{:?}", transport);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("authenticated: true"));
    }
}
