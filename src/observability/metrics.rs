//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mlb_api_requests_total` (counter): remote calls by kind, operation, outcome
//! - `mlb_poll_total` (counter): finished polls by outcome
//! - `mlb_poll_duration_seconds` (histogram): time spent waiting per poll
//! - `mlb_fleet_actions_total` (counter): fleet actions issued by action name
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so library users pay nothing
//! - Prometheus exporter is optional and started by the binary

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::api::error::ApiResult;
use crate::resources::kind::Kind;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Count one remote call.
pub fn record_api_call<T>(kind: Kind, op: &'static str, result: &ApiResult<T>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => e.label(),
    };
    metrics::counter!(
        "mlb_api_requests_total",
        "kind" => kind.singular(),
        "op" => op,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a finished poll.
pub fn record_poll(outcome: &'static str, elapsed: Duration) {
    metrics::counter!("mlb_poll_total", "outcome" => outcome).increment(1);
    metrics::histogram!("mlb_poll_duration_seconds", "outcome" => outcome).record(elapsed.as_secs_f64());
}

/// Count one issued fleet action.
pub fn record_fleet_action(action: &'static str) {
    metrics::counter!("mlb_fleet_actions_total", "action" => action).increment(1);
}
