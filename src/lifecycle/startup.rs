//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and, when enabled, the metrics endpoint
//! - Build the shared transport and client context
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - One `ControlPlane` per process; everything else borrows it

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::api::client::RemoteResourceClient;
use crate::api::control_plane::ControlPlane;
use crate::api::error::ApiError;
use crate::api::transport::HttpTransport;
use crate::config::{load_config, ConfigError, MlbConfig};
use crate::lifecycle::shutdown::Shutdown;
use crate::observability::{logging, metrics};
use crate::reconcile::{ApplyOrchestrator, ReconcileSettings, ResourceLocks, ResourceManager};
use crate::resources::kind::ResourceKind;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to initialize logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("failed to start metrics endpoint: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Everything a command needs, built once at startup.
#[derive(Debug, Clone)]
pub struct Runtime {
    pub config: MlbConfig,
    pub plane: ControlPlane,
    pub settings: ReconcileSettings,
    pub locks: ResourceLocks,
    pub shutdown: Shutdown,
}

impl Runtime {
    /// Build a runtime around an existing control plane.
    pub fn new(config: MlbConfig, plane: ControlPlane) -> Self {
        let shutdown = Shutdown::new();
        let settings = ReconcileSettings::from_config(&config).with_shutdown(shutdown.clone());
        Self {
            config,
            plane,
            settings,
            locks: ResourceLocks::new(),
            shutdown,
        }
    }

    pub fn manager<K: ResourceKind>(&self, client: Arc<dyn RemoteResourceClient<K>>) -> ResourceManager<K> {
        ResourceManager::new(client, self.locks.clone(), self.settings.clone())
    }

    pub fn orchestrator(&self) -> ApplyOrchestrator {
        ApplyOrchestrator::new(self.plane.clone(), self.settings.clone())
    }
}

/// Load configuration (defaults when `path` is `None`) and start every subsystem.
pub fn start(path: Option<&Path>) -> Result<Runtime, StartupError> {
    let config = match path {
        Some(path) => load_config(path)?,
        None => MlbConfig::default(),
    };

    logging::init_logging(&config.observability)?;
    tracing::info!(
        endpoint = %config.api.endpoint,
        action_timeout_secs = config.timeouts.action_secs,
        poll_interval_secs = config.polling.interval_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let transport = HttpTransport::new(&config.api)?;
    let plane = ControlPlane::over_http(transport);
    Ok(Runtime::new(config, plane))
}
