//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated configuration into a ready dispatcher
//! - Start optional background exporters
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Strategy names are resolved here, never per request

use std::sync::Arc;

use thiserror::Error;

use crate::config::{BalancerConfig, ConfigError};
use crate::load_balancer::backend::BackendSet;
use crate::load_balancer::{BackendSetError, DispatchError, FlowDispatcher, Strategy};
use crate::observability::metrics;
use crate::pipeline::PipelineProvisioner;

/// Fatal errors raised before the balancer starts serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid backend list: {0}")]
    Backends(#[from] BackendSetError),

    #[error(transparent)]
    Strategy(#[from] DispatchError),

    #[error("invalid metrics address: {0}")]
    MetricsAddress(#[from] std::net::AddrParseError),

    #[error("metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("listener error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the dispatcher described by `config`.
pub fn build_dispatcher(
    config: &BalancerConfig,
    provisioner: Arc<dyn PipelineProvisioner>,
) -> Result<FlowDispatcher, StartupError> {
    let backends = BackendSet::new(&config.servers)?;
    let strategy: Strategy = config.dispatch.strategy.parse()?;

    tracing::info!(
        servers = backends.len(),
        strategy = %strategy,
        backend_port = config.backend_port(),
        flow_rules = config.dispatch.install_flow_rules,
        "Dispatcher configured"
    );

    Ok(FlowDispatcher::new(
        backends,
        strategy,
        config.backend_port(),
        &config.pipeline,
        provisioner,
    )
    .with_flow_rules(config.dispatch.install_flow_rules))
}

/// Start the Prometheus exporter when enabled.
pub fn start_exporters(config: &BalancerConfig) -> Result<(), StartupError> {
    if !config.observability.metrics_enabled {
        return Ok(());
    }
    let addr: std::net::SocketAddr = config.observability.metrics_address.parse()?;
    metrics::init_metrics(addr)?;
    Ok(())
}
