//! Flow dispatcher.
//!
//! # Responsibilities
//! - Assign each flow to a backend (or a hardware pipeline)
//! - Keep connection counts and latency statistics in step with decisions
//! - Serve release and monitor requests
//!
//! All shared state lives in one `FlowDispatcher`, shared by `Arc` across
//! request handlers.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::load_balancer::{
    backend::{Backend, BackendSet},
    error::DispatchError,
    stats::MetricsCollector,
    strategy::{DispatchStrategy, Strategy},
    tracker::{ConnectionTracker, ReleaseOutcome},
};
use crate::observability::metrics;
use crate::pipeline::{FlowRule, PipelineKind, PipelineProvisioner, PipelineSpec, ProvisionerError};
use crate::resilience::with_deadline;

/// Inclusive range for generated flow identifiers.
pub const GENERATED_FLOW_ID_RANGE: std::ops::RangeInclusive<u64> = 1..=100_000;

/// Caller-supplied or generated flow identifier.
///
/// Any JSON value a caller sends is accepted and echoed back unchanged.
/// Generated identifiers are not unique; they only label log lines and
/// responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlowId {
    Number(u64),
    Text(String),
    Other(serde_json::Value),
}

impl FlowId {
    pub fn generate() -> Self {
        FlowId::Number(rand::thread_rng().gen_range(GENERATED_FLOW_ID_RANGE))
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowId::Number(n) => write!(f, "{}", n),
            FlowId::Text(s) => f.write_str(s),
            FlowId::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<u64> for FlowId {
    fn from(n: u64) -> Self {
        FlowId::Number(n)
    }
}

impl From<&str> for FlowId {
    fn from(s: &str) -> Self {
        FlowId::Text(s.to_string())
    }
}

/// A flow assigned to a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendAssignment {
    pub server: Backend,
    pub port: u16,
    pub flow_id: FlowId,
    /// Time from dispatch entry until the decision was final.
    pub latency: Duration,
    /// Steering rule installed for this flow, when rule installation is on.
    pub rule_id: Option<u64>,
}

/// A flow handled by a freshly provisioned hardware pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineAssignment {
    pub kind: PipelineKind,
    pub pipeline_id: u64,
    pub flow_id: FlowId,
}

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Backend(BackendAssignment),
    Pipeline(PipelineAssignment),
}

impl DispatchOutcome {
    pub fn backend(&self) -> Option<&Backend> {
        match self {
            DispatchOutcome::Backend(a) => Some(&a.server),
            DispatchOutcome::Pipeline(_) => None,
        }
    }

    pub fn flow_id(&self) -> &FlowId {
        match self {
            DispatchOutcome::Backend(a) => &a.flow_id,
            DispatchOutcome::Pipeline(p) => &p.flow_id,
        }
    }
}

/// Monitor view of one backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BackendReport {
    pub active_connections: u64,
    pub total_requests: u64,
    pub average_latency: f64,
    pub max_latency: f64,
    pub min_latency: f64,
}

/// Owns the backend set, the strategy and all load bookkeeping.
#[derive(Debug)]
pub struct FlowDispatcher {
    backends: BackendSet,
    port: u16,
    strategy: Strategy,
    selector: DispatchStrategy,
    connections: ConnectionTracker,
    stats: MetricsCollector,
    provisioner: Arc<dyn PipelineProvisioner>,
    install_flow_rules: bool,
}

impl FlowDispatcher {
    /// Create a dispatcher. `port` is reported as the assigned port for
    /// every backend assignment.
    pub fn new(
        backends: BackendSet,
        strategy: Strategy,
        port: u16,
        pipeline: &PipelineConfig,
        provisioner: Arc<dyn PipelineProvisioner>,
    ) -> Self {
        Self {
            backends,
            port,
            strategy,
            selector: DispatchStrategy::new(strategy, pipeline),
            connections: ConnectionTracker::new(),
            stats: MetricsCollector::new(),
            provisioner,
            install_flow_rules: false,
        }
    }

    /// Install a steering rule on the device for every backend assignment.
    pub fn with_flow_rules(mut self, enabled: bool) -> Self {
        self.install_flow_rules = enabled;
        self
    }

    pub fn backends(&self) -> &BackendSet {
        &self.backends
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn connections(&self) -> &ConnectionTracker {
        &self.connections
    }

    /// Dispatch a flow with no deadline on collaborator calls.
    pub async fn dispatch(&self, flow_id: Option<FlowId>) -> Result<DispatchOutcome, DispatchError> {
        self.dispatch_within(flow_id, None).await
    }

    /// Dispatch a flow. Calls into the provisioning device are abandoned
    /// once `deadline` has passed.
    pub async fn dispatch_within(
        &self,
        flow_id: Option<FlowId>,
        deadline: Option<Duration>,
    ) -> Result<DispatchOutcome, DispatchError> {
        let started = Instant::now();
        let flow_id = flow_id.unwrap_or_else(FlowId::generate);
        tracing::debug!(flow_id = %flow_id, strategy = %self.strategy, "Processing flow");

        let balancer = match &self.selector {
            DispatchStrategy::Select(balancer) => balancer,
            DispatchStrategy::Pipeline(spec) => {
                return self.dispatch_to_pipeline(spec, flow_id, deadline).await;
            }
        };

        let server = balancer
            .next_server(&self.backends, &self.connections)
            .ok_or(DispatchError::NoBackendAvailable)?;

        let rule_id = if self.install_flow_rules {
            let rule = FlowRule {
                server_ip: server.addr().to_string(),
                port: self.port,
            };
            match self
                .provision("flow rule", deadline, self.provisioner.add_rule(&rule))
                .await
            {
                Ok(id) => {
                    tracing::info!(flow_id = %flow_id, rule_id = id, server = %server, "Flow rule added");
                    Some(id)
                }
                Err(e) => {
                    if balancer.reserves_connection() {
                        self.connections.decrement(&server);
                    }
                    return Err(e);
                }
            }
        } else {
            None
        };

        let latency = started.elapsed();
        self.stats.record(&server, latency.as_secs_f64());
        metrics::record_dispatch(self.strategy.as_str(), &server, latency);
        if balancer.reserves_connection() {
            metrics::set_active_connections(&server, self.connections.snapshot(&server));
        }

        tracing::info!(
            flow_id = %flow_id,
            server = %server,
            strategy = %self.strategy,
            latency_us = latency.as_micros() as u64,
            "Flow directed to server"
        );

        Ok(DispatchOutcome::Backend(BackendAssignment {
            server,
            port: self.port,
            flow_id,
            latency,
            rule_id,
        }))
    }

    async fn dispatch_to_pipeline(
        &self,
        spec: &PipelineSpec,
        flow_id: FlowId,
        deadline: Option<Duration>,
    ) -> Result<DispatchOutcome, DispatchError> {
        let resource = format!("{} pipeline", spec.kind);
        let pipeline_id = self
            .provision(&resource, deadline, self.provisioner.create_pipeline(spec))
            .await?;

        metrics::record_pipeline(spec.kind.as_str());
        tracing::info!(flow_id = %flow_id, pipeline_id, kind = %spec.kind, "Pipeline created");

        Ok(DispatchOutcome::Pipeline(PipelineAssignment {
            kind: spec.kind,
            pipeline_id,
            flow_id,
        }))
    }

    /// Await a device call and accept only a positive handle.
    async fn provision<F>(
        &self,
        resource: &str,
        deadline: Option<Duration>,
        call: F,
    ) -> Result<u64, DispatchError>
    where
        F: Future<Output = Result<Option<u64>, ProvisionerError>>,
    {
        let reason = match with_deadline(deadline, call).await {
            Ok(Ok(Some(id))) if id > 0 => return Ok(id),
            Ok(Ok(_)) => "device returned no usable handle".to_string(),
            Ok(Err(e)) => e.to_string(),
            Err(elapsed) => elapsed.to_string(),
        };

        metrics::record_provisioning_failure(resource);
        tracing::error!(resource = %resource, reason = %reason, "Provisioning failed");
        Err(DispatchError::ProvisioningFailed {
            resource: resource.to_string(),
            reason,
        })
    }

    /// Give back one connection on `addr`.
    ///
    /// Only addresses outside the configured set are an error; releasing an
    /// idle or never-used backend changes nothing.
    pub fn release(&self, addr: &str) -> Result<ReleaseOutcome, DispatchError> {
        let Some(backend) = self.backends.get(addr) else {
            tracing::warn!(server = %addr, "Server not found in configured list");
            metrics::record_release("unknown_backend");
            return Err(DispatchError::UnknownBackend(addr.to_string()));
        };

        let outcome = self.connections.decrement(backend);
        match outcome {
            ReleaseOutcome::Released { remaining } => {
                tracing::info!(server = %backend, active_connections = remaining, "Connection released");
                metrics::set_active_connections(backend, remaining);
            }
            ReleaseOutcome::AlreadyIdle => {
                tracing::warn!(server = %backend, "Release request but no active connection found");
            }
            ReleaseOutcome::Untracked => {
                tracing::warn!(server = %backend, "Release request for server with no initialized counter");
            }
        }
        metrics::record_release(outcome.as_str());

        Ok(outcome)
    }

    /// Current load and latency for every backend that has served traffic.
    pub fn monitor(&self) -> BTreeMap<Backend, BackendReport> {
        let report: BTreeMap<_, _> = self
            .stats
            .all_backends()
            .into_iter()
            .map(|backend| {
                let summary = self.stats.aggregate(&backend);
                let entry = BackendReport {
                    active_connections: self.connections.snapshot(&backend),
                    total_requests: summary.count,
                    average_latency: summary.avg,
                    max_latency: summary.max,
                    min_latency: summary.min,
                };
                (backend, entry)
            })
            .collect();

        tracing::debug!(backends = report.len(), "Monitor metrics retrieved");
        report
    }
}
