//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the balancer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the flow balancer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BalancerConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Backend server addresses, in selection order.
    pub servers: Vec<String>,

    /// Dispatch behavior.
    pub dispatch: DispatchConfig,

    /// Hardware pipeline parameters.
    pub pipeline: PipelineConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            servers: vec![
                "192.168.1.101".to_string(),
                "192.168.1.102".to_string(),
                "192.168.1.103".to_string(),
            ],
            dispatch: DispatchConfig::default(),
            pipeline: PipelineConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl BalancerConfig {
    /// Address the HTTP listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listener.host, self.listener.port)
    }

    /// Port reported to clients alongside the chosen backend.
    pub fn backend_port(&self) -> u16 {
        self.dispatch.backend_port.unwrap_or(self.listener.port)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Listening port.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 80,
        }
    }
}

/// Dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// One of round_robin, least_connections, hairpin, rss_meta.
    pub strategy: String,

    /// Port reported with each assignment (default: listener port).
    pub backend_port: Option<u16>,

    /// Reject balance requests that carry no flow_id.
    pub require_flow_id: bool,

    /// Install a device steering rule for every backend assignment.
    pub install_flow_rules: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            strategy: "round_robin".to_string(),
            backend_port: None,
            require_flow_id: true,
            install_flow_rules: false,
        }
    }
}

/// Hardware pipeline parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Physical port hairpin traffic is forwarded to.
    pub hairpin_port_id: u16,

    /// RSS queues for the rss_meta pipeline.
    pub rss_queues: Vec<u16>,

    /// Packet metadata value set by the rss_meta pipeline.
    pub pkt_meta: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            hairpin_port_id: 1,
            rss_queues: vec![0, 1, 2, 3],
            pkt_meta: 10,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout for the HTTP layer in seconds.
    pub request_secs: u64,

    /// Deadline for a single provisioning device call in milliseconds.
    pub provision_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            provision_ms: 2000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
