//! Dispatch strategy selection.
//!
//! The strategy is parsed once at startup into a closed enum. Anything the
//! parser does not recognize is an `UnknownStrategy` error and the process
//! must not start.

use std::fmt;
use std::str::FromStr;

use crate::config::PipelineConfig;
use crate::load_balancer::{
    error::DispatchError, least_conn::LeastConnections, round_robin::RoundRobin, LoadBalancer,
};
use crate::pipeline::{PipelineKind, PipelineSpec};

/// Configured dispatch strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    RoundRobin,
    LeastConnections,
    HardwarePipeline(PipelineKind),
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::RoundRobin => "round_robin",
            Strategy::LeastConnections => "least_connections",
            Strategy::HardwarePipeline(kind) => kind.as_str(),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "round_robin" => Ok(Strategy::RoundRobin),
            "least_connections" => Ok(Strategy::LeastConnections),
            "hairpin" => Ok(Strategy::HardwarePipeline(PipelineKind::Hairpin)),
            "rss_meta" => Ok(Strategy::HardwarePipeline(PipelineKind::RssMeta)),
            _ => Err(DispatchError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Resolved per-process dispatch behavior.
#[derive(Debug)]
pub enum DispatchStrategy {
    /// Pick a backend from the configured set.
    Select(Box<dyn LoadBalancer>),
    /// Provision a hardware pipeline instead of picking a backend.
    Pipeline(PipelineSpec),
}

impl DispatchStrategy {
    pub fn new(strategy: Strategy, pipeline: &PipelineConfig) -> Self {
        match strategy {
            Strategy::RoundRobin => DispatchStrategy::Select(Box::new(RoundRobin::new())),
            Strategy::LeastConnections => DispatchStrategy::Select(Box::new(LeastConnections::new())),
            Strategy::HardwarePipeline(kind) => {
                DispatchStrategy::Pipeline(PipelineSpec::from_config(kind, pipeline))
            }
        }
    }
}
