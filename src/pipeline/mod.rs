//! Hardware packet-pipeline provisioning.
//!
//! # Data Flow
//! ```text
//! hairpin / rss_meta strategy
//!     → spec.rs (match + action description)
//!     → PipelineProvisioner::create_pipeline
//!     → pipeline handle returned to the caller
//!
//! round_robin / least_connections with flow rules enabled
//!     → backend chosen
//!     → PipelineProvisioner::add_rule({server_ip, port})
//!     → rule handle attached to the assignment
//! ```
//!
//! # Design Decisions
//! - The dispatcher only cares whether a usable (non-zero) handle came back
//! - Device internals stay behind the trait; `memory.rs` stands in when no
//!   device is attached

pub mod memory;
pub mod spec;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use memory::InMemoryProvisioner;
pub use spec::{PipelineKind, PipelineSpec};

/// Steering rule for one selected backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowRule {
    pub server_ip: String,
    pub port: u16,
}

/// Failures reported by a provisioning device.
#[derive(Debug, Error)]
pub enum ProvisionerError {
    #[error("device rejected request: {0}")]
    Rejected(String),

    #[error("device unavailable: {0}")]
    Unavailable(String),
}

/// Packet-pipeline provisioning collaborator.
///
/// Both calls return the raw identifier the device hands back. `None` or
/// zero means the device produced nothing usable.
#[async_trait]
pub trait PipelineProvisioner: Send + Sync + std::fmt::Debug {
    async fn create_pipeline(&self, spec: &PipelineSpec) -> Result<Option<u64>, ProvisionerError>;

    async fn add_rule(&self, rule: &FlowRule) -> Result<Option<u64>, ProvisionerError>;
}
