//! Flow dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Flow request
//!     → dispatcher.rs (validate, time the decision)
//!     → strategy.rs (resolved once at startup):
//!         - round_robin.rs (rotate through backends)
//!         - least_conn.rs (pick and reserve the least loaded backend)
//!         - hardware pipeline (delegate to crate::pipeline)
//!     → tracker.rs (active connection counts)
//!     → stats.rs (request counts, latency aggregates)
//!     → DispatchOutcome or DispatchError
//! ```
//!
//! # Design Decisions
//! - Backend set is immutable for the life of the process
//! - Each shared table is guarded by its own lock (or atomic cursor)
//! - Pipeline dispatches skip connection and latency bookkeeping

pub mod backend;
pub mod dispatcher;
pub mod error;
pub mod least_conn;
pub mod round_robin;
pub mod stats;
pub mod strategy;
pub mod tracker;

use self::backend::{Backend, BackendSet};
use self::tracker::ConnectionTracker;

pub use backend::BackendSetError;
pub use dispatcher::{BackendAssignment, BackendReport, DispatchOutcome, FlowDispatcher, FlowId, PipelineAssignment};
pub use error::DispatchError;
pub use strategy::Strategy;
pub use tracker::ReleaseOutcome;

/// Backend selection policy.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    /// Choose the next backend. Returns `None` only for an empty set.
    fn next_server(&self, backends: &BackendSet, connections: &ConnectionTracker) -> Option<Backend>;

    /// Whether `next_server` reserves a connection on the chosen backend.
    fn reserves_connection(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str;
}
