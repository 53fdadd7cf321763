//! Flow dispatch load balancer library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod pipeline;
pub mod resilience;

pub use config::BalancerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use load_balancer::{DispatchError, DispatchOutcome, FlowDispatcher, FlowId, Strategy};
