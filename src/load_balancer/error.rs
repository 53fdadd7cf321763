//! Dispatch error kinds.

use thiserror::Error;

/// Errors surfaced by the flow dispatcher.
///
/// `InvalidRequest` and `UnknownBackend` are per-request and never touch
/// shared state. `UnknownStrategy` only occurs while building the
/// dispatcher and is fatal. `ProvisioningFailed` is per-request but is
/// logged and counted separately from ordinary dispatch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// Request is missing a required field or is malformed.
    #[error("Invalid request. {0}")]
    InvalidRequest(String),

    /// Configured strategy name is not recognized.
    #[error("Invalid strategy '{0}'. Expected one of: round_robin, least_connections, hairpin, rss_meta")]
    UnknownStrategy(String),

    /// Release for an address outside the configured backend set.
    #[error("Server {0} is not in the server list.")]
    UnknownBackend(String),

    /// Selection policy produced no backend.
    #[error("No backend available")]
    NoBackendAvailable,

    /// Packet-pipeline collaborator returned no usable handle, failed, or
    /// ran past its deadline.
    #[error("Failed to provision {resource}: {reason}")]
    ProvisioningFailed { resource: String, reason: String },
}
