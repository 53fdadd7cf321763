//! Request bodies and request-ID middleware.
//!
//! # Responsibilities
//! - Deserialize balance and release payloads
//! - Attach a UUID `x-request-id` to every request and echo it back
//!
//! # Design Decisions
//! - Request ID added as early as possible so the trace span carries it
//! - Fields are optional at the serde level; handlers decide what is required

use axum::body::Body;
use axum::http::Request;
use serde::Deserialize;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::Span;

use crate::load_balancer::FlowId;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Body of `POST /balance`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BalanceRequest {
    #[serde(default)]
    pub flow_id: Option<FlowId>,
}

/// Body of `POST /release`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseRequest {
    #[serde(default)]
    pub server: Option<String>,
}

/// Layer that assigns a fresh UUID when the client sent no request ID.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer that copies the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Span for one HTTP request, tagged with its request ID.
pub fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}
