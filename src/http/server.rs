//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the balance, release and monitor handlers
//! - Wire up middleware (tracing, request ID, timeout)
//! - Translate payloads into dispatcher calls and errors into status codes
//! - Serve until the shutdown signal fires

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::BalancerConfig;
use crate::http::request::{
    make_request_span, propagate_request_id_layer, set_request_id_layer, BalanceRequest,
    ReleaseRequest,
};
use crate::http::response::{BalanceResponse, StatusResponse};
use crate::lifecycle::ShutdownSignal;
use crate::load_balancer::backend::Backend;
use crate::load_balancer::{BackendReport, DispatchError, FlowDispatcher};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<FlowDispatcher>,
    pub require_flow_id: bool,
    pub provision_deadline: Duration,
}

/// HTTP front end for the flow dispatcher.
pub struct HttpServer {
    router: Router,
    config: BalancerConfig,
}

impl HttpServer {
    /// Create a new HTTP server around an existing dispatcher.
    pub fn new(config: BalancerConfig, dispatcher: Arc<FlowDispatcher>) -> Self {
        let state = AppState {
            dispatcher,
            require_flow_id: config.dispatch.require_flow_id,
            provision_deadline: Duration::from_millis(config.timeouts.provision_ms),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &BalancerConfig, state: AppState) -> Router {
        Router::new()
            .route("/balance", post(balance_handler))
            .route("/release", post(release_handler))
            .route("/monitor", get(monitor_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                    .layer(propagate_request_id_layer())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Router with all handlers and layers, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            strategy = %self.config.dispatch.strategy,
            "HTTP server starting"
        );

        // Serve with graceful shutdown
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// `POST /balance`: assign a flow.
async fn balance_handler(
    State(state): State<AppState>,
    payload: Result<Json<BalanceRequest>, JsonRejection>,
) -> Result<Json<BalanceResponse>, DispatchError> {
    let Json(request) = payload.map_err(|e| {
        tracing::warn!(error = %e.body_text(), "Rejected balance payload");
        DispatchError::InvalidRequest(format!("Expected a JSON body with 'flow_id': {}", e.body_text()))
    })?;

    if state.require_flow_id && request.flow_id.is_none() {
        tracing::warn!("Balance request without flow_id");
        return Err(DispatchError::InvalidRequest("Missing 'flow_id'".to_string()));
    }

    let outcome = state
        .dispatcher
        .dispatch_within(request.flow_id, Some(state.provision_deadline))
        .await?;

    Ok(Json(outcome.into()))
}

/// `POST /release`: give back one connection on a backend.
async fn release_handler(
    State(state): State<AppState>,
    payload: Result<Json<ReleaseRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, DispatchError> {
    let server = payload
        .ok()
        .and_then(|Json(request)| request.server)
        .ok_or_else(|| DispatchError::InvalidRequest("Missing 'server'".to_string()))?;

    state.dispatcher.release(&server)?;
    Ok(Json(StatusResponse { status: "ok" }))
}

/// `GET /monitor`: per-backend load and latency.
async fn monitor_handler(State(state): State<AppState>) -> Json<BTreeMap<Backend, BackendReport>> {
    Json(state.dispatcher.monitor())
}

/// `GET /health`: liveness plus the active configuration.
async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let dispatcher = &state.dispatcher;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "strategy": dispatcher.strategy().as_str(),
        "servers": dispatcher.backends().len(),
        "backend_port": dispatcher.port(),
    }))
}
