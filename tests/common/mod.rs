//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use flow_balancer::config::BalancerConfig;
use flow_balancer::http::HttpServer;
use flow_balancer::lifecycle::{startup, Shutdown};
use flow_balancer::pipeline::{InMemoryProvisioner, PipelineProvisioner};
use flow_balancer::FlowDispatcher;

/// Config with the given backends and strategy; everything else default.
pub fn config(servers: &[&str], strategy: &str) -> BalancerConfig {
    let mut config = BalancerConfig::default();
    config.servers = servers.iter().map(|s| s.to_string()).collect();
    config.dispatch.strategy = strategy.to_string();
    config
}

/// Build the router and keep a handle on its dispatcher.
pub fn app(config: BalancerConfig) -> (Router, Arc<FlowDispatcher>) {
    app_with(config, Arc::new(InMemoryProvisioner::new()))
}

pub fn app_with(
    config: BalancerConfig,
    provisioner: Arc<dyn PipelineProvisioner>,
) -> (Router, Arc<FlowDispatcher>) {
    let dispatcher = Arc::new(startup::build_dispatcher(&config, provisioner).unwrap());
    let server = HttpServer::new(config, dispatcher.clone());
    (server.router(), dispatcher)
}

/// Send one request through the router; returns status and JSON body
/// (`Value::Null` for an empty body).
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Start a real server on an ephemeral local port.
pub async fn start_server(
    mut config: BalancerConfig,
) -> (SocketAddr, Arc<Shutdown>, JoinHandle<std::io::Result<()>>) {
    config.listener.host = "127.0.0.1".to_string();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let dispatcher = Arc::new(
        startup::build_dispatcher(&config, Arc::new(InMemoryProvisioner::new())).unwrap(),
    );
    let shutdown = Arc::new(Shutdown::new());
    let server = HttpServer::new(config, dispatcher);
    let signal = shutdown.subscribe();

    let handle = tokio::spawn(async move { server.run(listener, signal).await });
    (addr, shutdown, handle)
}
