//! Response bodies and error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::load_balancer::backend::Backend;
use crate::load_balancer::{DispatchError, DispatchOutcome, FlowId};
use crate::pipeline::PipelineKind;

/// Body returned by `POST /balance`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BalanceResponse {
    Backend {
        server: Backend,
        port: u16,
        flow_id: FlowId,
        #[serde(skip_serializing_if = "Option::is_none")]
        rule_id: Option<u64>,
    },
    Pipeline {
        strategy: PipelineKind,
        pipeline_id: u64,
        flow_id: FlowId,
    },
}

impl From<DispatchOutcome> for BalanceResponse {
    fn from(outcome: DispatchOutcome) -> Self {
        match outcome {
            DispatchOutcome::Backend(a) => BalanceResponse::Backend {
                server: a.server,
                port: a.port,
                flow_id: a.flow_id,
                rule_id: a.rule_id,
            },
            DispatchOutcome::Pipeline(p) => BalanceResponse::Pipeline {
                strategy: p.kind,
                pipeline_id: p.pipeline_id,
                flow_id: p.flow_id,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl DispatchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::InvalidRequest(_) | DispatchError::UnknownBackend(_) => {
                StatusCode::BAD_REQUEST
            }
            DispatchError::UnknownStrategy(_) | DispatchError::ProvisioningFailed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            DispatchError::NoBackendAvailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (self.status_code(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::{BackendAssignment, PipelineAssignment};
    use std::time::Duration;

    #[test]
    fn test_backend_body_shape() {
        let body = BalanceResponse::from(DispatchOutcome::Backend(BackendAssignment {
            server: Backend::new("10.0.0.1"),
            port: 80,
            flow_id: FlowId::Number(5),
            latency: Duration::from_micros(3),
            rule_id: None,
        }));
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json, serde_json::json!({"server": "10.0.0.1", "port": 80, "flow_id": 5}));
    }

    #[test]
    fn test_pipeline_body_shape() {
        let body = BalanceResponse::from(DispatchOutcome::Pipeline(PipelineAssignment {
            kind: PipelineKind::RssMeta,
            pipeline_id: 12,
            flow_id: FlowId::Text("f".into()),
        }));
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"strategy": "rss_meta", "pipeline_id": 12, "flow_id": "f"})
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            DispatchError::InvalidRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DispatchError::UnknownBackend("10.0.0.9".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DispatchError::ProvisioningFailed {
                resource: "hairpin pipeline".into(),
                reason: "down".into()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            DispatchError::NoBackendAvailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
