use paystation_gateway::{GatewayError, gateway::mask};
use serde::Serialize;

pub mod api;

pub type Result<T> = std::result::Result<T, ServiceErrorResponse>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Approved,
    Declined,
    Pending,
}

#[derive(Debug, Serialize)]
pub struct ServiceErrorResponse {
    result: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
}

impl std::error::Error for ServiceErrorResponse {}

impl std::fmt::Display for ServiceErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.error)
    }
}

impl ServiceErrorResponse {
    pub fn new(text: String) -> Self {
        Self {
            result: false,
            error: text,
            kind: None,
        }
    }
}

impl From<GatewayError> for ServiceErrorResponse {
    fn from(value: GatewayError) -> Self {
        let kind = match value {
            GatewayError::Validation(_) => "validation",
            GatewayError::InvalidResponse(_) => "invalid_response",
            GatewayError::Transport(_) => "transport",
            GatewayError::Encoding(_) => "encoding",
        };
        Self {
            result: false,
            error: value.to_string(),
            kind: Some(kind),
        }
    }
}

impl axum::response::IntoResponse for ServiceErrorResponse {
    fn into_response(self) -> axum::response::Response {
        tracing::debug!(data = %mask::secure_serializable(&self), "Service error response payload");
        (axum::http::StatusCode::OK, axum::Json(self)).into_response()
    }
}
