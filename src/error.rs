//! Error types for the caching gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Gateway Error Enum ==
/// Unified error type for the caching gateway.
///
/// The variants mirror the failure domains of the subsystem: the blob
/// store, the network boundary, the install sequence, and the control
/// message channel. Store and network failures are normally absorbed by
/// the strategy engine's fallback chain; install failures are fatal and
/// block activation.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Cache store open/read/write failure
    #[error("Store error: {0}")]
    Store(String),

    /// Network fetch failed at the transport level
    #[error("Network error: {0}")]
    Network(String),

    /// A critical resource could not be pre-warmed during install
    #[error("Installation failed: {0}")]
    Install(String),

    /// A control message could not be processed
    #[error("Control message failed: {0}")]
    Control(String),

    /// Malformed inbound request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            GatewayError::Store(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            GatewayError::Network(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            GatewayError::Install(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            GatewayError::Control(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            GatewayError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching gateway.
pub type Result<T> = std::result::Result<T, GatewayError>;
