//! API Handlers
//!
//! Converts between the HTTP framework's types and the gateway's own
//! fetch/control models, then hands the work to the interception
//! boundary.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use url::Url;

use crate::boundary::InterceptionBoundary;
use crate::error::{GatewayError, Result};
use crate::models::{ControlCommand, ControlReply, FetchRequest, FetchResponse};

/// Largest pass-through request body the gateway will buffer.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Inbound headers that must not be forwarded: hop-by-hop headers plus
/// `Host`, which the network boundary derives from the target URL.
const SKIP_REQUEST_HEADERS: &[&str] = &[
    "host",
    "connection",
    "keep-alive",
    "transfer-encoding",
    "upgrade",
    "proxy-connection",
    "proxy-authorization",
];

/// Outbound headers the server recomputes itself.
const SKIP_RESPONSE_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

// == App State ==
/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The interception boundary serving all traffic
    pub boundary: Arc<InterceptionBoundary>,
    /// First-party origin used to absolutize relative request URIs
    pub origin: Url,
}

impl AppState {
    /// Creates a new AppState.
    pub fn new(boundary: Arc<InterceptionBoundary>, origin: Url) -> Self {
        Self { boundary, origin }
    }
}

/// Handler for POST /_admin/message
///
/// Delivers one control message; the reply travels back in the
/// response body. Undecodable messages are rejected by the JSON
/// extractor before they reach the queue.
pub async fn message_handler(
    State(state): State<AppState>,
    Json(command): Json<ControlCommand>,
) -> Json<ControlReply> {
    Json(state.boundary.on_message(command).await)
}

/// Handler for GET /_admin/status
///
/// Convenience read-only view over the `GET_CACHE_STATUS` message.
pub async fn status_handler(State(state): State<AppState>) -> Json<ControlReply> {
    Json(state.boundary.on_message(ControlCommand::GetCacheStatus).await)
}

/// Response body for the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

/// Handler for GET /_admin/health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Fallback handler: every non-admin request is an interception event.
pub async fn intercept_handler(State(state): State<AppState>, request: Request) -> Response {
    match into_fetch_request(&state.origin, request).await {
        Ok(fetch_request) => {
            let response = state.boundary.on_fetch(&fetch_request).await;
            into_http_response(response)
        }
        Err(e) => e.into_response(),
    }
}

// == Request Conversion ==
/// Builds the gateway's request model from the framework's. Relative
/// URIs are absolutized against the configured origin; absolute-form
/// proxy URIs are taken as-is.
async fn into_fetch_request(origin: &Url, request: Request) -> Result<FetchRequest> {
    let (parts, body) = request.into_parts();

    let url = if parts.uri.scheme().is_some() {
        Url::parse(&parts.uri.to_string())
    } else {
        let target = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        origin.join(target)
    }
    .map_err(|e| GatewayError::InvalidRequest(format!("unroutable URI {}: {e}", parts.uri)))?;

    let mut fetch_request = FetchRequest::new(parts.method.as_str(), url);
    for (name, value) in parts.headers.iter() {
        if SKIP_REQUEST_HEADERS.contains(&name.as_str()) {
            continue;
        }
        if let Ok(value) = value.to_str() {
            fetch_request = fetch_request.with_header(name.as_str(), value);
        }
    }

    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| GatewayError::InvalidRequest(format!("unreadable request body: {e}")))?;
    Ok(fetch_request.with_body(bytes.to_vec()))
}

// == Response Conversion ==
fn into_http_response(response: FetchResponse) -> Response {
    let FetchResponse {
        status,
        headers,
        body,
    } = response;

    let mut http_response = Response::new(Body::from(body));
    *http_response.status_mut() =
        StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);

    for (name, value) in &headers {
        if SKIP_RESPONSE_HEADERS.contains(&name.as_str()) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_str()),
            HeaderValue::from_str(value),
        ) {
            http_response.headers_mut().insert(name, value);
        }
    }
    http_response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryStore, SystemClock};
    use crate::models::CacheStatus;
    use crate::net::StaticNetwork;

    const ORIGIN: &str = "https://app.example.com";

    fn state(network: StaticNetwork) -> AppState {
        let origin = Url::parse(ORIGIN).unwrap();
        let (boundary, _task) = InterceptionBoundary::wire(
            Arc::new(MemoryStore::new()),
            Arc::new(network),
            Arc::new(SystemClock),
            origin.clone(),
            "1.0.0",
        );
        AppState::new(Arc::new(boundary), origin)
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_message_handler_status_round_trip() {
        let state = state(StaticNetwork::offline());

        let Json(reply) = message_handler(
            State(state),
            Json(ControlCommand::GetCacheStatus),
        )
        .await;

        assert_eq!(
            reply,
            ControlReply::Status(CacheStatus {
                cache_size: 0,
                last_update: 0
            })
        );
    }

    #[tokio::test]
    async fn test_intercept_handler_serves_offline_page() {
        let state = state(StaticNetwork::offline());

        let request = axum::http::Request::builder()
            .uri("/docs/guide.html")
            .header("accept", "text/html")
            .body(Body::empty())
            .unwrap();
        let response = intercept_handler(State(state), request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/html; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn test_request_conversion_absolutizes_and_filters_headers() {
        let origin = Url::parse(ORIGIN).unwrap();
        let request = axum::http::Request::builder()
            .uri("/static/app.js?v=3")
            .header("host", "gateway.internal")
            .header("accept", "*/*")
            .body(Body::empty())
            .unwrap();

        let fetch_request = into_fetch_request(&origin, request).await.unwrap();

        assert_eq!(
            fetch_request.url.as_str(),
            "https://app.example.com/static/app.js?v=3"
        );
        assert_eq!(fetch_request.header("host"), None);
        assert_eq!(fetch_request.header("accept"), Some("*/*"));
    }

    #[tokio::test]
    async fn test_response_conversion_drops_hop_by_hop_headers() {
        let response = FetchResponse::new(200)
            .with_header("content-type", "text/css")
            .with_header("transfer-encoding", "chunked")
            .with_body("body{}".as_bytes());

        let http_response = into_http_response(response);

        assert_eq!(http_response.status(), StatusCode::OK);
        assert_eq!(http_response.headers().get("content-type").unwrap(), "text/css");
        assert!(http_response.headers().get("transfer-encoding").is_none());
    }
}
