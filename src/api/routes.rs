//! API Routes
//!
//! Configures the Axum router: admin endpoints first, then the
//! catch-all interception route.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    health_handler, intercept_handler, message_handler, status_handler, AppState,
};

/// Creates the main router.
///
/// # Endpoints
/// - `POST /_admin/message` - Deliver a control message
/// - `GET /_admin/status` - Status snapshot
/// - `GET /_admin/health` - Health check endpoint
/// - fallback - Intercepted traffic
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/_admin/message", post(message_handler))
        .route("/_admin/status", get(status_handler))
        .route("/_admin/health", get(health_handler))
        .fallback(intercept_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::InterceptionBoundary;
    use crate::cache::{MemoryStore, SystemClock};
    use crate::net::StaticNetwork;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;
    use url::Url;

    fn create_test_app() -> Router {
        let origin = Url::parse("https://app.example.com").unwrap();
        let (boundary, _task) = InterceptionBoundary::wire(
            Arc::new(MemoryStore::new()),
            Arc::new(StaticNetwork::offline()),
            Arc::new(SystemClock),
            origin.clone(),
            "1.0.0",
        );
        create_router(AppState::new(Arc::new(boundary), origin))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/_admin/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/_admin/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_message_endpoint_rejects_unknown_type() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/_admin/message")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"type":"REBOOT"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_unmatched_paths_are_intercepted() {
        let app = create_test_app();

        // Offline network, empty cache: the interceptor answers with a
        // synthesized 503 rather than a router 404.
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/static/js/app.js")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
