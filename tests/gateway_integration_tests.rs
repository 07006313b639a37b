//! Integration Tests for the Gateway
//!
//! Drives the full stack over HTTP: install/activate a generation,
//! then exercise interception, fallbacks, and the admin control
//! channel through the axum router.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use offline_gateway::{
    api::{create_router, AppState},
    boundary::InterceptionBoundary,
    cache::{MemoryStore, SystemClock},
    lifecycle::{CRITICAL_RESOURCES, OPTIONAL_RESOURCES},
    models::FetchResponse,
    net::StaticNetwork,
};
use serde_json::Value;
use tower::ServiceExt;
use url::Url;

const ORIGIN: &str = "https://app.example.com";

// == Helper Functions ==

fn absolute(resource: &str) -> String {
    if resource.contains("://") {
        resource.to_string()
    } else {
        format!("{ORIGIN}{resource}")
    }
}

/// Network that serves every pre-warm resource plus a few app URLs.
fn populated_network() -> Arc<StaticNetwork> {
    let network = StaticNetwork::offline();
    for resource in CRITICAL_RESOURCES.iter().chain(OPTIONAL_RESOURCES.iter()) {
        network.serve(
            absolute(resource),
            FetchResponse::new(200)
                .with_header("content-type", "text/plain")
                .with_body(format!("content of {resource}").as_bytes()),
        );
    }
    network.serve(
        absolute("/api/posts"),
        FetchResponse::new(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":1}]"#.as_bytes()),
    );
    Arc::new(network)
}

/// Wires, installs, and activates a gateway over the given network.
async fn install_gateway(network: Arc<StaticNetwork>) -> Router {
    let origin = Url::parse(ORIGIN).unwrap();
    let (boundary, _control_task) = InterceptionBoundary::wire(
        Arc::new(MemoryStore::new()),
        network,
        Arc::new(SystemClock),
        origin.clone(),
        "1.0.0",
    );
    boundary.on_install().await.unwrap();
    boundary.on_activate().await.unwrap();
    create_router(AppState::new(Arc::new(boundary), origin))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_to_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// == Interception Tests ==

#[tokio::test]
async fn test_precached_document_served_while_offline() {
    let network = populated_network();
    let app = install_gateway(network.clone()).await;

    // Origin goes away after install; the pre-warmed route still serves.
    network.drop_url(&absolute("/about"));

    let response = app.oneshot(get("/about")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_text(response.into_body()).await, "content of /about");
}

#[tokio::test]
async fn test_asset_cached_on_first_request_then_replayed() {
    let network = populated_network();
    let url = absolute("/static/css/site.css");
    network.serve(
        &url,
        FetchResponse::new(200)
            .with_header("content-type", "text/css")
            .with_body("body{}".as_bytes()),
    );
    let app = install_gateway(network.clone()).await;

    let response = app
        .clone()
        .oneshot(get("/static/css/site.css"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Network loses the asset; the cached copy still answers.
    network.drop_url(&url);
    let response = app.oneshot(get("/static/css/site.css")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_text(response.into_body()).await, "body{}");
}

#[tokio::test]
async fn test_offline_document_request_gets_offline_page() {
    let app = install_gateway(populated_network()).await;

    let request = Request::builder()
        .uri("/uncached/report.html")
        .header("accept", "text/html,application/xhtml+xml")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_text(response.into_body()).await;
    assert!(body.contains("You are offline"));
}

#[tokio::test]
async fn test_offline_image_request_gets_svg_placeholder() {
    let app = install_gateway(populated_network()).await;

    let request = Request::builder()
        .uri("/uncached/photo.jpg")
        .header("accept", "image/avif,image/webp,image/png")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/svg+xml"
    );
    assert!(body_to_text(response.into_body()).await.starts_with("<svg"));
}

#[tokio::test]
async fn test_api_requests_are_live_and_never_cached() {
    let network = populated_network();
    let app = install_gateway(network.clone()).await;

    let response = app.clone().oneshot(get("/api/posts")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // With the API gone there is no cached copy to fall back on.
    network.drop_url(&absolute("/api/posts"));
    let response = app.oneshot(get("/api/posts")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

// == Admin Channel Tests ==

#[tokio::test]
async fn test_status_reports_prewarmed_generation() {
    let app = install_gateway(populated_network()).await;

    let response = app.oneshot(get("/_admin/status")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(
        json["cacheSize"].as_u64().unwrap() as usize,
        CRITICAL_RESOURCES.len() + OPTIONAL_RESOURCES.len()
    );
    assert!(json["lastUpdate"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_clear_cache_message_purges_generation() {
    let app = install_gateway(populated_network()).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/_admin/message")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"type":"CLEAR_CACHE"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json, serde_json::json!({"success": true}));

    let response = app.oneshot(get("/_admin/status")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["cacheSize"], 0);
}

#[tokio::test]
async fn test_skip_waiting_message_acknowledged_when_active() {
    let app = install_gateway(populated_network()).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/_admin/message")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"type":"SKIP_WAITING"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["ok"], true);
}

#[tokio::test]
async fn test_health_endpoint_reports_healthy() {
    let app = install_gateway(populated_network()).await;

    let response = app.oneshot(get("/_admin/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
}

// == Install Failure Tests ==

#[tokio::test]
async fn test_install_failure_blocks_activation() {
    let network = populated_network();
    network.drop_url(&absolute("/static/img/logo.svg"));

    let origin = Url::parse(ORIGIN).unwrap();
    let (boundary, _control_task) = InterceptionBoundary::wire(
        Arc::new(MemoryStore::new()),
        network,
        Arc::new(SystemClock),
        origin,
        "1.0.0",
    );

    assert!(boundary.on_install().await.is_err());
    assert!(boundary.on_activate().await.is_err());
}
