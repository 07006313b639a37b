//! Request Router Module
//!
//! Pure, per-request classification of intercepted traffic into
//! pass-through, network-first, or cache-first handling. Recomputed on
//! every request; nothing here is persisted.

use url::Url;

use crate::models::FetchRequest;

// == Routing Constants ==
/// Paths under this prefix are dynamic API traffic: always live
/// network, never cached, so data freshness is guaranteed.
pub const API_PREFIX: &str = "/api/";

/// The only cross-origin hosts the gateway will handle. Everything
/// else passes through untouched, so arbitrary third-party content
/// never enters the cache.
pub const ALLOWED_CROSS_ORIGIN_HOSTS: &[&str] = &["fonts.googleapis.com", "fonts.gstatic.com"];

/// Named application routes that serve documents without a `.html`
/// suffix.
pub const APP_ROUTES: &[&str] = &["/about", "/projects"];

// == Route Decision ==
/// Where an intercepted request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Pass straight through to the network, untouched by the cache
    Bypass,
    /// Document-like: serve via the network-first strategy
    NetworkFirst,
    /// Static asset: serve via the cache-first strategy
    CacheFirst,
}

// == Request Router ==
/// Classifies requests against the gateway's own origin.
#[derive(Debug, Clone)]
pub struct RequestRouter {
    origin: Url,
}

impl RequestRouter {
    /// Creates a router for the given first-party origin.
    pub fn new(origin: Url) -> Self {
        Self { origin }
    }

    // == Classify ==
    /// Classifies one request; first matching rule wins.
    ///
    /// 1. Non-GET methods and WebSocket-scheme URLs are never
    ///    intercepted.
    /// 2. API-prefixed paths are never intercepted.
    /// 3. Cross-origin requests pass through unless the host is on the
    ///    allow-list of critical external hosts.
    /// 4. Remaining document-like requests go network-first; everything
    ///    else cache-first.
    pub fn classify(&self, request: &FetchRequest) -> RouteDecision {
        if !request.is_get() || matches!(request.url.scheme(), "ws" | "wss") {
            return RouteDecision::Bypass;
        }

        let path = request.url.path();
        if path.starts_with(API_PREFIX) {
            return RouteDecision::Bypass;
        }

        if request.url.origin() != self.origin.origin() {
            let allowed = request
                .url
                .host_str()
                .map_or(false, |host| ALLOWED_CROSS_ORIGIN_HOSTS.contains(&host));
            if !allowed {
                return RouteDecision::Bypass;
            }
        }

        if is_document_like(path) {
            RouteDecision::NetworkFirst
        } else {
            RouteDecision::CacheFirst
        }
    }
}

fn is_document_like(path: &str) -> bool {
    path == "/" || path.ends_with(".html") || APP_ROUTES.contains(&path)
}
