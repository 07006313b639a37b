//! Network Boundary Module
//!
//! The outbound-fetch seam between the strategy engine and the content
//! delivery network. Injected as a trait so the core is testable with
//! scripted responses.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{GatewayError, Result};
use crate::models::{FetchRequest, FetchResponse};

// == Network Boundary Trait ==
/// Performs a network fetch for an intercepted request.
///
/// Any HTTP response, 2xx or not, resolves to `Ok`; `Err` is reserved
/// for transport failures (refused connection, DNS, aborted stream).
/// That split is what drives the strategies' fallback chains.
#[async_trait]
pub trait NetworkBoundary: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse>;
}

// == HTTP Client Boundary ==
/// Production boundary on a shared reqwest client.
///
/// No request timeout is applied here; a hung fetch delays the
/// strategy's fallback decision until the transport gives up.
#[derive(Debug, Clone, Default)]
pub struct HttpClientBoundary {
    client: reqwest::Client,
}

impl HttpClientBoundary {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NetworkBoundary for HttpClientBoundary {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| GatewayError::Network(format!("Invalid method: {e}")))?;

        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            // Headers that don't survive the round trip are dropped
            // rather than failing the whole fetch.
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }

        let mut builder = self
            .client
            .request(method, request.url.as_str())
            .headers(headers);
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let mut fetched = FetchResponse::new(status);
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                fetched = fetched.with_header(name.as_str(), value);
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(fetched.with_body(body.to_vec()))
    }
}

// == Static Network ==
/// Fixture boundary serving a fixed URL→response table.
///
/// URLs outside the table fail like a dead transport, which makes an
/// empty table the "offline" stand-in for tests and demos. A call
/// counter exposes how often the network was actually consulted.
#[derive(Debug, Default)]
pub struct StaticNetwork {
    responses: RwLock<HashMap<String, FetchResponse>>,
    calls: AtomicUsize,
}

impl StaticNetwork {
    /// Creates an empty table: every fetch fails.
    pub fn offline() -> Self {
        Self::default()
    }

    /// Builder form of [`serve`](Self::serve).
    pub fn with_response(self, url: impl Into<String>, response: FetchResponse) -> Self {
        self.serve(url, response);
        self
    }

    /// Registers (or replaces) the response served for a URL.
    pub fn serve(&self, url: impl Into<String>, response: FetchResponse) {
        self.responses
            .write()
            .expect("response table poisoned")
            .insert(url.into(), response);
    }

    /// Removes a URL from the table, so further fetches of it fail.
    pub fn drop_url(&self, url: &str) {
        self.responses
            .write()
            .expect("response table poisoned")
            .remove(url);
    }

    /// Number of fetches attempted so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NetworkBoundary for StaticNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .read()
            .expect("response table poisoned")
            .get(request.url.as_str())
            .cloned()
            .ok_or_else(|| GatewayError::Network(format!("unreachable: {}", request.url)))
    }
}
