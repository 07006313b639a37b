//! Fetch request and response value types
//!
//! These are the gateway's own representations of intercepted traffic,
//! independent of any particular HTTP framework so the core stays
//! testable without a live server. Responses are serializable because
//! they are what the cache partitions store.

use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

// == Fetch Request ==
/// An intercepted request as seen by the router and strategy engine.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Uppercase HTTP method
    pub method: String,
    /// Absolute request URL
    pub url: Url,
    /// Header map with lowercase names
    pub headers: HashMap<String, String>,
    /// Raw body bytes, forwarded verbatim on pass-through routes
    pub body: Vec<u8>,
}

impl FetchRequest {
    /// Creates a request with the given method and absolute URL.
    pub fn new(method: impl Into<String>, url: Url) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            url,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Creates a GET request, the only method the gateway ever caches.
    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    /// Adds a header, normalizing the name to lowercase.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Sets the body bytes.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns the `Accept` header, defaulting to `*/*` when absent.
    pub fn accept(&self) -> &str {
        self.header("accept").unwrap_or("*/*")
    }

    /// Returns true for GET requests.
    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    // == Cache Key ==
    /// Returns the request identity used to address cache records.
    ///
    /// The identity is the absolute URL with the fragment stripped;
    /// fragments never reach the origin and must not split cache
    /// entries. Payload and timestamp records for one resource share
    /// this key and differ only by partition kind.
    pub fn cache_key(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url.to_string()
    }
}

// == Fetch Response ==
/// A response flowing back through the gateway.
///
/// Stored verbatim (status, headers, body bytes) in the payload
/// partition on successful fetches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,
    /// Header map with lowercase names
    pub headers: HashMap<String, String>,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Creates an empty response with the given status.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Adds a header, normalizing the name to lowercase.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Sets the body bytes.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns the `Content-Type` header if present.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Returns true for 2xx statuses. Only such responses are ever
    /// written into the cache partitions.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body as text for inspection and tests.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
