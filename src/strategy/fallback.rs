//! Fallback Synthesis Module
//!
//! When neither cache nor network can satisfy a request, the gateway
//! still answers with a well-formed response. The shape is chosen from
//! the request's `Accept` header, in priority order: image placeholder,
//! offline document, plain 503.

use crate::models::{FetchRequest, FetchResponse};

/// Inline vector placeholder served in place of unreachable images.
/// Status 200 on purpose: a broken-image glyph would read as a page
/// bug, not an offline condition.
pub const PLACEHOLDER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="300" viewBox="0 0 400 300" role="img" aria-label="Image unavailable offline"><rect width="400" height="300" fill="#e2e8f0"/><path d="M140 190l40-50 30 36 22-26 28 40z" fill="#cbd5e1"/><circle cx="150" cy="118" r="14" fill="#cbd5e1"/><text x="200" y="245" text-anchor="middle" font-family="system-ui, sans-serif" font-size="15" fill="#64748b">Image unavailable offline</text></svg>"##;

/// Self-contained offline page with a manual retry action.
pub const OFFLINE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Offline</title>
<style>
  body { font-family: system-ui, sans-serif; background: #f8fafc; color: #1e293b;
         display: flex; align-items: center; justify-content: center; min-height: 100vh; margin: 0; }
  main { text-align: center; padding: 2rem; }
  h1 { font-size: 1.5rem; }
  p { color: #64748b; }
  button { background: #0f172a; color: #f8fafc; border: none; border-radius: 6px;
           padding: 0.6rem 1.4rem; font-size: 1rem; cursor: pointer; }
</style>
</head>
<body>
<main>
  <h1>You are offline</h1>
  <p>This page is not in the cache and the network is unreachable.</p>
  <button onclick="location.reload()">Try again</button>
</main>
</body>
</html>
"#;

// == Synthesize Fallback ==
/// Produces the offline response for a request both strategies gave up
/// on. The three outcomes are mutually exclusive and checked in
/// priority order.
pub fn synthesize_fallback(request: &FetchRequest) -> FetchResponse {
    let accept = request.accept();

    if accept.contains("image/") {
        return FetchResponse::new(200)
            .with_header("content-type", "image/svg+xml")
            .with_body(PLACEHOLDER_SVG.as_bytes());
    }

    if accept.contains("text/html") {
        return FetchResponse::new(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(OFFLINE_PAGE.as_bytes());
    }

    FetchResponse::new(503)
        .with_header("content-type", "text/plain; charset=utf-8")
        .with_body("Offline: no cached copy is available and the network is unreachable.".as_bytes())
}
