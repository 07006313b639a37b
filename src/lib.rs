//! Offline Gateway - An offline-first HTTP caching gateway
//!
//! Fronts an origin server with versioned cache generations, cache-first
//! and network-first fetch strategies, and synthesized offline responses.

pub mod api;
pub mod boundary;
pub mod cache;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod net;
pub mod router;
pub mod strategy;

pub use api::AppState;
pub use boundary::InterceptionBoundary;
pub use config::Config;
