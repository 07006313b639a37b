//! API Module
//!
//! HTTP surface of the gateway: a small admin area and a fallback
//! route that intercepts everything else.
//!
//! # Endpoints
//! - `POST /_admin/message` - Deliver a control message, reply in the body
//! - `GET /_admin/status` - Status snapshot of the current generation
//! - `GET /_admin/health` - Health check endpoint
//! - anything else - Intercepted and served through the strategy engine

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
