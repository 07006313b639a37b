//! Lifecycle Module
//!
//! Drives a cache generation through install (pre-warming), activation
//! (pruning superseded generations), and the out-of-band control
//! channel.

mod control;
mod manager;

pub use control::{spawn_control_queue, ControlHandle};
pub use manager::{LifecycleManager, LifecycleState};

// == Pre-warm Resource Sets ==
/// Resources that must all be cached for installation to succeed: the
/// two document routes, the core script and logo, and the external
/// stylesheet. Relative paths are resolved against the gateway origin.
pub const CRITICAL_RESOURCES: &[&str] = &[
    "/",
    "/about",
    "/static/js/app.js",
    "/static/img/logo.svg",
    "https://fonts.googleapis.com/css2?family=Inter:wght@400;600&display=swap",
];

/// Nice-to-have resources pre-warmed after the critical set; each may
/// fail individually without affecting installation.
pub const OPTIONAL_RESOURCES: &[&str] = &[
    "/static/img/hero.jpg",
    "https://fonts.gstatic.com/s/inter/v13/inter-latin.woff2",
];
