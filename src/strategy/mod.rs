//! Strategy Module
//!
//! The two fetch strategies (cache-first, network-first) composed over
//! the cache store, the expiration tracker, and the network boundary,
//! plus the synthesized offline responses both fall back to when cache
//! and network are exhausted.

mod engine;
mod fallback;

pub use engine::StrategyEngine;
pub use fallback::{synthesize_fallback, OFFLINE_PAGE, PLACEHOLDER_SVG};
