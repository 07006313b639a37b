//! Cache Module
//!
//! Versioned cache generations over a swappable partitioned blob store,
//! with a timestamp tracker that ages entries without touching payloads.

mod expiry;
mod file_store;
mod generation;
mod store;

// Re-export public types
pub use expiry::{epoch_ms, Clock, ExpirationTracker, SystemClock};
pub use file_store::FileStore;
pub use generation::{CacheGeneration, PartitionKind};
pub use store::{CacheStore, MemoryStore};

// == Public Constants ==
/// Naming prefix owned by this subsystem's cache generations
pub const CACHE_PREFIX: &str = "offline-gateway";

/// Fixed expiration window applied uniformly to all entries: 24 hours.
/// Staleness inside the window is accepted; there is no per-resource
/// override.
pub const EXPIRATION_WINDOW_MS: u64 = 24 * 60 * 60 * 1000;
