//! Strategy Engine Module
//!
//! Implements the two fetch strategies as policies over the cache
//! store, the expiration tracker, and the network boundary. Both
//! strategies are idempotent, never fail, and always hand a well-formed
//! response back to the caller.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{CacheGeneration, CacheStore, ExpirationTracker, PartitionKind};
use crate::models::{FetchRequest, FetchResponse};
use crate::net::NetworkBoundary;
use crate::strategy::fallback::synthesize_fallback;

// == Strategy Engine ==
/// Serves intercepted requests from cache and network.
///
/// Holds the payload partition of one generation; requests in flight
/// keep whatever generation their engine snapshot was built with.
#[derive(Clone)]
pub struct StrategyEngine {
    store: Arc<dyn CacheStore>,
    tracker: ExpirationTracker,
    network: Arc<dyn NetworkBoundary>,
    payload_partition: String,
    window_ms: u64,
}

impl StrategyEngine {
    /// Creates an engine over one generation's payload partition.
    pub fn new(
        store: Arc<dyn CacheStore>,
        tracker: ExpirationTracker,
        network: Arc<dyn NetworkBoundary>,
        generation: &CacheGeneration,
        window_ms: u64,
    ) -> Self {
        Self {
            store,
            tracker,
            network,
            payload_partition: generation.partition(PartitionKind::Payload),
            window_ms,
        }
    }

    // == Cache First ==
    /// Prefers a fresh cached entry; the network is only consulted on a
    /// miss or an expired entry. On network failure the stale entry is
    /// served anyway (serve-stale-on-error), and with nothing cached a
    /// fallback response is synthesized.
    pub async fn cache_first(&self, request: &FetchRequest) -> FetchResponse {
        let key = request.cache_key();
        let cached = self.lookup(&key).await;

        if let Some(response) = cached.as_ref() {
            if !self.tracker.is_expired(&key, self.window_ms).await {
                debug!("Cache-first hit: {key}");
                return response.clone();
            }
            debug!("Cache-first entry expired, revalidating: {key}");
        }

        match self.fetch_and_store(request, &key).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Cache-first network failure for {key}: {e}");
                match cached {
                    Some(stale) => {
                        debug!("Serving stale entry: {key}");
                        stale
                    }
                    None => synthesize_fallback(request),
                }
            }
        }
    }

    // == Network First ==
    /// Always attempts the network; the cache is the fallback,
    /// regardless of entry age. With nothing cached either, a fallback
    /// response is synthesized.
    pub async fn network_first(&self, request: &FetchRequest) -> FetchResponse {
        let key = request.cache_key();

        match self.fetch_and_store(request, &key).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Network-first fetch failed for {key}: {e}");
                match self.lookup(&key).await {
                    Some(cached) => cached,
                    None => synthesize_fallback(request),
                }
            }
        }
    }

    // == Fetch And Store ==
    /// Performs the network fetch; 2xx responses are written back to
    /// the payload partition with a fresh timestamp, everything else is
    /// returned uncached.
    async fn fetch_and_store(
        &self,
        request: &FetchRequest,
        key: &str,
    ) -> crate::error::Result<FetchResponse> {
        let response = self.network.fetch(request).await?;

        if response.is_success() {
            self.persist(key, &response).await;
        } else {
            debug!("Not caching non-2xx ({}) response: {key}", response.status);
        }

        Ok(response)
    }

    // == Lookup ==
    /// Reads a cached response. Store read failures and undecodable
    /// records are logged and reported as a miss.
    async fn lookup(&self, key: &str) -> Option<FetchResponse> {
        let bytes = match self.store.get(&self.payload_partition, key).await {
            Ok(bytes) => bytes?,
            Err(e) => {
                warn!("Cache read failed for {key}: {e}");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(response) => Some(response),
            Err(e) => {
                warn!("Discarding undecodable cache record for {key}: {e}");
                None
            }
        }
    }

    // == Persist ==
    /// Writes the payload record, then its timestamp. Failures are
    /// logged and swallowed so a full or broken store degrades the
    /// cache, not the response. The timestamp is only recorded after a
    /// successful payload write, keeping "timestamp without payload"
    /// impossible in steady state.
    async fn persist(&self, key: &str, response: &FetchResponse) {
        let bytes = match serde_json::to_vec(response) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to serialize response for {key}: {e}");
                return;
            }
        };

        if let Err(e) = self.store.put(&self.payload_partition, key, bytes).await {
            warn!("Cache write failed for {key}: {e}");
            return;
        }

        if let Err(e) = self.tracker.record_fetch_time(key).await {
            warn!("Timestamp write failed for {key}: {e}");
        }
    }
}
