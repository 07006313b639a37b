//! Expiration Tracker Module
//!
//! Records a last-fetched timestamp per resource key in a generation's
//! meta partition. Deliberately decoupled from payload storage so an
//! entry's age is answered by one small read, without deserializing or
//! re-validating the cached body.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

use crate::cache::{CacheGeneration, CacheStore, PartitionKind};
use crate::error::Result;

// == Clock ==
/// Wall-clock seam, injected so expiration boundaries are exactly
/// testable.
pub trait Clock: Send + Sync {
    /// Current Unix timestamp in milliseconds.
    fn now_ms(&self) -> u64;
}

/// Production clock reading the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        epoch_ms()
    }
}

/// Returns current Unix timestamp in milliseconds.
pub fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

// == Expiration Tracker ==
/// Ages cache entries through the meta partition.
///
/// Timestamps are stored as decimal strings; a record that is missing
/// or unreadable counts as "unknown age", which is treated as expired.
#[derive(Clone)]
pub struct ExpirationTracker {
    store: Arc<dyn CacheStore>,
    partition: String,
    clock: Arc<dyn Clock>,
}

impl ExpirationTracker {
    /// Creates a tracker over the generation's meta partition.
    pub fn new(
        store: Arc<dyn CacheStore>,
        generation: &CacheGeneration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            partition: generation.partition(PartitionKind::Meta),
            clock,
        }
    }

    // == Record Fetch Time ==
    /// Stores the current wall-clock time under the resource key,
    /// overwriting any prior timestamp.
    pub async fn record_fetch_time(&self, key: &str) -> Result<()> {
        let now = self.clock.now_ms();
        self.store
            .put(&self.partition, key, now.to_string().into_bytes())
            .await
    }

    // == Fetch Time ==
    /// Returns the recorded fetch time, or `None` when no timestamp
    /// exists. Store read failures are logged and reported as `None`,
    /// the miss semantics the strategy engine expects.
    pub async fn fetch_time(&self, key: &str) -> Option<u64> {
        let bytes = match self.store.get(&self.partition, key).await {
            Ok(bytes) => bytes?,
            Err(e) => {
                warn!("Timestamp read failed for {key}: {e}");
                return None;
            }
        };
        parse_timestamp(&bytes)
    }

    // == Is Expired ==
    /// Checks whether the entry's age has reached the window.
    ///
    /// Boundary condition: expired when `now - timestamp >= window`,
    /// so an entry written at `t0` is still fresh at
    /// `t0 + window - 1ms` and expired at exactly `t0 + window`.
    /// A missing timestamp is always expired.
    pub async fn is_expired(&self, key: &str, window_ms: u64) -> bool {
        match self.fetch_time(key).await {
            Some(recorded) => self.clock.now_ms().saturating_sub(recorded) >= window_ms,
            None => true,
        }
    }

    // == Latest Fetch Time ==
    /// Returns the most recent recorded fetch time across the whole
    /// generation, for the status snapshot. `None` when nothing has
    /// been recorded.
    pub async fn latest_fetch_time(&self) -> Option<u64> {
        let keys = match self.store.list_keys(&self.partition).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Timestamp scan failed: {e}");
                return None;
            }
        };

        let mut latest = None;
        for key in keys {
            if let Some(recorded) = self.fetch_time(&key).await {
                latest = Some(latest.map_or(recorded, |current: u64| current.max(recorded)));
            }
        }
        latest
    }
}

fn parse_timestamp(bytes: &[u8]) -> Option<u64> {
    let text = std::str::from_utf8(bytes).ok()?;
    match text.parse() {
        Ok(millis) => Some(millis),
        Err(_) => {
            warn!("Discarding unparseable timestamp record: {text:?}");
            None
        }
    }
}
