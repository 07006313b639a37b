//! Lifecycle Manager Module
//!
//! Owns one cache generation's journey: Installing → Waiting → Active,
//! and Removed once superseded. Install pre-warms the critical and
//! optional resource sets; activation prunes every stale generation
//! carrying the subsystem prefix and takes over all traffic.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};
use url::Url;

use crate::cache::{CacheGeneration, CacheStore, ExpirationTracker, PartitionKind};
use crate::error::{GatewayError, Result};
use crate::lifecycle::{CRITICAL_RESOURCES, OPTIONAL_RESOURCES};
use crate::models::{Ack, CacheStatus, ClearOutcome, ControlCommand, ControlReply, FetchRequest};
use crate::net::NetworkBoundary;

// == Lifecycle State ==
/// Where a generation is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Pre-warming the resource sets
    Installing,
    /// Installed, eligible for activation
    Waiting,
    /// Serving all intercepted traffic
    Active,
    /// Superseded by a newer generation
    Removed,
}

// == Lifecycle Manager ==
/// Drives install/activate and answers control messages for one
/// generation.
pub struct LifecycleManager {
    store: Arc<dyn CacheStore>,
    network: Arc<dyn NetworkBoundary>,
    tracker: ExpirationTracker,
    generation: CacheGeneration,
    origin: Url,
    critical: Vec<String>,
    optional: Vec<String>,
    state: RwLock<LifecycleState>,
    skip_waiting: AtomicBool,
}

impl LifecycleManager {
    /// Creates a manager with the fixed pre-warm resource sets.
    pub fn new(
        store: Arc<dyn CacheStore>,
        network: Arc<dyn NetworkBoundary>,
        tracker: ExpirationTracker,
        generation: CacheGeneration,
        origin: Url,
    ) -> Self {
        Self::with_resources(
            store,
            network,
            tracker,
            generation,
            origin,
            CRITICAL_RESOURCES.iter().map(|s| s.to_string()).collect(),
            OPTIONAL_RESOURCES.iter().map(|s| s.to_string()).collect(),
        )
    }

    /// Creates a manager with explicit resource sets.
    #[allow(clippy::too_many_arguments)]
    pub fn with_resources(
        store: Arc<dyn CacheStore>,
        network: Arc<dyn NetworkBoundary>,
        tracker: ExpirationTracker,
        generation: CacheGeneration,
        origin: Url,
        critical: Vec<String>,
        optional: Vec<String>,
    ) -> Self {
        Self {
            store,
            network,
            tracker,
            generation,
            origin,
            critical,
            optional,
            state: RwLock::new(LifecycleState::Installing),
            skip_waiting: AtomicBool::new(false),
        }
    }

    /// Returns the current lifecycle state.
    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    /// Returns the generation this manager owns.
    pub fn generation(&self) -> &CacheGeneration {
        &self.generation
    }

    /// True once install has requested immediate activation.
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    // == Install ==
    /// Pre-warms the generation. Every critical resource must cache or
    /// the whole install fails and the generation stays un-activatable;
    /// optional resources fail individually without consequence. Ends
    /// by requesting skip-waiting so activation needn't wait for open
    /// clients to close.
    pub async fn install(&self) -> Result<()> {
        self.expect_state(LifecycleState::Installing, "install").await?;
        info!(
            "Installing generation {}: {} critical, {} optional resources",
            self.generation.version(),
            self.critical.len(),
            self.optional.len()
        );

        for resource in &self.critical {
            self.precache(resource)
                .await
                .map_err(|e| GatewayError::Install(format!("critical resource {resource}: {e}")))?;
        }

        for resource in &self.optional {
            if let Err(e) = self.precache(resource).await {
                warn!("Skipping optional resource {resource}: {e}");
            }
        }

        *self.state.write().await = LifecycleState::Waiting;
        self.skip_waiting.store(true, Ordering::SeqCst);
        info!(
            "Generation {} installed, skip-waiting requested",
            self.generation.version()
        );
        Ok(())
    }

    // == Activate ==
    /// Deletes every partition that carries the subsystem prefix but
    /// does not belong to this generation, leaving foreign cache names
    /// untouched, then takes over all traffic. Requests already in
    /// flight finish against the generation they started with.
    pub async fn activate(&self) -> Result<()> {
        self.expect_state(LifecycleState::Waiting, "activate").await?;

        for name in self.store.list_partitions().await? {
            if self.generation.owns_prefix(&name) && !self.generation.is_current(&name) {
                info!("Deleting stale generation partition: {name}");
                self.store.delete_partition(&name).await?;
            }
        }

        *self.state.write().await = LifecycleState::Active;
        info!(
            "Generation {} active, serving all clients",
            self.generation.version()
        );
        Ok(())
    }

    // == Handle Control ==
    /// Answers one control message. Failures are caught here and
    /// reported through the reply, never allowed to take down the
    /// message handler.
    pub async fn handle_control(&self, command: ControlCommand) -> ControlReply {
        match command {
            ControlCommand::SkipWaiting => match self.force_activate().await {
                Ok(()) => ControlReply::Ack(Ack::ok()),
                Err(e) => ControlReply::Ack(Ack::failed(e.to_string())),
            },
            ControlCommand::GetCacheStatus => match self.cache_status().await {
                Ok(status) => ControlReply::Status(status),
                Err(e) => ControlReply::Ack(Ack::failed(e.to_string())),
            },
            ControlCommand::ClearCache => match self.clear_cache().await {
                Ok(()) => ControlReply::Clear(ClearOutcome::ok()),
                Err(e) => ControlReply::Clear(ClearOutcome::failed(e.to_string())),
            },
        }
    }

    // == Cache Status ==
    /// Snapshot of the current generation: payload record count and the
    /// most recent recorded fetch time (0 when nothing has been
    /// fetched yet).
    pub async fn cache_status(&self) -> Result<CacheStatus> {
        let cache_size = self
            .store
            .count(&self.generation.partition(PartitionKind::Payload))
            .await?;
        let last_update = self.tracker.latest_fetch_time().await.unwrap_or(0);
        Ok(CacheStatus {
            cache_size,
            last_update,
        })
    }

    // == Clear Cache ==
    /// Purges both partitions of the current generation. They are
    /// recreated lazily by the next write.
    pub async fn clear_cache(&self) -> Result<()> {
        self.store
            .delete_partition(&self.generation.partition(PartitionKind::Payload))
            .await?;
        self.store
            .delete_partition(&self.generation.partition(PartitionKind::Meta))
            .await?;
        info!("Cleared generation {}", self.generation.version());
        Ok(())
    }

    // == Retire ==
    /// Marks this manager superseded. Called when a newer generation
    /// has activated over the same store.
    pub async fn retire(&self) {
        *self.state.write().await = LifecycleState::Removed;
        info!("Generation {} retired", self.generation.version());
    }

    /// Forces the Waiting → Active transition; a no-op when already
    /// active.
    async fn force_activate(&self) -> Result<()> {
        match self.state().await {
            LifecycleState::Active => Ok(()),
            LifecycleState::Waiting => {
                self.skip_waiting.store(true, Ordering::SeqCst);
                self.activate().await
            }
            state => Err(GatewayError::Control(format!(
                "Cannot skip waiting from {state:?} state"
            ))),
        }
    }

    async fn expect_state(&self, expected: LifecycleState, operation: &str) -> Result<()> {
        let state = self.state().await;
        if state != expected {
            return Err(GatewayError::Install(format!(
                "Cannot {operation} from {state:?} state"
            )));
        }
        Ok(())
    }

    /// Resolves a resource (absolute URL or origin-relative path) to
    /// the request the strategies will later use as the cache key.
    fn resolve(&self, resource: &str) -> Result<Url> {
        let url = if resource.contains("://") {
            Url::parse(resource)
        } else {
            self.origin.join(resource)
        };
        url.map_err(|e| GatewayError::InvalidRequest(format!("bad resource URL {resource}: {e}")))
    }

    /// Fetches one resource and writes payload + timestamp. Unlike
    /// steady-state traffic, a store write failure here is an error:
    /// install must not report a pre-warmed set it doesn't have.
    async fn precache(&self, resource: &str) -> Result<()> {
        let request = FetchRequest::get(self.resolve(resource)?);
        let response = self.network.fetch(&request).await?;
        if !response.is_success() {
            return Err(GatewayError::Network(format!(
                "origin answered {}",
                response.status
            )));
        }

        let key = request.cache_key();
        let bytes = serde_json::to_vec(&response)
            .map_err(|e| GatewayError::Store(format!("serialize {key}: {e}")))?;
        self.store
            .put(&self.generation.partition(PartitionKind::Payload), &key, bytes)
            .await?;
        self.tracker.record_fetch_time(&key).await
    }
}
