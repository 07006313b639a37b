//! Interception Boundary Module
//!
//! The single lifecycle-managed object behind the four interception
//! events: install, activate, fetch, message. The store, network
//! fetch, and clock all arrive as injected dependencies; nothing here
//! reads ambient global state.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use crate::cache::{CacheGeneration, CacheStore, Clock, ExpirationTracker, EXPIRATION_WINDOW_MS};
use crate::error::Result;
use crate::lifecycle::{spawn_control_queue, ControlHandle, LifecycleManager};
use crate::models::{ControlCommand, ControlReply, FetchRequest, FetchResponse};
use crate::net::NetworkBoundary;
use crate::router::{RequestRouter, RouteDecision};
use crate::strategy::StrategyEngine;

// == Interception Boundary ==
/// Entry point for everything the gateway intercepts.
pub struct InterceptionBoundary {
    router: RequestRouter,
    engine: StrategyEngine,
    lifecycle: Arc<LifecycleManager>,
    network: Arc<dyn NetworkBoundary>,
    control: ControlHandle,
}

impl InterceptionBoundary {
    /// Wires a boundary for one generation over the injected store,
    /// network, and clock. Also returns the control-queue task handle
    /// so the server can abort it during shutdown.
    pub fn wire(
        store: Arc<dyn CacheStore>,
        network: Arc<dyn NetworkBoundary>,
        clock: Arc<dyn Clock>,
        origin: Url,
        version: &str,
    ) -> (Self, JoinHandle<()>) {
        let generation = CacheGeneration::new(version);
        let tracker = ExpirationTracker::new(store.clone(), &generation, clock);
        let engine = StrategyEngine::new(
            store.clone(),
            tracker.clone(),
            network.clone(),
            &generation,
            EXPIRATION_WINDOW_MS,
        );
        let lifecycle = Arc::new(LifecycleManager::new(
            store,
            network.clone(),
            tracker,
            generation,
            origin.clone(),
        ));
        let (control, control_task) = spawn_control_queue(lifecycle.clone());

        let boundary = Self {
            router: RequestRouter::new(origin),
            engine,
            lifecycle,
            network,
            control,
        };
        (boundary, control_task)
    }

    /// The lifecycle manager behind this boundary.
    pub fn lifecycle(&self) -> &Arc<LifecycleManager> {
        &self.lifecycle
    }

    // == Install Event ==
    pub async fn on_install(&self) -> Result<()> {
        self.lifecycle.install().await
    }

    // == Activate Event ==
    pub async fn on_activate(&self) -> Result<()> {
        self.lifecycle.activate().await
    }

    // == Fetch Event ==
    /// Routes one intercepted request and always produces a response:
    /// pass-through traffic goes straight to the network (a dead
    /// transport becomes a plain 502), everything else flows through a
    /// strategy with its own fallback chain.
    pub async fn on_fetch(&self, request: &FetchRequest) -> FetchResponse {
        let decision = self.router.classify(request);
        debug!("{} {} -> {:?}", request.method, request.url, decision);

        match decision {
            RouteDecision::Bypass => match self.network.fetch(request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Pass-through fetch failed for {}: {e}", request.url);
                    FetchResponse::new(502)
                        .with_header("content-type", "text/plain; charset=utf-8")
                        .with_body("Bad gateway: the origin is unreachable.".as_bytes())
                }
            },
            RouteDecision::NetworkFirst => self.engine.network_first(request).await,
            RouteDecision::CacheFirst => self.engine.cache_first(request).await,
        }
    }

    // == Message Event ==
    /// Forwards a decoded control command to the serial queue and
    /// returns its reply.
    pub async fn on_message(&self, command: ControlCommand) -> ControlReply {
        self.control.dispatch(command).await
    }
}
