//! # Event Bus
//!
//! The dispatcher: middleware first, then every subscriber of the event's
//! kind, either on the caller (`publish`) or on the worker pool
//! (`publish_async`).

use crate::builtin::install_builtin_middleware;
use crate::config::BusConfig;
use crate::error::BusError;
use crate::middleware::Middleware;
use crate::pool::WorkerPool;
use crate::registry::{Handler, Registry, SubscriptionId};
use async_trait::async_trait;
use cryo_events::{CryoEvent, EventKind};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Trait for publishing events to the bus.
///
/// Producers (protocol adapters, connection handlers) hold an
/// `Arc<dyn EventPublisher>` rather than a concrete bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Deliver synchronously on the caller. Returns handlers invoked.
    fn publish(&self, event: CryoEvent) -> usize;

    /// Hand the event to the worker pool. Returns jobs accepted.
    async fn publish_async(&self, event: CryoEvent) -> Result<usize, BusError>;
}

/// In-process event bus.
///
/// Construct one per application (or per test) and share it by `Arc`.
pub struct EventBus {
    registry: Registry,
    pool: WorkerPool,
    config: BusConfig,
    events_published: AtomicU64,
}

impl EventBus {
    /// Create a bus with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::build(BusConfig::default())
    }

    /// Create a bus and install the built-in middleware the config enables.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the pool sizing is unusable.
    pub fn with_config(config: BusConfig) -> Result<Self, BusError> {
        config.validate()?;
        let bus = Self::build(config);
        install_builtin_middleware(&bus.registry, &bus.config);
        Ok(bus)
    }

    fn build(config: BusConfig) -> Self {
        Self {
            registry: Registry::new(),
            pool: WorkerPool::new(&config),
            config,
            events_published: AtomicU64::new(0),
        }
    }

    // =========================================================================
    // REGISTRATION
    // =========================================================================

    /// Subscribe a kind-erased handler to `kind`.
    pub fn subscribe<F, I, S>(&self, kind: EventKind, handler: F, tags: I) -> SubscriptionId
    where
        F: Fn(&CryoEvent) + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry.subscribe(kind, Arc::new(handler), tags)
    }

    /// Subscribe an already shared handler to `kind`.
    pub fn subscribe_handler<I, S>(&self, kind: EventKind, handler: Handler, tags: I) -> SubscriptionId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry.subscribe(kind, handler, tags)
    }

    /// Subscribe one handler to every kind.
    pub fn subscribe_all<F, I, S>(&self, handler: F, tags: I) -> Vec<SubscriptionId>
    where
        F: Fn(&CryoEvent) + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry.subscribe_all(Arc::new(handler), tags)
    }

    /// Remove one subscription. No-op (false) if the id is unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.registry.unsubscribe(id)
    }

    /// Remove every subscription carrying all of `tags`.
    pub fn unsubscribe_by_tag<I, S>(&self, tags: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry.unsubscribe_by_tag(tags)
    }

    /// Append transforms to `kind`'s middleware chain.
    pub fn add_middleware<I>(&self, kind: EventKind, transforms: I)
    where
        I: IntoIterator<Item = Middleware>,
    {
        self.registry.add_middleware(kind, transforms);
    }

    /// Append transforms to every kind that currently has (or had) a
    /// subscriber. Kinds first subscribed later are not affected.
    pub fn add_global_middleware<I>(&self, transforms: I)
    where
        I: IntoIterator<Item = Middleware>,
    {
        self.registry.add_global_middleware(transforms);
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    /// Run middleware, then every subscriber of the event's kind, in
    /// registration order, on the calling thread.
    ///
    /// Handler panics are not caught. Returns the number of handlers
    /// invoked (zero when vetoed).
    pub fn publish(&self, event: impl Into<CryoEvent>) -> usize {
        let Some((kind, event)) = self.prepare(event.into()) else {
            return 0;
        };

        let subscribers = self.registry.snapshot(kind);
        for subscription in &subscribers {
            subscription.handle(&event);
        }

        debug!(kind = %kind, id = %event.id(), handlers = subscribers.len(), "Event published");
        subscribers.len()
    }

    /// Run middleware, then schedule one job per subscriber on the worker
    /// pool and return without waiting for any of them.
    ///
    /// No ordering holds between the scheduled handlers. A panicking
    /// handler is logged and does not affect the others.
    ///
    /// # Errors
    ///
    /// `Closed` after [`EventBus::shutdown`]; `NoRuntime` outside tokio.
    ///
    /// If the pool closes part way through the subscriber list, jobs that
    /// were already accepted still run; the error is returned and the
    /// accepted count is logged at `warn!`.
    pub async fn publish_async(&self, event: impl Into<CryoEvent>) -> Result<usize, BusError> {
        let Some((kind, event)) = self.prepare(event.into()) else {
            return Ok(0);
        };

        let subscribers = self.registry.snapshot(kind);
        if subscribers.is_empty() {
            trace!(kind = %kind, "No subscribers for event");
            return Ok(0);
        }

        let event = Arc::new(event);
        let mut scheduled = 0;
        for subscription in subscribers {
            let job_event = Arc::clone(&event);
            match self
                .pool
                .submit(move || subscription.handle(&job_event))
                .await
            {
                Ok(true) => scheduled += 1,
                Ok(false) => {}
                Err(e) => {
                    if scheduled > 0 {
                        warn!(
                            kind = %kind,
                            id = %event.id(),
                            scheduled,
                            error = %e,
                            "Async publish interrupted, accepted jobs still run"
                        );
                    }
                    return Err(e);
                }
            }
        }

        debug!(kind = %kind, id = %event.id(), scheduled, "Event scheduled");
        Ok(scheduled)
    }

    /// Count the call and run the middleware chain.
    fn prepare(&self, event: CryoEvent) -> Option<(EventKind, CryoEvent)> {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        // Subscribers are resolved by the kind the event was published as.
        let kind = event.kind();
        self.registry.apply_middleware(event).map(|event| (kind, event))
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Resolve once every async job accepted so far has finished.
    pub async fn wait_idle(&self) {
        self.pool.wait_idle().await;
    }

    /// Stop the worker pool after it drains. Synchronous publishing keeps
    /// working; `publish_async` returns `Closed` from now on.
    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }

    // =========================================================================
    // INSPECTION
    // =========================================================================

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Publish calls made, vetoed ones included.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    /// Async jobs discarded by the drop overflow policy.
    #[must_use]
    pub fn dropped_jobs(&self) -> u64 {
        self.pool.dropped()
    }

    /// Async jobs accepted but not yet finished.
    #[must_use]
    pub fn pending_jobs(&self) -> usize {
        self.pool.in_flight()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    #[must_use]
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.registry.subscriber_count(kind)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("events_published", &self.events_published())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EventPublisher for EventBus {
    fn publish(&self, event: CryoEvent) -> usize {
        EventBus::publish(self, event)
    }

    async fn publish_async(&self, event: CryoEvent) -> Result<usize, BusError> {
        EventBus::publish_async(self, event).await
    }
}
