//! # Middleware Pipeline
//!
//! Ordered, kind-scoped transforms applied to an event before dispatch.
//! A transform returning `None` vetoes the publish call: later transforms
//! and every subscriber for that call are skipped.

use crate::registry::Registry;
use cryo_events::{CryoEvent, EventKind};
use std::sync::Arc;
use tracing::{debug, trace};

/// A transform with veto power.
pub type Middleware = Arc<dyn Fn(CryoEvent) -> Option<CryoEvent> + Send + Sync>;

/// Wrap a closure as a [`Middleware`].
pub fn middleware<F>(transform: F) -> Middleware
where
    F: Fn(CryoEvent) -> Option<CryoEvent> + Send + Sync + 'static,
{
    Arc::new(transform)
}

/// Wrap a side-effect-only closure as a pass-through [`Middleware`].
pub fn inspect<F>(observe: F) -> Middleware
where
    F: Fn(&CryoEvent) + Send + Sync + 'static,
{
    Arc::new(move |event| {
        observe(&event);
        Some(event)
    })
}

impl Registry {
    /// Append transforms to `kind`'s chain, keeping their order.
    pub fn add_middleware<I>(&self, kind: EventKind, transforms: I)
    where
        I: IntoIterator<Item = Middleware>,
    {
        let mut chains = self.middleware.write();
        let chain = chains.entry(kind).or_default();
        let before = chain.len();
        chain.extend(transforms);
        debug!(kind = %kind, added = chain.len() - before, "Middleware added");
    }

    /// Append the same transforms to every kind known right now.
    ///
    /// A kind is known once anything has subscribed to it. Kinds that get
    /// their first subscriber after this call do not receive these
    /// transforms.
    pub fn add_global_middleware<I>(&self, transforms: I)
    where
        I: IntoIterator<Item = Middleware>,
    {
        let transforms: Vec<Middleware> = transforms.into_iter().collect();
        // Subscriber lock is released before the middleware lock is taken.
        let kinds = self.known_kinds();

        let mut chains = self.middleware.write();
        for &kind in &kinds {
            chains
                .entry(kind)
                .or_default()
                .extend(transforms.iter().cloned());
        }
        debug!(kinds = kinds.len(), added = transforms.len(), "Global middleware added");
    }

    #[must_use]
    pub fn middleware_count(&self, kind: EventKind) -> usize {
        self.middleware.read().get(&kind).map_or(0, Vec::len)
    }

    /// Run `event` through its kind's chain.
    ///
    /// The chain is cloned under the read lock and applied after the lock
    /// is released, so a transform may itself publish or register.
    pub fn apply_middleware(&self, event: CryoEvent) -> Option<CryoEvent> {
        let kind = event.kind();
        let chain = match self.middleware.read().get(&kind) {
            Some(chain) if !chain.is_empty() => chain.clone(),
            _ => return Some(event),
        };

        let mut current = event;
        for (stage, transform) in chain.iter().enumerate() {
            match transform(current) {
                Some(next) => current = next,
                None => {
                    trace!(kind = %kind, stage, "Event vetoed by middleware");
                    return None;
                }
            }
        }
        Some(current)
    }
}
