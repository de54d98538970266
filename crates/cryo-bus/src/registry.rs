//! # Registry
//!
//! Kind-keyed subscriber lists and middleware chains.
//!
//! The two maps sit behind independent locks: registering middleware never
//! blocks subscribers and the other way round. No method holds both locks.
//! Dispatch only ever clones a snapshot out of a map and releases the lock
//! before running any user code.

use crate::middleware::Middleware;
use cryo_events::{CryoEvent, EventKind};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Kind-erased handler stored by the registry.
pub type Handler = Arc<dyn Fn(&CryoEvent) + Send + Sync>;

/// Convenience for registering without tags.
pub const NO_TAGS: [&str; 0] = [];

/// Unique id of a subscription, generated at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered handler for exactly one kind.
pub struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    tags: BTreeSet<String>,
    handler: Handler,
}

impl Subscription {
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    #[must_use]
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Invoke the handler.
    pub fn handle(&self, event: &CryoEvent) {
        (self.handler)(event);
    }

    /// True if this subscription carries every tag in `tags`.
    fn has_all_tags(&self, tags: &[String]) -> bool {
        tags.iter().all(|tag| self.tags.contains(tag))
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

/// Subscriber and middleware maps.
#[derive(Default)]
pub struct Registry {
    /// Subscribers per kind, in registration order.
    ///
    /// A kind keeps its (possibly empty) entry once anything subscribed to
    /// it; that is what makes it "known" to global middleware.
    subscribers: RwLock<HashMap<EventKind, Vec<Arc<Subscription>>>>,

    /// Middleware chains per kind, in registration order.
    pub(crate) middleware: RwLock<HashMap<EventKind, Vec<Middleware>>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler to `kind`'s subscriber list.
    pub fn subscribe<I, S>(&self, kind: EventKind, handler: Handler, tags: I) -> SubscriptionId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let subscription = Subscription {
            id: SubscriptionId::generate(),
            kind,
            tags: tags.into_iter().map(Into::into).collect(),
            handler,
        };
        let id = subscription.id;

        debug!(kind = %kind, id = %id, tags = ?subscription.tags, "New subscription created");

        self.subscribers
            .write()
            .entry(kind)
            .or_default()
            .push(Arc::new(subscription));

        id
    }

    /// Subscribe the same handler to every kind, one subscription each.
    pub fn subscribe_all<I, S>(&self, handler: Handler, tags: I) -> Vec<SubscriptionId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        EventKind::ALL
            .iter()
            .map(|&kind| self.subscribe(kind, Arc::clone(&handler), tags.iter().cloned()))
            .collect()
    }

    /// Remove the subscription with `id`, wherever it is.
    ///
    /// Returns false if no such subscription exists.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        for (kind, list) in subscribers.iter_mut() {
            if let Some(pos) = list.iter().position(|s| s.id == id) {
                list.remove(pos);
                debug!(kind = %kind, id = %id, "Subscription removed");
                return true;
            }
        }
        false
    }

    /// Remove every subscription whose tags include all of `tags`.
    ///
    /// An empty tag list removes nothing. Returns how many were removed.
    pub fn unsubscribe_by_tag<I, S>(&self, tags: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        if tags.is_empty() {
            return 0;
        }

        let mut removed = 0;
        let mut subscribers = self.subscribers.write();
        for list in subscribers.values_mut() {
            let before = list.len();
            list.retain(|s| !s.has_all_tags(&tags));
            removed += before - list.len();
        }

        debug!(tags = ?tags, removed, "Subscriptions removed by tag");
        removed
    }

    /// Point-in-time copy of `kind`'s subscribers.
    #[must_use]
    pub fn snapshot(&self, kind: EventKind) -> Vec<Arc<Subscription>> {
        self.subscribers
            .read()
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.read().get(&kind).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn total_subscribers(&self) -> usize {
        self.subscribers.read().values().map(Vec::len).sum()
    }

    /// Kinds that have ever had a subscriber, in declaration order.
    #[must_use]
    pub fn known_kinds(&self) -> Vec<EventKind> {
        let mut kinds: Vec<EventKind> = self.subscribers.read().keys().copied().collect();
        kinds.sort();
        kinds
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("subscribers", &self.total_subscribers())
            .field("known_kinds", &self.known_kinds())
            .finish_non_exhaustive()
    }
}
