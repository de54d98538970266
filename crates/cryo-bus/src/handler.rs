//! # Typed Handlers
//!
//! Lets callers register handlers that take one concrete record (for
//! example `&GroupMessageEvent`) while the registry stores kind-erased
//! [`Handler`]s.
//!
//! ```rust
//! use cryo_bus::{EventBus, Processor};
//! use cryo_events::{EventKind, GroupMessageEvent, PrivateMessageEvent};
//!
//! let bus = EventBus::new();
//! bus.on(|e: &GroupMessageEvent| println!("{}", e.message.content), ["echo"]);
//!
//! let ids = Processor::on_message([EventKind::PrivateMessage])
//!     .handle(|e: &PrivateMessageEvent| println!("{}", e.message.content))
//!     .handle(|e: &GroupMessageEvent| println!("{}", e.group_name))
//!     .register(&bus);
//! assert_eq!(ids.len(), 1);
//! ```

use crate::bus::EventBus;
use crate::registry::{Handler, SubscriptionId};
use cryo_events::{CryoEvent, EventKind, EventPayload};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Wrap a typed handler into a kind-erased one.
///
/// The wrapper recovers `&E` from the event. A mismatch can only happen if
/// a middleware replaced the event with a different variant; it is logged
/// and the handler is skipped.
pub fn typed<E, F>(handler: F) -> Handler
where
    E: EventPayload,
    F: Fn(&E) + Send + Sync + 'static,
{
    Arc::new(move |event: &CryoEvent| match E::from_event(event) {
        Some(record) => handler(record),
        None => warn!(
            expected = %E::KIND,
            actual = %event.kind(),
            id = %event.id(),
            "Typed handler received a different event kind, skipped"
        ),
    })
}

impl EventBus {
    /// Subscribe a handler for one concrete record type.
    ///
    /// The kind is taken from the record type, so it always matches.
    pub fn on<E, F, I, S>(&self, handler: F, tags: I) -> SubscriptionId
    where
        E: EventPayload,
        F: Fn(&E) + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subscribe_handler(E::KIND, typed::<E, F>(handler), tags)
    }
}

/// Builder that registers a batch of typed handlers at once.
///
/// Only handlers whose kind is among the matched kinds get subscribed; the
/// rest are logged and dropped at [`Processor::register`].
#[derive(Default)]
pub struct Processor {
    matched: Vec<EventKind>,
    handlers: Vec<(EventKind, Handler)>,
    tags: BTreeSet<String>,
}

impl Processor {
    /// An empty processor; add kinds with [`Processor::add_kind`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Match exactly `kinds`.
    #[must_use]
    pub fn on_type<I>(kinds: I) -> Self
    where
        I: IntoIterator<Item = EventKind>,
    {
        Self {
            matched: kinds.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Match message kinds.
    ///
    /// With no kinds, or with any non-message kind among them, all message
    /// kinds are matched.
    #[must_use]
    pub fn on_message<I>(kinds: I) -> Self
    where
        I: IntoIterator<Item = EventKind>,
    {
        let kinds: Vec<EventKind> = kinds.into_iter().collect();
        if kinds.is_empty() || kinds.iter().any(|k| !k.is_message()) {
            Self::on_type(EventKind::MESSAGES)
        } else {
            Self::on_type(kinds)
        }
    }

    /// Add a typed handler.
    #[must_use]
    pub fn handle<E, F>(mut self, handler: F) -> Self
    where
        E: EventPayload,
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.handlers.push((E::KIND, typed::<E, F>(handler)));
        self
    }

    /// Add a kind-erased handler for `kind`.
    #[must_use]
    pub fn handle_any<F>(mut self, kind: EventKind, handler: F) -> Self
    where
        F: Fn(&CryoEvent) + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        self.handlers.push((kind, handler));
        self
    }

    /// Tag every subscription this processor creates.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn add_kind(&mut self, kind: EventKind) {
        self.matched.push(kind);
    }

    pub fn add_kinds<I>(&mut self, kinds: I)
    where
        I: IntoIterator<Item = EventKind>,
    {
        self.matched.extend(kinds);
    }

    /// Replace the matched kinds.
    pub fn set_kinds<I>(&mut self, kinds: I)
    where
        I: IntoIterator<Item = EventKind>,
    {
        self.matched = kinds.into_iter().collect();
    }

    #[must_use]
    pub fn matched_kinds(&self) -> &[EventKind] {
        &self.matched
    }

    /// Subscribe every handler whose kind is matched.
    pub fn register(self, bus: &EventBus) -> Vec<SubscriptionId> {
        let Processor {
            matched,
            handlers,
            tags,
        } = self;

        let mut ids = Vec::with_capacity(handlers.len());
        for (kind, handler) in handlers {
            if !matched.contains(&kind) {
                warn!(kind = %kind, matched = ?matched, "Handler kind not matched by processor, dropped");
                continue;
            }
            ids.push(bus.subscribe_handler(kind, handler, tags.iter().cloned()));
            info!(kind = %kind, "Handler registered");
        }
        ids
    }
}
