//! # Cryo Bus - In-Process Event Bus
//!
//! Routes [`CryoEvent`](cryo_events::CryoEvent)s from producers (protocol
//! adapters, connection handlers) to subscribers keyed by event kind.
//!
//! ## Dispatch Pipeline
//!
//! ```text
//! publish(event)
//!     │
//!     ▼
//! ┌────────────────────┐   None    ┌─────────┐
//! │ middleware[kind]   │ ────────► │ dropped │
//! │ m1 → m2 → ... → mn │           └─────────┘
//! └────────────────────┘
//!     │ Some(event')
//!     ▼
//! ┌────────────────────┐  publish        ┌──────────────────────┐
//! │ subscribers[kind]  │ ──────────────► │ caller, in order     │
//! │ (snapshot)         │  publish_async  ├──────────────────────┤
//! │                    │ ──────────────► │ worker pool, no order│
//! └────────────────────┘                 └──────────────────────┘
//! ```
//!
//! ## Rules
//!
//! - Middleware runs once per publish, in registration order; `None` vetoes
//! - Subscribers are snapshotted before delivery, so handlers may publish,
//!   subscribe, or unsubscribe without deadlocking
//! - Unsubscribing by tag removes subscriptions carrying every given tag
//!
//! ```rust
//! use cryo_bus::{EventBus, NO_TAGS};
//! use cryo_events::{BaseEvent, BotConnectedEvent, EventKind};
//!
//! let bus = EventBus::new();
//! bus.subscribe(EventKind::BotConnected, |e| println!("{}", e.summary()), NO_TAGS);
//!
//! let delivered = bus.publish(BotConnectedEvent {
//!     base: BaseEvent::new(["system", "bot"], "BotConnectedEvent"),
//!     version: "1.0".into(),
//! });
//! assert_eq!(delivered, 1);
//! ```

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod builtin;
pub mod bus;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
mod pool;
pub mod registry;
pub mod stream;

pub use builtin::install_builtin_middleware;
pub use bus::{EventBus, EventPublisher};
pub use config::{BusConfig, OverflowPolicy, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKER_COUNT};
pub use error::BusError;
pub use handler::{typed, Processor};
pub use middleware::{inspect, middleware, Middleware};
pub use registry::{Handler, Registry, Subscription, SubscriptionId, NO_TAGS};
pub use stream::{EventStream, StreamError};
