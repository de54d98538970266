//! # Cryo Events
//!
//! The event model shared by producers and consumers of the event bus.
//!
//! ## Layout
//!
//! - [`EventKind`]: closed discriminator, one value per record shape
//! - [`BaseEvent`]: id, origin tags, bot identity, summary, timestamp
//! - [`records`]: one struct per kind, each embedding a `BaseEvent`
//! - [`CryoEvent`]: the sum type the bus routes
//! - [`EventPayload`]: typed access to a single record shape
//!
//! ```rust
//! use cryo_events::{BaseEvent, BotDisconnectedEvent, EventKind, EventPayload};
//!
//! let event = BotDisconnectedEvent {
//!     base: BaseEvent::new(["system", "bot"], "BotDisconnectedEvent"),
//! }
//! .into_event();
//! assert_eq!(event.kind(), EventKind::BotDisconnected);
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod base;
pub mod event;
pub mod kind;
pub mod records;

pub use base::{unix_now, BaseEvent, BotIdentity};
pub use event::{CryoEvent, EventPayload};
pub use kind::{EventKind, UnknownEventKind};
pub use records::*;
