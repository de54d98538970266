//! # Cryo Test Suite
//!
//! Cross-crate scenarios: producers building `cryo-events` records,
//! consumers registering on a `cryo-bus` instance.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs           # Event builders shared by every scenario
//! └── integration/
//!     ├── scenarios.rs      # Delivery, veto, concurrent async fan-out
//!     ├── unsubscribe.rs    # Removal by id and by tag
//!     ├── processors.rs     # Typed handlers, processors, built-ins
//!     └── async_dispatch.rs # Worker pool behavior seen through the bus
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cryo-tests
//! cargo test -p cryo-tests integration::scenarios
//! ```

#![allow(dead_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod fixtures;
