//! # Bus Configuration
//!
//! Sizing of the async worker pool and switches for the built-in middleware.

use crate::error::BusError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Default number of async worker tasks.
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Default capacity of the async job queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// What `publish_async` does when the job queue is full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Wait for a free slot.
    #[default]
    Block,
    /// Discard the job and count it.
    Drop,
    /// Run the job on a freshly spawned task, outside the pool.
    Spawn,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Block => "block",
            Self::Drop => "drop",
            Self::Spawn => "spawn",
        })
    }
}

impl FromStr for OverflowPolicy {
    type Err = BusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "block" => Ok(Self::Block),
            "drop" => Ok(Self::Drop),
            "spawn" => Ok(Self::Spawn),
            other => Err(BusError::InvalidConfig(format!(
                "unknown overflow policy '{other}'"
            ))),
        }
    }
}

/// Event bus configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Number of worker tasks running async handlers.
    pub worker_count: usize,

    /// Jobs that may wait in the queue before the overflow policy applies.
    pub queue_capacity: usize,

    pub overflow_policy: OverflowPolicy,

    /// Log bot connect/disconnect events at info level.
    pub enable_connect_print_middleware: bool,

    /// Log private and group messages at info level.
    pub enable_message_print_middleware: bool,

    /// Log every event as JSON at debug level.
    pub enable_event_debug_middleware: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            overflow_policy: OverflowPolicy::Block,
            enable_connect_print_middleware: false,
            enable_message_print_middleware: false,
            enable_event_debug_middleware: false,
        }
    }
}

impl BusConfig {
    /// Create a config for testing (small pool, small queue).
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            worker_count: 2,
            queue_capacity: 16,
            ..Self::default()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CRYO_BUS_WORKERS`: worker count (default: 4)
    /// - `CRYO_BUS_QUEUE_CAPACITY`: queue capacity (default: 1024)
    /// - `CRYO_BUS_OVERFLOW`: `block`, `drop` or `spawn` (default: block)
    /// - `CRYO_CONNECT_PRINT`: enable connection print middleware
    /// - `CRYO_MESSAGE_PRINT`: enable message print middleware
    /// - `CRYO_EVENT_DEBUG`: enable event debug middleware
    ///
    /// Unparseable values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`BusConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let flag = |key: &str| {
            lookup(key)
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false)
        };

        Self {
            worker_count: lookup("CRYO_BUS_WORKERS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.worker_count),

            queue_capacity: lookup("CRYO_BUS_QUEUE_CAPACITY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.queue_capacity),

            overflow_policy: lookup("CRYO_BUS_OVERFLOW")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.overflow_policy),

            enable_connect_print_middleware: flag("CRYO_CONNECT_PRINT"),
            enable_message_print_middleware: flag("CRYO_MESSAGE_PRINT"),
            enable_event_debug_middleware: flag("CRYO_EVENT_DEBUG"),
        }
    }

    /// Check that the pool can actually be built.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the worker count or queue capacity is zero.
    pub fn validate(&self) -> Result<(), BusError> {
        if self.worker_count == 0 {
            return Err(BusError::InvalidConfig(
                "worker_count must be at least 1".to_string(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(BusError::InvalidConfig(
                "queue_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
