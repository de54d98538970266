//! # Bus Errors

use thiserror::Error;

/// Errors from bus construction and asynchronous delivery.
///
/// Registration never fails and a middleware veto is not an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The worker pool was shut down; no more async deliveries are accepted.
    #[error("Event bus closed")]
    Closed,

    /// `publish_async` was called outside a tokio runtime.
    #[error("No tokio runtime available to run async handlers")]
    NoRuntime,

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
