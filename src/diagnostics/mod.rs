//! Operational diagnostics.
//!
//! # Responsibilities
//! - Capture recent raw requests for the admin API (bounded)
//! - Surface the edge identifier so operators can configure the allow-list
//!
//! # Design Decisions
//! - Capture goes through the `RequestObserver` trait so it can be swapped
//!   or disabled; there is no global request history
//! - Capacity is fixed at startup; the oldest entry is dropped when full

pub mod capture;

pub use capture::{CapturedRequest, NoopObserver, RequestObserver, RingBufferObserver};

use std::sync::Arc;

use crate::config::DiagnosticsConfig;

/// Observer selected by configuration.
pub fn observer_from_config(config: &DiagnosticsConfig) -> Arc<dyn RequestObserver> {
    if config.capture_capacity > 0 {
        Arc::new(RingBufferObserver::new(config.capture_capacity))
    } else {
        Arc::new(NoopObserver)
    }
}
