//! Front door trust gate.
//!
//! # Data Flow
//! ```text
//! Inbound request (Host, X-Forwarded-Host, X-FD-HealthProbe, X-Azure-FDID, path)
//!     → signals.rs (extract InboundSignals)
//!     → probe.rs (NotAProbe | ValidProbeCandidate | MalformedProbe)
//!     → engine.rs + strategy.rs (Accept with optional rewrite | Reject)
//!     → forwarded.rs (host scheme: adopt allow-listed X-Forwarded-Host as Host)
//!     → host_filter.rs (host scheme: effective host must be allow-listed)
//!     → Accept (continue to application) | Reject (400, empty body)
//! ```
//!
//! # Design Decisions
//! - Settings are validated once and shared read-only (no locking)
//! - Every stage is synchronous and allocation-light; no I/O in the core
//! - Rejections carry a reason for logs/metrics but never reach the client
//! - Under the host scheme the host filter is its own stage after adoption
//! - Under the edge-id scheme the identifier check replaces adoption and the
//!   host filter

pub mod allow_list;
pub mod decision;
pub mod engine;
pub mod forwarded;
pub mod gate;
pub mod host_filter;
pub mod probe;
pub mod settings;
pub mod signals;
pub mod strategy;

pub use allow_list::AllowList;
pub use decision::{Decision, Rejection};
pub use engine::TrustEngine;
pub use gate::FrontDoorGate;
pub use settings::{FrontDoorSettings, Trust};
pub use signals::InboundSignals;
