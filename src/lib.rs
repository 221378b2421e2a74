//! Front door trust gate.
//!
//! Admits only traffic that arrived through a trusted edge (front door),
//! answers edge health probes, and restores the public host name from
//! `X-Forwarded-Host` before the application sees the request.
//!
//! ```text
//!     Client ──▶ Edge ──▶ ┌──────────────────────────────────────────────┐
//!                         │  trust gate → forwarded host → host filter   │──▶ Upstream
//!                         │       │              │              │        │    (or echo)
//!                         │       └──── 400 ─────┴──── 400 ─────┘        │
//!                         └──────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod frontdoor;
pub mod http;

// Cross-cutting concerns
pub mod admin;
pub mod diagnostics;
pub mod lifecycle;
pub mod observability;

pub use config::schema::GateConfig;
pub use frontdoor::{FrontDoorGate, FrontDoorSettings};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
