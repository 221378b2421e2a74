//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, apply FRONTDOOR_* environment overrides)
//!     → validation.rs (semantic checks, all errors at once)
//!     → FrontDoorSettings (validated, immutable)
//!     → shared via Arc with the gate middleware
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - An invalid config stops the process before it serves traffic

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, DiagnosticsConfig, FrontDoorConfig, GateConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, TrustScheme, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
