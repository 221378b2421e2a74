//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Build the immutable `FrontDoorSettings` the gate runs on
//! - Validate addresses and cross-field constraints
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<FrontDoorSettings, Vec<ValidationError>>
//! - Runs before any listener is bound

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{GateConfig, TrustScheme, PLACEHOLDER_API_KEY};
use crate::frontdoor::allow_list::{AllowList, AllowListError};
use crate::frontdoor::settings::FrontDoorSettings;

/// Path served by the edge-id echo endpoint.
pub const FDID_ECHO_PATH: &str = "/fdid";

/// A single semantic configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("front_door.allowed_front_end_hosts must list at least one host")]
    NoFrontEndHosts,

    #[error("front end host {0:?} is not a valid header value")]
    InvalidFrontEndHost(String),

    #[error("front_door.health_probe_path must not be empty when set")]
    EmptyProbePath,

    #[error("front_door.health_probe_path {0:?} must start with '/'")]
    RelativeProbePath(String),

    #[error("front_door.health_probe_path {0:?} collides with the edge-id echo endpoint")]
    ProbePathCollision(String),

    #[error("front_door.allowed_edge_ids must list at least one id for the edge_id_allow_list scheme")]
    NoEdgeIds,

    #[error("{field} {value:?} is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("admin.api_key must be changed from the placeholder when the admin API is enabled")]
    PlaceholderApiKey,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
}

/// Validate the full configuration and produce the gate settings.
pub fn validate_config(config: &GateConfig) -> Result<FrontDoorSettings, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let front_door = &config.front_door;

    // The edge-id scheme does not consult hosts; an empty list is fine there.
    let hosts_required = front_door.trust_scheme == TrustScheme::HostAllowList;
    let hosts = match AllowList::hosts(&front_door.allowed_front_end_hosts) {
        Ok(hosts) => {
            for host in hosts.entries() {
                if axum::http::HeaderValue::from_str(host).is_err() || host.contains(',') {
                    errors.push(ValidationError::InvalidFrontEndHost(host.clone()));
                }
            }
            Some(hosts)
        }
        Err(AllowListError::InvalidHost(host)) => {
            errors.push(ValidationError::InvalidFrontEndHost(host));
            None
        }
        Err(AllowListError::Empty) => {
            if hosts_required {
                errors.push(ValidationError::NoFrontEndHosts);
            }
            None
        }
    };

    let probe_path = match front_door.health_probe_path.as_deref().map(str::trim) {
        None => None,
        Some("") => {
            errors.push(ValidationError::EmptyProbePath);
            None
        }
        Some(path) if !path.starts_with('/') => {
            errors.push(ValidationError::RelativeProbePath(path.to_string()));
            None
        }
        Some(path) => {
            if config.diagnostics.echo_edge_id && path.eq_ignore_ascii_case(FDID_ECHO_PATH) {
                errors.push(ValidationError::ProbePathCollision(path.to_string()));
            }
            Some(path.to_string())
        }
    };

    let edge_ids = match front_door.trust_scheme {
        TrustScheme::HostAllowList => None,
        TrustScheme::EdgeIdAllowList => match AllowList::identifiers(&front_door.allowed_edge_ids) {
            Ok(ids) => Some(ids),
            Err(_) => {
                errors.push(ValidationError::NoEdgeIds);
                None
            }
        },
    };

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if let Some(upstream) = &config.upstream.address {
        check_address(&mut errors, "upstream.address", upstream);
    }
    if config.observability.metrics_enabled {
        check_address(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }
    if config.admin.enabled {
        check_address(&mut errors, "admin.bind_address", &config.admin.bind_address);
        if config.admin.api_key.is_empty() || config.admin.api_key == PLACEHOLDER_API_KEY {
            errors.push(ValidationError::PlaceholderApiKey);
        }
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // Every failure path above pushed an error, so the scheme has what it
    // needs and the first host is a valid header value.
    match FrontDoorSettings::new(hosts, probe_path, edge_ids) {
        Some(settings) => Ok(settings),
        None => Err(vec![ValidationError::NoFrontEndHosts]),
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
