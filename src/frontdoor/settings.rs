//! Validated, immutable front door settings.

use axum::http::HeaderValue;
use serde::Serialize;

use crate::config::schema::TrustScheme;
use crate::frontdoor::allow_list::AllowList;

/// What the gate trusts as evidence that traffic came through the front door.
#[derive(Debug, Clone)]
pub enum Trust {
    /// The effective host must be allow-listed. Valid probes are stamped
    /// with `probe_front_end`, the first allow-listed host.
    Hosts {
        allowed: AllowList,
        probe_front_end: HeaderValue,
    },
    /// The edge identifier must be allow-listed. Hosts play no part.
    EdgeIds(AllowList),
}

/// Front door settings after validation. Built once at startup and shared
/// read-only; there are no setters.
#[derive(Debug, Clone)]
pub struct FrontDoorSettings {
    trust: Trust,
    health_probe_path: Option<String>,
}

impl FrontDoorSettings {
    /// Assemble settings from already-validated parts. Edge ids select the
    /// edge-id scheme and make `hosts` irrelevant.
    ///
    /// Returns `None` for host trust without hosts, or if the first
    /// allow-listed host is not a valid header value.
    pub(crate) fn new(
        hosts: Option<AllowList>,
        health_probe_path: Option<String>,
        allowed_edge_ids: Option<AllowList>,
    ) -> Option<Self> {
        let trust = match (allowed_edge_ids, hosts) {
            (Some(ids), _) => Trust::EdgeIds(ids),
            (None, Some(allowed)) => {
                let probe_front_end = HeaderValue::from_str(allowed.first()).ok()?;
                Trust::Hosts {
                    allowed,
                    probe_front_end,
                }
            }
            (None, None) => return None,
        };

        Some(Self {
            trust,
            health_probe_path,
        })
    }

    pub fn trust(&self) -> &Trust {
        &self.trust
    }

    /// Present only for the host scheme.
    pub fn allowed_front_end_hosts(&self) -> Option<&AllowList> {
        match &self.trust {
            Trust::Hosts { allowed, .. } => Some(allowed),
            Trust::EdgeIds(_) => None,
        }
    }

    pub fn health_probe_path(&self) -> Option<&str> {
        self.health_probe_path.as_deref()
    }

    /// Host stamped onto legitimate probes under the host scheme.
    pub fn default_probe_front_end(&self) -> Option<&HeaderValue> {
        match &self.trust {
            Trust::Hosts { probe_front_end, .. } => Some(probe_front_end),
            Trust::EdgeIds(_) => None,
        }
    }

    pub fn scheme(&self) -> TrustScheme {
        match self.trust {
            Trust::Hosts { .. } => TrustScheme::HostAllowList,
            Trust::EdgeIds(_) => TrustScheme::EdgeIdAllowList,
        }
    }

    /// Present only for the edge-id scheme.
    pub fn allowed_edge_ids(&self) -> Option<&AllowList> {
        match &self.trust {
            Trust::EdgeIds(ids) => Some(ids),
            Trust::Hosts { .. } => None,
        }
    }

    /// Operator-facing view. Edge identifiers are counted, not listed.
    pub fn summary(&self) -> SettingsSummary {
        SettingsSummary {
            trust_scheme: self.scheme().as_str(),
            allowed_front_end_hosts: self
                .allowed_front_end_hosts()
                .map(|hosts| hosts.entries().to_vec())
                .unwrap_or_default(),
            health_probe_path: self.health_probe_path.clone(),
            default_probe_front_end: self.allowed_front_end_hosts().map(|hosts| hosts.first().to_string()),
            allowed_edge_id_count: self.allowed_edge_ids().map_or(0, AllowList::len),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsSummary {
    pub trust_scheme: &'static str,
    pub allowed_front_end_hosts: Vec<String>,
    pub health_probe_path: Option<String>,
    pub default_probe_front_end: Option<String>,
    pub allowed_edge_id_count: usize,
}
