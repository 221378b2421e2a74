//! Trust strategies.
//!
//! A strategy owns everything that differs between the two schemes:
//! admission after probe classification, the host stamped onto valid
//! probes, forwarded-host adoption and the final check. Probe
//! classification itself is shared.

use axum::http::{HeaderMap, HeaderValue, Uri};

use crate::frontdoor::allow_list::AllowList;
use crate::frontdoor::decision::Rejection;
use crate::frontdoor::forwarded::{adopt_forwarded_host, Adoption};
use crate::frontdoor::host_filter::filter_host;
use crate::frontdoor::settings::{FrontDoorSettings, Trust};
use crate::frontdoor::signals::InboundSignals;

pub trait TrustStrategy: Send + Sync + std::fmt::Debug {
    /// Strategy name for logs and the admin API.
    fn name(&self) -> &'static str;

    /// Returns `Err` if the request must be refused before any rewriting.
    fn admit(&self, signals: &InboundSignals) -> Result<(), Rejection>;

    /// Host stamped as `X-Forwarded-Host` on a valid probe, if any.
    fn probe_front_end(&self) -> Option<&HeaderValue>;

    /// Turn a forwarded-host claim into the effective host.
    fn adopt(&self, headers: &mut HeaderMap) -> Adoption;

    /// Final check once adoption has run.
    fn verify(&self, headers: &HeaderMap, uri: &Uri) -> Result<(), Rejection>;
}

/// Host-based trust. Admission is unconditional: trust comes from
/// forwarded-host adoption followed by the host filter.
#[derive(Debug, Clone)]
pub struct HostAllowList {
    allowed: AllowList,
    probe_front_end: HeaderValue,
}

impl HostAllowList {
    pub fn new(allowed: AllowList, probe_front_end: HeaderValue) -> Self {
        Self {
            allowed,
            probe_front_end,
        }
    }
}

impl TrustStrategy for HostAllowList {
    fn name(&self) -> &'static str {
        "host_allow_list"
    }

    fn admit(&self, _signals: &InboundSignals) -> Result<(), Rejection> {
        Ok(())
    }

    fn probe_front_end(&self) -> Option<&HeaderValue> {
        Some(&self.probe_front_end)
    }

    fn adopt(&self, headers: &mut HeaderMap) -> Adoption {
        adopt_forwarded_host(headers, &self.allowed)
    }

    fn verify(&self, headers: &HeaderMap, uri: &Uri) -> Result<(), Rejection> {
        filter_host(headers, uri, &self.allowed)
    }
}

/// Identifier-based trust: the edge identifier header must be allow-listed.
/// Nothing host-related is checked or rewritten.
#[derive(Debug, Clone)]
pub struct EdgeIdAllowList {
    allowed: AllowList,
}

impl EdgeIdAllowList {
    pub fn new(allowed: AllowList) -> Self {
        Self { allowed }
    }
}

impl TrustStrategy for EdgeIdAllowList {
    fn name(&self) -> &'static str {
        "edge_id_allow_list"
    }

    fn admit(&self, signals: &InboundSignals) -> Result<(), Rejection> {
        match signals.edge_id.as_deref() {
            None => Err(Rejection::MissingEdgeId),
            Some(id) if self.allowed.matches(id) => Ok(()),
            Some(_) => Err(Rejection::UntrustedEdge),
        }
    }

    fn probe_front_end(&self) -> Option<&HeaderValue> {
        None
    }

    fn adopt(&self, _headers: &mut HeaderMap) -> Adoption {
        Adoption::Skipped
    }

    fn verify(&self, _headers: &HeaderMap, _uri: &Uri) -> Result<(), Rejection> {
        Ok(())
    }
}

/// Build the strategy the settings select.
pub fn from_settings(settings: &FrontDoorSettings) -> Box<dyn TrustStrategy> {
    match settings.trust() {
        Trust::Hosts {
            allowed,
            probe_front_end,
        } => Box::new(HostAllowList::new(allowed.clone(), probe_front_end.clone())),
        Trust::EdgeIds(ids) => Box::new(EdgeIdAllowList::new(ids.clone())),
    }
}
