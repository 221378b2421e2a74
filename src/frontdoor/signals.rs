//! Inbound signal extraction.
//!
//! # Responsibilities
//! - Read the declared host (Host header, then URI authority)
//! - Read the forwarded-host claim and whether its header is present at all
//! - Read the health probe marker and the edge identifier
//!
//! # Design Decisions
//! - Pure extraction: nothing here accepts or rejects a request
//! - Non-UTF-8 header values are treated as absent
//! - Forwarded-host chains resolve to the right-most entry (nearest proxy)

use axum::http::{header, HeaderMap, HeaderName, Request, Uri};

/// Probe marker header set by the edge's health probing subsystem.
pub const X_FD_HEALTH_PROBE: HeaderName = HeaderName::from_static("x-fd-healthprobe");

/// Forwarded-host claim.
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// Host value displaced by forwarded-host adoption.
pub const X_ORIGINAL_HOST: HeaderName = HeaderName::from_static("x-original-host");

/// Edge identifier header.
pub const X_AZURE_FDID: HeaderName = HeaderName::from_static("x-azure-fdid");

/// Alternate spelling of the edge identifier header.
pub const X_AZUREFDID: HeaderName = HeaderName::from_static("x-azurefdid");

/// The only probe marker value that counts.
pub const PROBE_MARKER_VALUE: &str = "1";

/// Signals derived from one request. Request-scoped and immutable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InboundSignals {
    /// Host the connection declared.
    pub declared_host: Option<String>,
    /// A forwarded-host header is present (even if empty).
    pub forwarded_host_present: bool,
    /// Resolved forwarded-host value, if any.
    pub forwarded_host: Option<String>,
    /// Request path.
    pub path: String,
    /// Probe marker header equals `"1"`.
    pub probe_marked: bool,
    /// Edge identifier, if any.
    pub edge_id: Option<String>,
}

impl InboundSignals {
    /// Extract signals from a header map and request URI.
    pub fn inspect(headers: &HeaderMap, uri: &Uri) -> Self {
        Self {
            declared_host: declared_host(headers, uri),
            forwarded_host_present: headers.contains_key(&X_FORWARDED_HOST),
            forwarded_host: forwarded_host(headers),
            path: uri.path().to_string(),
            probe_marked: probe_marked(headers),
            edge_id: edge_id(headers),
        }
    }

    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self::inspect(req.headers(), req.uri())
    }
}

/// Host header, falling back to the URI authority.
pub fn declared_host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.as_str().to_string()))
}

/// Right-most non-empty entry across every forwarded-host header line.
pub fn forwarded_host(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(&X_FORWARDED_HOST)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .last()
        .map(str::to_string)
}

/// Exactly one marker value, byte-equal to `"1"`.
pub fn probe_marked(headers: &HeaderMap) -> bool {
    let mut values = headers.get_all(&X_FD_HEALTH_PROBE).iter();
    match (values.next(), values.next()) {
        (Some(value), None) => value.as_bytes() == PROBE_MARKER_VALUE.as_bytes(),
        _ => false,
    }
}

/// Edge identifier from either header spelling.
pub fn edge_id(headers: &HeaderMap) -> Option<String> {
    [&X_AZURE_FDID, &X_AZUREFDID].into_iter().find_map(|name| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    })
}
