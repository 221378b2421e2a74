//! Final host allow-list enforcement.
//!
//! Runs after every rewrite and adoption step and checks the host the
//! application will actually see. Independent of the trust engine: an
//! accepted request with an unexpected host is still refused here.

use axum::http::{header, HeaderMap, Uri};

use crate::frontdoor::allow_list::AllowList;
use crate::frontdoor::decision::Rejection;

/// The host the application will treat as authoritative.
///
/// `None` when the request has no usable host, or more than one `Host` header.
pub fn effective_host<'a>(headers: &'a HeaderMap, uri: &'a Uri) -> Option<&'a str> {
    let mut hosts = headers.get_all(header::HOST).iter();
    match (hosts.next(), hosts.next()) {
        (Some(_), Some(_)) => None,
        (Some(host), None) => host.to_str().ok().map(str::trim).filter(|h| !h.is_empty()),
        (None, _) => uri.authority().map(|a| a.as_str()),
    }
}

/// Refuse any request whose effective host is not allow-listed. Empty hosts
/// are never allowed.
pub fn filter_host(headers: &HeaderMap, uri: &Uri, allowed: &AllowList) -> Result<(), Rejection> {
    match effective_host(headers, uri) {
        Some(host) if allowed.matches(host) => Ok(()),
        _ => Err(Rejection::UntrustedHost),
    }
}
