//! Forwarded-host adoption.
//!
//! # Responsibilities
//! - Promote an allow-listed forwarded-host claim to the effective host
//! - Preserve the displaced host in `X-Original-Host`
//! - Consume the forwarded-host header so nothing later re-reads it
//!
//! # Design Decisions
//! - Adoption is a filter: a claim that misses the allow-list is dropped and
//!   the declared host is kept
//! - The header is removed whether or not it was adopted

use axum::http::{header, HeaderMap, HeaderValue};

use crate::frontdoor::allow_list::AllowList;
use crate::frontdoor::signals::{forwarded_host, X_FORWARDED_HOST, X_ORIGINAL_HOST};

/// What adoption did with the forwarded-host claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adoption {
    /// No forwarded-host header on the request.
    Absent,
    /// Claim matched and became the effective host.
    Adopted,
    /// Claim missed the allow-list (or was empty) and was discarded.
    Ignored,
    /// The trust scheme does not adopt; the header was left alone.
    Skipped,
}

/// Apply forwarded-host adoption to a request's headers.
pub fn adopt_forwarded_host(headers: &mut HeaderMap, allowed: &AllowList) -> Adoption {
    if !headers.contains_key(&X_FORWARDED_HOST) {
        return Adoption::Absent;
    }

    let claim = forwarded_host(headers);
    headers.remove(&X_FORWARDED_HOST);

    let Some(claim) = claim.filter(|c| allowed.matches(c)) else {
        return Adoption::Ignored;
    };
    let Ok(value) = HeaderValue::from_str(&claim) else {
        return Adoption::Ignored;
    };

    if let Some(original) = headers.remove(header::HOST) {
        headers.insert(X_ORIGINAL_HOST, original);
    }
    headers.insert(header::HOST, value);
    Adoption::Adopted
}
