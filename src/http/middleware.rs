//! Gate middleware.
//!
//! Each stage of the front door gate is its own layer so the host filter
//! stays an independent check:
//!
//! ```text
//! [fdid endpoint] → trust_gate → forwarded_host → host_filter → health_probe → handler
//! ```
//!
//! Under the edge-id scheme `forwarded_host` and `host_filter` pass through.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::validation::FDID_ECHO_PATH;
use crate::diagnostics::{CapturedRequest, RequestObserver};
use crate::frontdoor::signals::edge_id;
use crate::frontdoor::{FrontDoorGate, Rejection};
use crate::http::handlers::fdid_response;
use crate::observability::metrics;

/// Response header mirroring the request's edge identifier.
pub const X_RESPONSE_AZURE_FDID: HeaderName = HeaderName::from_static("x-response-azure-fdid");

fn reject(stage: &'static str, rejection: Rejection) -> Response {
    tracing::warn!(stage, reason = rejection.label(), "Request rejected");
    metrics::record_rejected(&rejection);
    rejection.into_response()
}

/// Probe classification, strategy admission and probe rewrite.
pub async fn trust_gate_middleware(
    State(gate): State<Arc<FrontDoorGate>>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    match gate.screen(&mut parts.headers, &parts.uri) {
        Ok(()) => next.run(Request::from_parts(parts, body)).await,
        Err(rejection) => reject("trust_gate", rejection),
    }
}

/// Forwarded-host adoption. Never rejects.
pub async fn forwarded_host_middleware(
    State(gate): State<Arc<FrontDoorGate>>,
    mut request: Request,
    next: Next,
) -> Response {
    let adoption = gate.adopt(request.headers_mut());
    tracing::trace!(?adoption, "Forwarded host processed");
    next.run(request).await
}

/// Final effective-host allow-list check.
pub async fn host_filter_middleware(
    State(gate): State<Arc<FrontDoorGate>>,
    request: Request,
    next: Next,
) -> Response {
    match gate.filter(request.headers(), request.uri()) {
        Ok(()) => {
            metrics::record_accepted();
            next.run(request).await
        }
        Err(rejection) => reject("host_filter", rejection),
    }
}

/// Answers the configured probe path once the request is past the gate.
pub async fn health_probe_middleware(
    State(gate): State<Arc<FrontDoorGate>>,
    request: Request,
    next: Next,
) -> Response {
    let is_probe_path = gate
        .settings()
        .health_probe_path()
        .is_some_and(|path| request.uri().path().eq_ignore_ascii_case(path));

    if is_probe_path {
        return (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], "Healthy").into_response();
    }
    next.run(request).await
}

/// Answers `GET /fdid` (any case) ahead of the gate. Every other method or
/// path goes on to the gate.
pub async fn fdid_endpoint_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::GET && request.uri().path().eq_ignore_ascii_case(FDID_ECHO_PATH) {
        return fdid_response(request.headers()).into_response();
    }
    next.run(request).await
}

/// Mirror the edge identifier into `X-Response-Azure-FDID` on every response.
pub async fn edge_id_echo_middleware(request: Request, next: Next) -> Response {
    let echoed = edge_id(request.headers()).and_then(|id| HeaderValue::from_str(&id).ok());
    let mut response = next.run(request).await;
    if let Some(value) = echoed {
        response.headers_mut().insert(X_RESPONSE_AZURE_FDID, value);
    }
    response
}

/// Record the raw request before gating and its final status after.
pub async fn capture_middleware(
    State(observer): State<Arc<dyn RequestObserver>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let entry = observer
        .enabled()
        .then(|| CapturedRequest::new(request.method(), request.uri(), request.headers()));

    let response = next.run(request).await;
    let status = response.status().as_u16();
    metrics::record_request(method.as_str(), status, start);

    if let Some(mut entry) = entry {
        entry.status = status;
        observer.observe(entry);
    }
    response
}
