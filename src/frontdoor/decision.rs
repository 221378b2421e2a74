//! Gate outcomes.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::frontdoor::probe::MalformedProbe;

/// Trust engine verdict for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Continue down the pipeline, stamping the forwarded-host claim first
    /// when a rewrite is present.
    Accept {
        forwarded_host_rewrite: Option<HeaderValue>,
    },
    /// Stop with 400.
    Reject(Rejection),
}

impl Decision {
    pub fn pass() -> Self {
        Decision::Accept {
            forwarded_host_rewrite: None,
        }
    }

    pub fn is_accept(&self) -> bool {
        matches!(self, Decision::Accept { .. })
    }
}

/// Why a request was refused.
///
/// Every variant renders as a bare `400 Bad Request`; the reason is only
/// for logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("malformed health probe: {0}")]
    MalformedProbe(#[from] MalformedProbe),

    #[error("edge identifier missing")]
    MissingEdgeId,

    #[error("edge identifier not allow-listed")]
    UntrustedEdge,

    #[error("effective host not allow-listed")]
    UntrustedHost,
}

impl Rejection {
    /// Metric/log label.
    pub fn label(&self) -> &'static str {
        match self {
            Rejection::MalformedProbe(reason) => reason.label(),
            Rejection::MissingEdgeId => "missing_edge_id",
            Rejection::UntrustedEdge => "untrusted_edge",
            Rejection::UntrustedHost => "untrusted_host",
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        StatusCode::BAD_REQUEST.into_response()
    }
}
