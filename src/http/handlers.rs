//! Request handlers behind (and beside) the gate.
//!
//! # Responsibilities
//! - Forward gated requests to the configured upstream
//! - Describe the request as the application sees it when no upstream is set
//! - Report the edge identifier for the ungated `/fdid` endpoint

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::{
        header,
        uri::{Authority, PathAndQuery, Scheme},
        HeaderMap, HeaderValue, StatusCode, Uri, Version,
    },
    response::{IntoResponse, Response},
    Json,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde::Serialize;
use serde_json::json;

use crate::frontdoor::host_filter::effective_host;
use crate::frontdoor::settings::SettingsSummary;
use crate::frontdoor::signals::{edge_id, X_ORIGINAL_HOST};
use crate::http::server::AppState;
use crate::observability::metrics;

/// Upstream the gate forwards accepted requests to.
#[derive(Debug, Clone)]
pub struct Upstream {
    authority: Authority,
    client: Client<HttpConnector, Body>,
}

impl Upstream {
    pub fn new(address: &str, connect_timeout: Duration) -> Result<Self, axum::http::uri::InvalidUri> {
        let authority = Authority::from_str(address)?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self { authority, client })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }
}

/// Forward the request, headers as rewritten by the gate, to the upstream.
/// One attempt; any transport error is a 502.
pub async fn proxy_handler(State(state): State<AppState>, request: Request) -> Response {
    let Some(upstream) = state.upstream.clone() else {
        return echo_handler(State(state), request).await.into_response();
    };

    let (mut parts, body) = request.into_parts();

    // HTTP/2 clients carry the host in the authority only. Keep it, or the
    // client would fill in the upstream address instead.
    if !parts.headers.contains_key(header::HOST) {
        if let Some(value) = parts
            .uri
            .authority()
            .and_then(|a| HeaderValue::from_str(a.as_str()).ok())
        {
            parts.headers.insert(header::HOST, value);
        }
    }

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(upstream.authority.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build upstream URI");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };
    parts.version = Version::HTTP_11;

    match upstream.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(upstream = %upstream.authority, error = %e, "Upstream request failed");
            metrics::record_upstream_error();
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

/// What the application behind the gate would see.
#[derive(Debug, Serialize)]
pub struct RequestInfo {
    pub host: Option<String>,
    pub original_host: Option<String>,
    pub method: String,
    pub scheme: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub remote_addr: Option<String>,
    pub front_door: SettingsSummary,
}

pub async fn echo_handler(State(state): State<AppState>, request: Request) -> Json<RequestInfo> {
    let headers = request.headers();
    let uri = request.uri();

    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        collected
            .entry(name.to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }

    Json(RequestInfo {
        host: effective_host(headers, uri).map(str::to_string),
        original_host: headers
            .get(X_ORIGINAL_HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        method: request.method().to_string(),
        scheme: uri.scheme_str().unwrap_or("http").to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers: collected,
        remote_addr: request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string()),
        front_door: state.gate.settings().summary(),
    })
}

/// Body of `GET /fdid`: lets operators discover their edge identifier.
pub fn fdid_response(headers: &HeaderMap) -> Json<serde_json::Value> {
    Json(json!({ "AzureFDID": edge_id(headers) }))
}
