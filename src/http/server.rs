//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the gate stages as middleware
//! - Wire up ambient layers (request ID, tracing, timeout, body limit)
//! - Answer `GET /fdid` ahead of the gate when enabled
//! - Bind the server to a listener and stop on the shutdown broadcast
//!
//! # Layer Order (outermost first)
//! ```text
//! request id → trace → body limit → timeout → capture → fdid echo header
//!     → fdid endpoint → trust gate → forwarded host → host filter
//!     → health probe → handler
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    middleware::{from_fn, from_fn_with_state},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::Span;

use crate::admin::{self, AdminState};
use crate::config::{validate_config, ConfigError, GateConfig};
use crate::diagnostics::{observer_from_config, RequestObserver};
use crate::frontdoor::{FrontDoorGate, FrontDoorSettings};
use crate::http::handlers::{proxy_handler, Upstream};
use crate::http::middleware::{
    capture_middleware, edge_id_echo_middleware, fdid_endpoint_middleware, forwarded_host_middleware,
    health_probe_middleware, host_filter_middleware, trust_gate_middleware,
};
use crate::lifecycle::shutdown;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<FrontDoorGate>,
    pub observer: Arc<dyn RequestObserver>,
    pub upstream: Option<Upstream>,
}

/// HTTP server for the front door gate.
pub struct HttpServer {
    config: GateConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a server from a config and the settings validated from it.
    pub fn new(config: GateConfig, settings: FrontDoorSettings) -> Result<Self, ConfigError> {
        let upstream = match config.upstream.address.as_deref() {
            Some(address) => Some(Upstream::new(
                address,
                Duration::from_secs(config.timeouts.connect_secs),
            )?),
            None => None,
        };

        let state = AppState {
            gate: Arc::new(FrontDoorGate::new(settings)),
            observer: observer_from_config(&config.diagnostics),
            upstream,
        };

        Ok(Self { config, state })
    }

    /// Validate `config` and create a server from it.
    pub fn from_config(config: GateConfig) -> Result<Self, ConfigError> {
        let settings = validate_config(&config).map_err(ConfigError::Validation)?;
        Self::new(config, settings)
    }

    /// Replace the request observer chosen by configuration.
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.state.observer = observer;
        self
    }

    /// The gated application router.
    pub fn router(&self) -> Router {
        build_router(&self.config, self.state.clone())
    }

    /// The admin API router, sharing the gate and observer with the main router.
    pub fn admin_router(&self) -> Router {
        admin::router(AdminState::new(
            self.state.gate.clone(),
            self.state.observer.clone(),
            &self.config,
        ))
    }

    pub fn gate(&self) -> &FrontDoorGate {
        &self.state.gate
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        let settings = self.state.gate.settings();
        tracing::info!(
            address = %addr,
            scheme = settings.scheme().as_str(),
            allowed_hosts = settings.allowed_front_end_hosts().map_or(0, |hosts| hosts.len()),
            upstream = ?self.state.upstream.as_ref().map(|u| u.authority().to_string()),
            "Front door gate listening"
        );

        let app = self.router().into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("Front door gate stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }
}

/// Request span: request id and method only, never headers or paths.
fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
    )
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
fn build_router(config: &GateConfig, state: AppState) -> Router {
    let gate = state.gate.clone();
    let observer = state.observer.clone();

    // Layers wrap in reverse: the last one added runs first.
    let mut router = Router::new()
        .route("/", any(proxy_handler))
        .route("/{*path}", any(proxy_handler))
        .layer(from_fn_with_state(gate.clone(), health_probe_middleware))
        .layer(from_fn_with_state(gate.clone(), host_filter_middleware))
        .layer(from_fn_with_state(gate.clone(), forwarded_host_middleware))
        .layer(from_fn_with_state(gate, trust_gate_middleware))
        .with_state(state);

    if config.diagnostics.echo_edge_id {
        router = router
            .layer(from_fn(fdid_endpoint_middleware))
            .layer(from_fn(edge_id_echo_middleware));
    }

    router
        .layer(from_fn_with_state(observer, capture_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
        )
}
