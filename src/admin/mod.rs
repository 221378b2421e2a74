//! Admin API.
//!
//! # Responsibilities
//! - Report gate status and the effective (redacted) configuration
//! - Expose captured requests for diagnosing rejected traffic
//!
//! # Design Decisions
//! - Separate listener, never behind the front door gate
//! - Bearer token auth on every route
//! - Edge identifiers and the API key are never returned

pub mod auth;
pub mod handlers;

use std::sync::Arc;
use std::time::Instant;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::GateConfig;
use crate::diagnostics::RequestObserver;
use crate::frontdoor::FrontDoorGate;
use crate::lifecycle::shutdown;

use self::auth::admin_auth_middleware;
use self::handlers::{get_config, get_requests, get_status};

/// State shared by admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub gate: Arc<FrontDoorGate>,
    pub observer: Arc<dyn RequestObserver>,
    pub api_key: Arc<str>,
    pub bind_address: String,
    pub upstream: Option<String>,
    pub started_at: Instant,
}

impl AdminState {
    pub fn new(gate: Arc<FrontDoorGate>, observer: Arc<dyn RequestObserver>, config: &GateConfig) -> Self {
        Self {
            gate,
            observer,
            api_key: Arc::from(config.admin.api_key.as_str()),
            bind_address: config.listener.bind_address.clone(),
            upstream: config.upstream.address.clone(),
            started_at: Instant::now(),
        }
    }
}

pub fn router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/config", get(get_config))
        .route("/admin/requests", get(get_requests))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

/// Serve the admin API until `shutdown` fires.
pub async fn serve(router: Router, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown::wait(shutdown))
        .await?;

    tracing::info!("Admin API stopped");
    Ok(())
}
