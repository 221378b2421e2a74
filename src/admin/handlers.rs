use axum::{extract::State, Json};
use serde::Serialize;

use crate::admin::AdminState;
use crate::diagnostics::CapturedRequest;
use crate::frontdoor::settings::SettingsSummary;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub trust_scheme: &'static str,
    pub strategy: &'static str,
    pub uptime_secs: u64,
    pub capture_enabled: bool,
}

#[derive(Serialize)]
pub struct ConfigView {
    pub bind_address: String,
    pub upstream: Option<String>,
    pub front_door: SettingsSummary,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        trust_scheme: state.gate.settings().scheme().as_str(),
        strategy: state.gate.engine().strategy_name(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        capture_enabled: state.observer.enabled(),
    })
}

pub async fn get_config(State(state): State<AdminState>) -> Json<ConfigView> {
    Json(ConfigView {
        bind_address: state.bind_address.clone(),
        upstream: state.upstream.clone(),
        front_door: state.gate.settings().summary(),
    })
}

/// Captured requests, oldest first.
pub async fn get_requests(State(state): State<AdminState>) -> Json<Vec<CapturedRequest>> {
    Json(state.observer.snapshot())
}
