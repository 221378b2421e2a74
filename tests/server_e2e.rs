//! Gate and admin API over real sockets.

use reqwest::StatusCode;
use serde_json::Value;
use tokio::net::TcpListener;

use frontdoor_gate::config::TrustScheme;

mod common;
use common::{client, gate_config, start_echo_backend, start_gate, APP_SERVICE, FRONT_DOOR, PROBE_PATH};

#[tokio::test]
async fn test_accepted_request_reaches_upstream_with_adopted_host() {
    let backend = start_echo_backend().await;
    let mut config = gate_config();
    config.upstream.address = Some(backend.to_string());
    let gate = start_gate(config).await;

    let res = client()
        .get(format!("http://{}/orders", gate.addr))
        .header("host", APP_SERVICE)
        .header("x-forwarded-host", FRONT_DOOR)
        .send()
        .await
        .expect("gate unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    let seen = res.text().await.unwrap();
    assert!(seen.contains(&format!("host: {FRONT_DOOR}")), "upstream saw: {seen}");
    assert!(seen.contains(&format!("x-original-host: {APP_SERVICE}")), "upstream saw: {seen}");
    assert!(!seen.contains("x-forwarded-host"), "upstream saw: {seen}");
    assert!(seen.contains("x-request-id: "), "upstream saw: {seen}");

    gate.shutdown.trigger();
}

#[tokio::test]
async fn test_rejected_request_never_reaches_upstream() {
    let backend = start_echo_backend().await;
    let mut config = gate_config();
    config.upstream.address = Some(backend.to_string());
    let gate = start_gate(config).await;

    let res = client()
        .get(format!("http://{}/", gate.addr))
        .header("host", APP_SERVICE)
        .header("x-forwarded-host", "spoof.front.door.net")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(res.text().await.unwrap().is_empty());

    gate.shutdown.trigger();
}

#[tokio::test]
async fn test_probe_answered_by_gate() {
    let backend = start_echo_backend().await;
    let mut config = gate_config();
    config.upstream.address = Some(backend.to_string());
    let gate = start_gate(config).await;

    let res = client()
        .get(format!("http://{}{}", gate.addr, PROBE_PATH))
        .header("host", APP_SERVICE)
        .header("x-fd-healthprobe", "1")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "Healthy");

    gate.shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    // Reserve a port, then free it so nothing is listening there.
    let dead = TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap();

    let mut config = gate_config();
    config.upstream.address = Some(dead.to_string());
    config.timeouts.connect_secs = 1;
    let gate = start_gate(config).await;

    let res = client()
        .get(format!("http://{}/", gate.addr))
        .header("host", FRONT_DOOR)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

    gate.shutdown.trigger();
}

#[tokio::test]
async fn test_echo_reports_remote_address() {
    let gate = start_gate(gate_config()).await;

    let info: Value = client()
        .get(format!("http://{}/", gate.addr))
        .header("host", FRONT_DOOR)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(info["host"], FRONT_DOOR);
    assert!(info["remote_addr"].as_str().unwrap().starts_with("127.0.0.1:"));
    assert_eq!(info["front_door"]["trust_scheme"], "host_allow_list");

    gate.shutdown.trigger();
}

#[tokio::test]
async fn test_admin_requires_bearer_token() {
    let mut config = gate_config();
    config.admin.enabled = true;
    config.admin.api_key = "test-admin-key".to_string();
    let gate = start_gate(config).await;
    let admin = gate.admin_addr.unwrap();

    let res = client()
        .get(format!("http://{admin}/admin/status"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client()
        .get(format!("http://{admin}/admin/status"))
        .bearer_auth("wrong-key")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let status: Value = client()
        .get(format!("http://{admin}/admin/status"))
        .bearer_auth("test-admin-key")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["status"], "operational");
    assert_eq!(status["strategy"], "host_allow_list");

    gate.shutdown.trigger();
}

#[tokio::test]
async fn test_admin_config_hides_edge_ids() {
    let mut config = gate_config();
    config.front_door.trust_scheme = TrustScheme::EdgeIdAllowList;
    config.front_door.allowed_edge_ids = vec!["secret-edge-id".to_string()];
    config.admin.enabled = true;
    config.admin.api_key = "test-admin-key".to_string();
    let gate = start_gate(config).await;
    let admin = gate.admin_addr.unwrap();

    let body = client()
        .get(format!("http://{admin}/admin/config"))
        .bearer_auth("test-admin-key")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(!body.contains("secret-edge-id"));
    assert!(!body.contains("test-admin-key"));
    let view: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(view["front_door"]["trust_scheme"], "edge_id_allow_list");
    assert_eq!(view["front_door"]["allowed_edge_id_count"], 1);

    gate.shutdown.trigger();
}

#[tokio::test]
async fn test_admin_lists_captured_requests() {
    let mut config = gate_config();
    config.admin.enabled = true;
    config.admin.api_key = "test-admin-key".to_string();
    config.diagnostics.capture_capacity = 8;
    let gate = start_gate(config).await;
    let admin = gate.admin_addr.unwrap();

    let res = client()
        .get(format!("http://{}/wp-login.php", gate.addr))
        .header("host", APP_SERVICE)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let captured: Vec<Value> = client()
        .get(format!("http://{admin}/admin/requests"))
        .bearer_auth("test-admin-key")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0]["path"], "/wp-login.php");
    assert_eq!(captured[0]["status"], 400);
    assert_eq!(captured[0]["host"], APP_SERVICE);

    gate.shutdown.trigger();
}
