//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;

use frontdoor_gate::config::GateConfig;
use frontdoor_gate::{HttpServer, Shutdown};

pub const FRONT_DOOR: &str = "my.front.door.net";
pub const APP_SERVICE: &str = "my.azurewebsite.net";
pub const PROBE_PATH: &str = "/HealthProbe";

/// Config with one allow-listed front door and a probe path.
pub fn gate_config() -> GateConfig {
    let mut config = GateConfig::default();
    config.front_door.allowed_front_end_hosts = vec![FRONT_DOOR.to_string()];
    config.front_door.health_probe_path = Some(PROBE_PATH.to_string());
    config
}

pub fn router(config: GateConfig) -> Router {
    HttpServer::from_config(config).unwrap().router()
}

/// Send one request through `router` and return status and body text.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8_lossy(&body).into_owned())
}

/// Start a mock upstream that answers every request with the request head
/// it received, headers lowercased, one per line.
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut head = Vec::new();
                        let mut buf = [0u8; 1024];
                        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => head.extend_from_slice(&buf[..n]),
                            }
                        }

                        let body = String::from_utf8_lossy(&head)
                            .split("\r\n")
                            .skip(1)
                            .filter(|line| !line.is_empty())
                            .map(|line| match line.split_once(':') {
                                Some((name, value)) => format!("{}: {}", name.to_ascii_lowercase(), value.trim()),
                                None => line.to_string(),
                            })
                            .collect::<Vec<_>>()
                            .join("\n");

                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// A gate (and admin API, when enabled) running on ephemeral ports.
pub struct RunningGate {
    pub addr: SocketAddr,
    pub admin_addr: Option<SocketAddr>,
    pub shutdown: Shutdown,
}

pub async fn start_gate(config: GateConfig) -> RunningGate {
    let shutdown = Shutdown::new();
    let server = HttpServer::from_config(config).unwrap();

    let admin_addr = if server.config().admin.enabled {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = server.admin_router();
        tokio::spawn(frontdoor_gate::admin::serve(router, listener, shutdown.subscribe()));
        Some(addr)
    } else {
        None
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    RunningGate {
        addr,
        admin_addr,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
