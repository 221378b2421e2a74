//! Front door gate binary.
//!
//! Loads the config, starts the gate listener (and the admin API when
//! enabled) and runs until SIGINT/SIGTERM.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use frontdoor_gate::config::{load_config, ObservabilityConfig};
use frontdoor_gate::lifecycle::signals::spawn_signal_listener;
use frontdoor_gate::observability::{logging, metrics};
use frontdoor_gate::{admin, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "frontdoor-gate")]
#[command(about = "Admit only traffic that came through a trusted front door", long_about = None)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(short, long, default_value = "frontdoor-gate.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (config, settings) = match load_config(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            logging::init_tracing(&ObservabilityConfig::default());
            tracing::error!(path = %cli.config.display(), error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };

    logging::init_tracing(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "frontdoor-gate starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        scheme = settings.scheme().as_str(),
        probe_path = settings.health_probe_path().unwrap_or("-"),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validated at load time.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, settings)?;

    let admin_task = if server.config().admin.enabled {
        let admin_listener = TcpListener::bind(&server.config().admin.bind_address).await?;
        let router = server.admin_router();
        let rx = shutdown.subscribe();
        Some(tokio::spawn(admin::serve(router, admin_listener, rx)))
    } else {
        None
    };

    let result = server.run(listener, shutdown.subscribe()).await;
    // Stop the admin API too if the gate listener failed on its own.
    shutdown.trigger();

    if let Some(task) = admin_task {
        match task.await {
            Ok(Err(e)) => tracing::error!(error = %e, "Admin API failed"),
            Err(e) => tracing::error!(error = %e, "Admin task panicked"),
            Ok(Ok(())) => {}
        }
    }

    result?;
    tracing::info!("Shutdown complete");
    Ok(())
}
