use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Management CLI for the front door gate", long_about = None)]
struct Cli {
    /// Admin API base URL.
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    /// Admin API key.
    #[arg(short, long, env = "FRONTDOOR_ADMIN_KEY", default_value = "")]
    key: String,

    /// Gate base URL, used by `fdid` and `probe`.
    #[arg(short, long, default_value = "http://localhost:8080")]
    gate: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gate status
    Status,
    /// Show the effective front door configuration
    Config,
    /// List recently captured requests
    Requests,
    /// Ask the gate which edge identifier it sees
    Fdid,
    /// Send a request shaped like an edge health probe
    Probe {
        /// Path to request; the gate's configured health path answers 200.
        #[arg(short, long)]
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Config => {
            let res = client.get(format!("{}/admin/config", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Requests => {
            let res = client.get(format!("{}/admin/requests", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Fdid => {
            let res = client.get(format!("{}/fdid", cli.gate)).send().await?;
            print_response(res).await?;
        }
        Commands::Probe { path } => {
            let res = client.get(format!("{}{}", cli.gate, path))
                .header("X-FD-HealthProbe", "1")
                .send()
                .await?;
            let status = res.status();
            println!("{}", status);
            println!("{}", res.text().await?);
            if !status.is_success() {
                return Err(format!("gate returned status {status}").into());
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gate returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Err(format!("gate returned status {status}").into());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
