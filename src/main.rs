use anyhow::Result;
use blame_charles::models::Config;
use blame_charles::server;
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "blame-charles")]
#[command(about = "Serve the blame-charles and generate-image adapters")]
struct CliArgs {
    /// Address to listen on (overrides BIND_ADDR).
    #[arg(long, value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// Upstream deadline in milliseconds (overrides UPSTREAM_TIMEOUT_MS).
    #[arg(long, value_name = "MS", value_parser = parse_timeout_arg)]
    timeout_ms: Option<Duration>,
}

fn parse_timeout_arg(input: &str) -> std::result::Result<Duration, String> {
    match input.parse::<u64>() {
        Ok(0) | Err(_) => Err(format!(
            "Invalid timeout '{}'. Expected a positive number of milliseconds",
            input
        )),
        Ok(ms) => Ok(Duration::from_millis(ms)),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blame_charles=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting blame-charles");

    let args = CliArgs::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(timeout) = args.timeout_ms {
        config.upstream_timeout = timeout;
    }

    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY not set; blame-charles will answer with a configuration error");
    }
    if config.imagen_api_key.is_none() {
        warn!("No Imagen API key set; generate-image will answer with a configuration error");
    }

    if let Err(e) = server::serve(&config, shutdown_signal()).await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }

    info!("Server stopped");
    Ok(())
}
