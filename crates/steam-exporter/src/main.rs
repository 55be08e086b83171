//! steam-exporter: Prometheus exporter for one Steam account's library.
//!
//! Every scrape of `/metrics` fetches `IPlayerService/GetOwnedGames` and
//! republishes game count, per-platform playtime and last-played time as
//! gauges.
//!
//! # Usage
//!
//! ```text
//! STEAM_WEB_API_KEY=... STEAM_ID64=7656119... steam-exporter --port 8080
//! ```
//!
//! A `.env` file in the working directory is loaded before flags are parsed.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use steam_exporter_api::{ApiState, build_router};
use steam_metrics::{SteamCollector, SteamCredentials, SteamMetrics};
use steam_webapi::SteamClient;
use tracing::{debug, info, warn};

const DEFAULT_LOG_FILTER: &str = "info,steam_exporter=debug,steam_metrics=debug,steam_webapi=debug";

#[derive(Debug, Parser)]
#[command(name = "steam-exporter", about = "Prometheus exporter for Steam owned games")]
struct Cli {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value = "8080")]
    port: u16,

    /// Steam Web API key.
    #[arg(long, env = "STEAM_WEB_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// 64-bit Steam ID of the exported account.
    #[arg(long, env = "STEAM_ID64")]
    steam_id: Option<String>,

    /// Only export these app ids (comma-separated).
    #[arg(long, env = "STEAM_APP_IDS", value_delimiter = ',')]
    app_ids: Vec<u32>,

    /// Base URL of the Steam Web API.
    #[arg(long, env = "STEAM_API_BASE_URL", default_value = steam_webapi::DEFAULT_BASE_URL)]
    api_base_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load before tracing so RUST_LOG from the file applies.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded environment file"),
        Err(e) if e.not_found() => debug!("no .env file found"),
        Err(e) => warn!(error = %e, "failed to load .env file"),
    }

    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // ── Registry ───────────────────────────────────────────────

    let metrics = Arc::new(SteamMetrics::new().context("failed to register steam metrics")?);

    // ── Collector ──────────────────────────────────────────────

    let credentials = SteamCredentials::new(cli.api_key, cli.steam_id);
    if !credentials.is_configured() {
        warn!("STEAM_WEB_API_KEY or STEAM_ID64 not set, scrapes will not include steam series");
    }

    let client = SteamClient::with_base_url(cli.api_base_url)
        .context("failed to build steam web api client")?;
    info!(base_url = %client.base_url(), app_ids = ?cli.app_ids, "steam web api client initialized");

    let collector = SteamCollector::new(Arc::new(client), metrics.clone(), credentials)
        .with_app_ids_filter(cli.app_ids);

    // ── HTTP server ────────────────────────────────────────────

    let router = build_router(ApiState::new(Arc::new(collector), metrics));
    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Starting Steam exporter");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Steam exporter stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
