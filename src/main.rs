// =============================================================================
// Crypto Monitor — Main Entry Point
// =============================================================================
//
// Fetches technical indicators per symbol/window from the indicator service,
// aligns them onto one timeline, marks crossovers, and serves the resulting
// chart snapshots to the renderer over REST.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod axis;
mod chart_view;
mod fetch;
mod runtime_config;
mod series;
mod signals;
mod timeline;
mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::fetch::IndicatorClient;
use crate::runtime_config::RuntimeConfig;

const CONFIG_PATH: &str = "runtime_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Crypto Monitor starting up");

    let mut config = RuntimeConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    if let Ok(url) = std::env::var("MONITOR_SERVICE_URL") {
        config.service_base_url = url;
    }
    if let Ok(addr) = std::env::var("MONITOR_BIND_ADDR") {
        config.bind_addr = addr;
    }
    if let Ok(syms) = std::env::var("MONITOR_SYMBOLS") {
        config.symbols = syms
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
    }

    info!(
        service = %config.service_base_url,
        symbols = ?config.symbols,
        "Configured indicator service"
    );

    // ── 2. Indicator client & shared state ───────────────────────────────
    let client = IndicatorClient::new(config.service_base_url.clone(), config.request_timeout())?;
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(
        config,
        Arc::new(client),
        Some(PathBuf::from(CONFIG_PATH)),
    )?);

    // ── 3. Initial chart load ────────────────────────────────────────────
    let initial = state.session.request();
    let generation = state.spawn_refresh(initial.clone());
    info!(
        generation,
        symbol = %initial.symbol,
        window = initial.window_minutes,
        indicators = ?initial.indicators,
        "Initial refresh issued"
    );

    // ── 4. API server ────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    let app = api::rest::router(state.clone());

    // ── 5. Run until Ctrl+C ──────────────────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            warn!("Shutdown signal received — stopping gracefully");
        })
        .await
        .context("API server failed")?;

    if let Err(e) = state.runtime_config.read().save(CONFIG_PATH) {
        error!(error = %e, "Failed to save runtime config on shutdown");
    }

    info!("Crypto Monitor shut down complete.");
    Ok(())
}
