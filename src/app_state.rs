// =============================================================================
// Central Application State — Crypto Monitor
// =============================================================================
//
// Ties the runtime configuration to the chart session.  Held in an
// `Arc<AppState>` by the API handlers and the background refresh tasks.
//
// Thread safety:
//   - parking_lot::RwLock for the mutable configuration.
//   - The chart session manages its own snapshot swapping internally.
// =============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::chart_view::ChartRequest;
use crate::fetch::{ChartSession, SeriesSource};
use crate::runtime_config::RuntimeConfig;

/// Central application state shared across all async tasks via `Arc<AppState>`.
pub struct AppState {
    // ── Configuration ───────────────────────────────────────────────────
    pub runtime_config: Arc<RwLock<RuntimeConfig>>,
    /// Where selection changes are persisted. `None` disables persistence.
    pub config_path: Option<PathBuf>,

    // ── Chart ───────────────────────────────────────────────────────────
    pub session: Arc<ChartSession>,

    // ── Timing ──────────────────────────────────────────────────────────
    /// Instant when the monitor was started. Used for uptime reporting.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Build state around `source`, initially showing the configured default
    /// selection.
    pub fn new(
        config: RuntimeConfig,
        source: Arc<dyn SeriesSource>,
        config_path: Option<PathBuf>,
    ) -> Result<Self> {
        let initial = config.initial_request()?;
        Ok(Self {
            runtime_config: Arc::new(RwLock::new(config)),
            config_path,
            session: Arc::new(ChartSession::new(source, initial)),
            start_time: std::time::Instant::now(),
        })
    }

    /// Start a refresh for `request` in the background.
    ///
    /// The store is reset synchronously; the returned generation identifies the
    /// cycle whose results will (unless superseded) become the next snapshot.
    pub fn spawn_refresh(&self, request: ChartRequest) -> u64 {
        let generation = self.session.begin(&request);
        let session = Arc::clone(&self.session);
        tokio::spawn(async move {
            let outcome = session.fetch_and_commit(generation, request).await;
            debug!(?outcome, "background refresh finished");
        });
        generation
    }

    /// Remember `request` as the startup selection (best-effort).
    pub fn remember_selection(&self, request: &ChartRequest) {
        let snapshot = {
            let mut config = self.runtime_config.write();
            config.default_symbol = request.symbol.clone();
            config.default_window_minutes = request.window_minutes;
            config.default_indicators = request.indicators.clone();
            config.clone()
        };

        if let Some(path) = &self.config_path {
            if let Err(e) = snapshot.save(path) {
                warn!(error = %e, "Failed to persist chart selection");
            }
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
