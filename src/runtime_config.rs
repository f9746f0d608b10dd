// =============================================================================
// Runtime Configuration — monitor settings with atomic save
// =============================================================================
//
// Where the indicator service lives, which symbols the selector offers, and
// what the chart shows before the user picks anything.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chart_view::ChartRequest;
use crate::types::IndicatorKey;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_service_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_symbols() -> Vec<String> {
    ["BTC", "ADA", "ETH", "DOGE", "XRP", "SOL", "LTC", "BNB"]
        .iter()
        .map(|base| format!("{base}USDT"))
        .collect()
}

fn default_symbol() -> String {
    "BTCUSDT".to_string()
}

fn default_window_minutes() -> u32 {
    360
}

fn default_indicators() -> Vec<IndicatorKey> {
    vec![IndicatorKey::Close]
}

fn default_request_timeout_secs() -> u64 {
    10
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration for the monitor.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Upstream -----------------------------------------------------------

    /// Base URL of the indicator service.
    #[serde(default = "default_service_base_url")]
    pub service_base_url: String,

    /// Per-request timeout for indicator fetches.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    // --- API ----------------------------------------------------------------

    /// Address the REST API listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    // --- Selection ----------------------------------------------------------

    /// Symbols offered by the selector.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Symbol charted at startup.
    #[serde(default = "default_symbol")]
    pub default_symbol: String,

    /// Look-back window (minutes) charted at startup.
    #[serde(default = "default_window_minutes")]
    pub default_window_minutes: u32,

    /// Indicators charted at startup, in rendering order.
    #[serde(default = "default_indicators")]
    pub default_indicators: Vec<IndicatorKey>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            service_base_url: default_service_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            bind_addr: default_bind_addr(),
            symbols: default_symbols(),
            default_symbol: default_symbol(),
            default_window_minutes: default_window_minutes(),
            default_indicators: default_indicators(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            service = %config.service_base_url,
            symbols = ?config.symbols,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The chart shown before any selection is made.
    pub fn initial_request(&self) -> Result<ChartRequest> {
        ChartRequest::new(
            &self.default_symbol,
            self.default_window_minutes,
            self.default_indicators.iter().copied(),
        )
        .context("invalid default chart selection in runtime config")
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.service_base_url, "http://127.0.0.1:8080");
        assert_eq!(cfg.bind_addr, "0.0.0.0:3001");
        assert_eq!(cfg.symbols.len(), 8);
        assert_eq!(cfg.symbols[0], "BTCUSDT");
        assert_eq!(cfg.symbols[7], "BNBUSDT");
        assert_eq!(cfg.default_window_minutes, 360);
        assert_eq!(cfg.default_indicators, vec![IndicatorKey::Close]);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.default_symbol, "BTCUSDT");
        assert_eq!(cfg.request_timeout_secs, 10);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "default_symbol": "ethusdt", "default_indicators": ["ema_short", "ema_long"] }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        let req = cfg.initial_request().unwrap();
        assert_eq!(req.symbol, "ETHUSDT");
        assert_eq!(req.indicators, vec![IndicatorKey::EmaShort, IndicatorKey::EmaLong]);
        assert_eq!(req.window_minutes, 360);
    }

    #[test]
    fn invalid_default_selection_is_reported() {
        let cfg = RuntimeConfig {
            default_indicators: Vec::new(),
            ..RuntimeConfig::default()
        };
        assert!(cfg.initial_request().is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!("crypto-monitor-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("runtime_config.json");

        let mut cfg = RuntimeConfig::default();
        cfg.default_window_minutes = 4320;
        cfg.save(&path).unwrap();

        let loaded = RuntimeConfig::load(&path).unwrap();
        assert_eq!(loaded.default_window_minutes, 4320);
        assert!(!path.with_extension("json.tmp").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_missing_file_is_error() {
        assert!(RuntimeConfig::load("/nonexistent/runtime_config.json").is_err());
    }
}
