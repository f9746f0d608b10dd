// =============================================================================
// Indicator Service REST Client
// =============================================================================
//
// One GET per indicator:
//
//   {base}/{endpoint}?symbol=BTCUSDT&window=360[&type=short|long]
//
// Success bodies are `{"values": [...], "timestamps": [...]}`; failures carry
// `{"error": "..."}` with a 4xx/5xx status.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::fetch::SeriesSource;
use crate::series::IndicatorSeries;
use crate::types::IndicatorKey;

/// Wire shape of a successful indicator response.
#[derive(Debug, Deserialize)]
struct SeriesResponse {
    #[serde(default)]
    values: Vec<f64>,
    #[serde(default)]
    timestamps: Vec<i64>,
}

/// Wire shape of an error response.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// HTTP client for the remote indicator service.
#[derive(Clone)]
pub struct IndicatorClient {
    base_url: String,
    client: reqwest::Client,
}

impl IndicatorClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a client for the service at `base_url` (trailing `/` ignored).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        debug!(base_url = %base_url, "IndicatorClient initialised");

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -------------------------------------------------------------------------
    // Request building
    // -------------------------------------------------------------------------

    /// Full URL (without query) for `key`.
    fn endpoint_url(&self, key: IndicatorKey) -> String {
        let (path, _) = key.endpoint();
        format!("{}/{}", self.base_url, path)
    }

    /// Query parameters for `key` / `symbol` / `window_minutes`.
    fn query_params(
        key: IndicatorKey,
        symbol: &str,
        window_minutes: u32,
    ) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("symbol", symbol.to_string()),
            ("window", window_minutes.to_string()),
        ];
        if let (_, Some(kind)) = key.endpoint() {
            params.push(("type", kind.to_string()));
        }
        params
    }

    // -------------------------------------------------------------------------
    // Response decoding
    // -------------------------------------------------------------------------

    /// Turn a status + body into a series, or an error describing the failure.
    fn decode(key: IndicatorKey, status: StatusCode, body: &str) -> Result<IndicatorSeries> {
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(body)
                .map(|e| e.error)
                .unwrap_or_else(|_| body.trim().to_string());
            anyhow::bail!("indicator service returned {} for {}: {}", status, key, message);
        }

        let parsed: SeriesResponse = serde_json::from_str(body)
            .with_context(|| format!("failed to parse {key} response"))?;

        Ok(IndicatorSeries::new(parsed.timestamps, parsed.values))
    }
}

#[async_trait]
impl SeriesSource for IndicatorClient {
    #[instrument(skip(self), name = "indicator::fetch")]
    async fn fetch(
        &self,
        key: IndicatorKey,
        symbol: &str,
        window_minutes: u32,
    ) -> Result<IndicatorSeries> {
        let url = self.endpoint_url(key);

        let resp = self
            .client
            .get(&url)
            .query(&Self::query_params(key, symbol, window_minutes))
            .send()
            .await
            .with_context(|| format!("GET {url} request failed"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("failed to read {key} response body"))?;

        let series = Self::decode(key, status, &body)?;
        debug!(%key, symbol, samples = series.len(), "indicator fetched");
        Ok(series)
    }
}

impl std::fmt::Debug for IndicatorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndicatorClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> IndicatorClient {
        IndicatorClient::new("http://127.0.0.1:8080/", Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn trailing_slash_is_stripped() {
        assert_eq!(client().base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn ema_variants_hit_shared_route_with_type() {
        let c = client();
        assert_eq!(c.endpoint_url(IndicatorKey::EmaLong), "http://127.0.0.1:8080/ema");
        let params = IndicatorClient::query_params(IndicatorKey::EmaLong, "BTCUSDT", 720);
        assert_eq!(
            params,
            vec![
                ("symbol", "BTCUSDT".to_string()),
                ("window", "720".to_string()),
                ("type", "long".to_string()),
            ]
        );
    }

    #[test]
    fn plain_indicators_have_no_type() {
        let c = client();
        assert_eq!(c.endpoint_url(IndicatorKey::Distance), "http://127.0.0.1:8080/distance");
        let params = IndicatorClient::query_params(IndicatorKey::Close, "ETHUSDT", 360);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn decode_success_body() {
        let body = r#"{"values": [1.5, 2.5], "timestamps": [60000, 120000]}"#;
        let s = IndicatorClient::decode(IndicatorKey::Close, StatusCode::OK, body).unwrap();
        assert_eq!(s.timestamps(), &[60000, 120000]);
        assert_eq!(s.values(), &[1.5, 2.5]);
    }

    #[test]
    fn decode_truncates_mismatched_arrays() {
        let body = r#"{"values": [1.0, 2.0, 3.0], "timestamps": [1, 2]}"#;
        let s = IndicatorClient::decode(IndicatorKey::Sma, StatusCode::OK, body).unwrap();
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn decode_missing_arrays_is_empty() {
        let s = IndicatorClient::decode(IndicatorKey::Sma, StatusCode::OK, "{}").unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn decode_error_body_surfaces_message() {
        let body = r#"{"error": "No data found for symbol"}"#;
        let err = IndicatorClient::decode(IndicatorKey::Macd, StatusCode::NOT_FOUND, body)
            .unwrap_err()
            .to_string();
        assert!(err.contains("404"), "{err}");
        assert!(err.contains("No data found for symbol"), "{err}");
    }

    #[test]
    fn decode_garbage_is_error() {
        assert!(IndicatorClient::decode(IndicatorKey::Close, StatusCode::OK, "not json").is_err());
    }
}
