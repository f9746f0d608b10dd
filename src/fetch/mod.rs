// =============================================================================
// Fetch Module
// =============================================================================
//
// The inbound side of the engine: a pluggable per-indicator data source, its
// HTTP implementation against the indicator service, and the refresh
// coordinator that turns concurrent fetches into committed store snapshots.

pub mod client;
pub mod refresh;

use anyhow::Result;
use async_trait::async_trait;

use crate::series::IndicatorSeries;
use crate::types::IndicatorKey;

pub use client::IndicatorClient;
pub use refresh::{ChartSession, RefreshOutcome};

/// Anything that can produce one indicator's samples for a symbol and window.
///
/// Implementations own timeouts and retries; the coordinator never retries.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    async fn fetch(
        &self,
        key: IndicatorKey,
        symbol: &str,
        window_minutes: u32,
    ) -> Result<IndicatorSeries>;
}
