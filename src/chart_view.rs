// =============================================================================
// Chart View — the pure store → chart pipeline
// =============================================================================
//
//   SeriesStore ──merge──▶ Vec<MergedPoint> ──crossovers──▶ markers
//                                  │
//                                  └──estimate_domain──▶ ValueDomain
//
// Every store snapshot is pushed through the whole pipeline from scratch.  The
// data volumes involved (hundreds to low thousands of rows) make incremental
// maintenance not worth its complexity.
// =============================================================================

use anyhow::{bail, Result};
use chrono::{Local, TimeZone};
use serde::Serialize;

use crate::axis::domain::DOMAIN_PADDING;
use crate::axis::{estimate_domain, format_axis_value, ValueDomain};
use crate::series::SeriesStore;
use crate::signals::{apply_crossovers, CrossoverEvent};
use crate::timeline::{merge_in, MergedPoint};
use crate::types::IndicatorKey;

// =============================================================================
// ChartRequest
// =============================================================================

/// The parameters one refresh cycle is keyed by.
///
/// Only [`ChartRequest::new`] builds one, so every instance is validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartRequest {
    pub symbol: String,
    pub window_minutes: u32,
    /// Ordered set; order is the rendering order.
    pub indicators: Vec<IndicatorKey>,
}

impl ChartRequest {
    /// Validate and normalise a request.
    ///
    /// The symbol is trimmed and upper-cased, duplicate indicators are dropped
    /// keeping the first occurrence.
    pub fn new(
        symbol: impl AsRef<str>,
        window_minutes: u32,
        indicators: impl IntoIterator<Item = IndicatorKey>,
    ) -> Result<Self> {
        let symbol = symbol.as_ref().trim().to_uppercase();
        if symbol.is_empty() {
            bail!("symbol must not be empty");
        }
        if window_minutes == 0 {
            bail!("window must be a positive number of minutes");
        }

        let mut ordered: Vec<IndicatorKey> = Vec::new();
        for key in indicators {
            if !ordered.contains(&key) {
                ordered.push(key);
            }
        }
        if ordered.is_empty() {
            bail!("at least one indicator must be requested");
        }

        Ok(Self {
            symbol,
            window_minutes,
            indicators: ordered,
        })
    }
}

// =============================================================================
// ChartView
// =============================================================================

/// What the renderer should show for the current snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartStatus {
    /// No rows yet. Data is in flight or simply not there; not an error.
    Loading,
    /// At least one row to plot.
    Ready,
    /// No rows because every requested indicator failed to load.
    Error,
}

/// A fully derived chart snapshot. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct ChartView {
    pub request: ChartRequest,
    /// Refresh cycle that produced this view.
    pub generation: u64,
    pub status: ChartStatus,
    pub points: Vec<MergedPoint>,
    pub crossovers: Vec<CrossoverEvent>,
    pub domain: ValueDomain,
    /// `[min, max]` rendered with the axis profile.
    pub axis_labels: [String; 2],
    /// Indicators whose fetch failed in this cycle.
    pub failed: Vec<IndicatorKey>,
    /// Draw a dashed y = 0 line (the distance metric oscillates around zero).
    pub zero_reference_line: bool,
}

impl ChartView {
    /// Empty view published while a refresh is in flight.
    pub fn loading(request: ChartRequest, generation: u64) -> Self {
        Self::build_in(request, generation, &SeriesStore::default(), Vec::new(), &Local)
    }

    /// Run the pipeline over `store`, labelling rows in local time.
    pub fn build(
        request: ChartRequest,
        generation: u64,
        store: &SeriesStore,
        failed: Vec<IndicatorKey>,
    ) -> Self {
        Self::build_in(request, generation, store, failed, &Local)
    }

    /// Run the pipeline with display labels rendered in `tz`.
    pub fn build_in<Tz>(
        request: ChartRequest,
        generation: u64,
        store: &SeriesStore,
        failed: Vec<IndicatorKey>,
        tz: &Tz,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let mut points = merge_in(store, &request.indicators, tz);
        let crossovers = apply_crossovers(&mut points);
        let domain = estimate_domain(&points, &request.indicators);
        let domain = domain.with_min_margin(flat_margin(domain.min));

        let status = if !points.is_empty() {
            ChartStatus::Ready
        } else if !failed.is_empty() && failed.len() == request.indicators.len() {
            ChartStatus::Error
        } else {
            ChartStatus::Loading
        };

        Self {
            zero_reference_line: request.indicators.contains(&IndicatorKey::Distance),
            axis_labels: [format_axis_value(domain.min), format_axis_value(domain.max)],
            request,
            generation,
            status,
            points,
            crossovers,
            domain,
            failed,
        }
    }
}

/// Visual margin for a zero-width domain around `value`.
fn flat_margin(value: f64) -> f64 {
    if value == 0.0 {
        1.0
    } else {
        value.abs() * DOMAIN_PADDING
    }
}
