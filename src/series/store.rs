use std::collections::BTreeMap;

use tracing::warn;

use crate::types::IndicatorKey;

// ---------------------------------------------------------------------------
// IndicatorSeries
// ---------------------------------------------------------------------------

/// One indicator's samples. `timestamps[i]` (epoch ms) pairs with `values[i]`.
///
/// Timestamps are kept in delivery order; nothing downstream may assume they
/// are sorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSeries {
    timestamps: Vec<i64>,
    values: Vec<f64>,
}

impl IndicatorSeries {
    /// Build a series from parallel arrays.
    ///
    /// Mismatched lengths are truncated to the shorter array rather than
    /// rejected, so one malformed response cannot sink a whole refresh.
    pub fn new(mut timestamps: Vec<i64>, mut values: Vec<f64>) -> Self {
        if timestamps.len() != values.len() {
            let keep = timestamps.len().min(values.len());
            warn!(
                timestamps = timestamps.len(),
                values = values.len(),
                keep,
                "series length mismatch, truncating to shorter"
            );
            timestamps.truncate(keep);
            values.truncate(keep);
        }
        Self { timestamps, values }
    }

    /// Build a series from `(timestamp, value)` pairs.
    pub fn from_samples(samples: impl IntoIterator<Item = (i64, f64)>) -> Self {
        let (timestamps, values) = samples.into_iter().unzip();
        Self { timestamps, values }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate `(timestamp, value)` pairs in delivery order.
    pub fn samples(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.values.iter().copied())
    }

    /// Exact-match lookup. When a timestamp repeats, the first sample wins.
    pub fn value_at(&self, timestamp: i64) -> Option<f64> {
        self.timestamps
            .iter()
            .position(|&t| t == timestamp)
            .and_then(|i| self.values.get(i).copied())
    }
}

// ---------------------------------------------------------------------------
// SeriesStore
// ---------------------------------------------------------------------------

/// Most recently fetched series per requested indicator.
///
/// The key set is exactly the requested indicator set. A key with an empty
/// series means "requested, nothing loaded (yet)".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesStore {
    series: BTreeMap<IndicatorKey, IndicatorSeries>,
}

impl SeriesStore {
    /// A store holding an empty series for every key in `keys`.
    pub fn empty_for(keys: &[IndicatorKey]) -> Self {
        Self {
            series: keys
                .iter()
                .map(|&k| (k, IndicatorSeries::default()))
                .collect(),
        }
    }

    /// Insert or replace the series for `key`.
    pub fn insert(&mut self, key: IndicatorKey, series: IndicatorSeries) {
        self.series.insert(key, series);
    }

    pub fn get(&self, key: IndicatorKey) -> Option<&IndicatorSeries> {
        self.series.get(&key)
    }

    pub fn contains(&self, key: IndicatorKey) -> bool {
        self.series.contains_key(&key)
    }

    /// True when no key holds any samples.
    pub fn is_empty(&self) -> bool {
        self.series.values().all(IndicatorSeries::is_empty)
    }

    /// Total number of samples across all keys.
    pub fn sample_count(&self) -> usize {
        self.series.values().map(IndicatorSeries::len).sum()
    }
}

impl FromIterator<(IndicatorKey, IndicatorSeries)> for SeriesStore {
    fn from_iter<I: IntoIterator<Item = (IndicatorKey, IndicatorSeries)>>(iter: I) -> Self {
        Self {
            series: iter.into_iter().collect(),
        }
    }
}
