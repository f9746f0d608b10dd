// =============================================================================
// Timeline Merger
// =============================================================================
//
// merged = for t in sorted(union(timestamps of requested keys)):
//              row(t) with value[k] = series[k] sampled at exactly t
//
// Display labels are derived from the timestamp but never used as keys: two
// days that share an `HH:MM` stay two rows.
// =============================================================================

use std::collections::{BTreeSet, HashMap};

use chrono::{Local, TimeZone};

use crate::series::SeriesStore;
use crate::timeline::point::MergedPoint;
use crate::types::IndicatorKey;

/// Label used when a timestamp is outside chrono's representable range.
const UNREPRESENTABLE_TIME: &str = "--:--";

/// Merge the requested indicators of `store` onto one timeline, labelling rows
/// in the host's local time zone.
pub fn merge(store: &SeriesStore, keys: &[IndicatorKey]) -> Vec<MergedPoint> {
    merge_in(store, keys, &Local)
}

/// Merge with display labels rendered in `tz`.
///
/// Keys missing from `store`, or present with zero samples, contribute nothing.
/// `keys` order is the rendering order and is otherwise irrelevant to the
/// result.
pub fn merge_in<Tz>(store: &SeriesStore, keys: &[IndicatorKey], tz: &Tz) -> Vec<MergedPoint>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    // Exact-match lookup tables, first sample wins on repeated timestamps.
    let mut lookups: Vec<(IndicatorKey, HashMap<i64, f64>)> = Vec::with_capacity(keys.len());
    let mut timeline: BTreeSet<i64> = BTreeSet::new();

    for &key in keys {
        let Some(series) = store.get(key).filter(|s| !s.is_empty()) else {
            continue;
        };
        let mut table = HashMap::with_capacity(series.len());
        for (ts, value) in series.samples() {
            table.entry(ts).or_insert(value);
            timeline.insert(ts);
        }
        lookups.push((key, table));
    }

    timeline
        .into_iter()
        .map(|ts| {
            let mut point = MergedPoint::new(ts, display_time(ts, tz));
            for (key, table) in &lookups {
                if let Some(&value) = table.get(&ts) {
                    point.values.set(*key, value);
                }
            }
            point
        })
        .collect()
}

/// `HH:MM` label of `timestamp_ms` in `tz`.
pub fn display_time<Tz>(timestamp_ms: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match tz.timestamp_millis_opt(timestamp_ms).single() {
        Some(dt) => dt.format("%H:%M").to_string(),
        None => UNREPRESENTABLE_TIME.to_string(),
    }
}
