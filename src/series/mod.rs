// =============================================================================
// Series Store
// =============================================================================
//
// Raw per-indicator samples exactly as the remote service delivered them.
// A store is an immutable snapshot: refreshes build a new one and swap it in.

pub mod store;

pub use store::{IndicatorSeries, SeriesStore};
