// =============================================================================
// Chart Session — refresh coordination with a staleness guard
// =============================================================================
//
// One refresh cycle per request change:
//
//   1. bump the generation and, under the same lock, reset the store to empty
//      series for the new key set (old data is never shown for a new request)
//   2. fetch every indicator concurrently, tolerating individual failures
//   3. recompute the chart view from the new store
//   4. commit only if no newer cycle has started in the meantime
//
// Snapshots are `Arc`s swapped wholesale; readers never observe a half-built
// store and the lock is never held across an await point.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::future::join_all;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::chart_view::{ChartRequest, ChartView};
use crate::fetch::SeriesSource;
use crate::series::SeriesStore;
use crate::types::IndicatorKey;

/// Result of one refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// The cycle's data is now the current snapshot.
    Committed {
        generation: u64,
        loaded: Vec<IndicatorKey>,
        failed: Vec<IndicatorKey>,
    },
    /// A newer cycle started first; this cycle's data was dropped.
    Superseded { generation: u64, current: u64 },
}

struct Snapshot {
    store: Arc<SeriesStore>,
    view: Arc<ChartView>,
}

/// Owns the current store/view snapshot for one chart and refreshes it from a
/// [`SeriesSource`].
pub struct ChartSession {
    source: Arc<dyn SeriesSource>,
    generation: AtomicU64,
    current: RwLock<Snapshot>,
}

impl ChartSession {
    /// Start a session showing `request` as loading, generation 0.
    pub fn new(source: Arc<dyn SeriesSource>, request: ChartRequest) -> Self {
        let store = SeriesStore::empty_for(&request.indicators);
        Self {
            source,
            generation: AtomicU64::new(0),
            current: RwLock::new(Snapshot {
                store: Arc::new(store),
                view: Arc::new(ChartView::loading(request, 0)),
            }),
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn view(&self) -> Arc<ChartView> {
        Arc::clone(&self.current.read().view)
    }

    pub fn store(&self) -> Arc<SeriesStore> {
        Arc::clone(&self.current.read().store)
    }

    pub fn request(&self) -> ChartRequest {
        self.current.read().view.request.clone()
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    // ── Refresh cycle ───────────────────────────────────────────────────

    /// Open a new cycle for `request` and publish an empty loading snapshot.
    ///
    /// Returns the cycle's generation.
    pub fn begin(&self, request: &ChartRequest) -> u64 {
        let mut current = self.current.write();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *current = Snapshot {
            store: Arc::new(SeriesStore::empty_for(&request.indicators)),
            view: Arc::new(ChartView::loading(request.clone(), generation)),
        };
        debug!(
            generation,
            symbol = %request.symbol,
            window = request.window_minutes,
            "refresh cycle started"
        );
        generation
    }

    /// Run a full refresh cycle for `request`.
    pub async fn refresh(&self, request: ChartRequest) -> RefreshOutcome {
        let generation = self.begin(&request);
        self.fetch_and_commit(generation, request).await
    }

    /// Fetch every indicator of `request` and commit under `generation`.
    ///
    /// Split from [`Self::refresh`] so callers can learn the generation
    /// synchronously and run the fetches in a background task.
    pub async fn fetch_and_commit(&self, generation: u64, request: ChartRequest) -> RefreshOutcome {
        let symbol = request.symbol.as_str();
        let window = request.window_minutes;

        let fetches = request.indicators.iter().map(|&key| {
            let fut = self.source.fetch(key, symbol, window);
            async move { (key, fut.await) }
        });
        let results = join_all(fetches).await;

        let mut store = SeriesStore::empty_for(&request.indicators);
        let mut loaded = Vec::new();
        let mut failed = Vec::new();
        for (key, result) in results {
            match result {
                Ok(series) => {
                    store.insert(key, series);
                    loaded.push(key);
                }
                Err(e) => {
                    warn!(
                        indicator = %key,
                        symbol = %request.symbol,
                        window,
                        error = %e,
                        "indicator fetch failed, omitting from this refresh"
                    );
                    failed.push(key);
                }
            }
        }

        // The pipeline is pure; build outside the lock.
        let view = ChartView::build(request, generation, &store, failed.clone());

        let mut current = self.current.write();
        let latest = self.generation.load(Ordering::SeqCst);
        if latest != generation {
            debug!(generation, current = latest, "discarding superseded refresh results");
            return RefreshOutcome::Superseded {
                generation,
                current: latest,
            };
        }

        info!(
            generation,
            symbol = %view.request.symbol,
            window,
            points = view.points.len(),
            crossovers = view.crossovers.len(),
            failed = failed.len(),
            "chart snapshot committed"
        );
        *current = Snapshot {
            store: Arc::new(store),
            view: Arc::new(view),
        };

        RefreshOutcome::Committed {
            generation,
            loaded,
            failed,
        }
    }
}
