// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`.  The renderer polls `/chart` for the
// current snapshot and posts to `/chart/selection` when the user picks a
// different symbol, window or indicator set.
//
// CORS is configured permissively for development; tighten `allowed_origins`
// in production.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::app_state::AppState;
use crate::axis::FormatProfile;
use crate::chart_view::ChartRequest;
use crate::types::{parse_indicator_list, window_label, IndicatorKey, WINDOW_PRESETS};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        // ── Chart ───────────────────────────────────────────────────
        .route("/api/v1/chart", get(chart))
        .route("/api/v1/chart/selection", post(select))
        // ── Selector metadata ───────────────────────────────────────
        .route("/api/v1/indicators", get(indicators))
        .route("/api/v1/windows", get(windows))
        .route("/api/v1/symbols", get(symbols))
        // ── Formatting ──────────────────────────────────────────────
        .route("/api/v1/format", get(format_value))
        // ── Middleware & State ───────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl std::fmt::Display) -> axum::response::Response {
    let body = serde_json::json!({ "error": message.to_string() });
    (status, Json(body)).into_response()
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    generation: u64,
    samples: usize,
    uptime_secs: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        generation: state.session.current_generation(),
        samples: state.session.store().sample_count(),
        uptime_secs: state.uptime_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
    };
    Json(resp)
}

// =============================================================================
// Chart snapshot
// =============================================================================

async fn chart(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let view = state.session.view();
    Json((*view).clone())
}

// =============================================================================
// Selection
// =============================================================================

/// Partial selection; absent fields keep their current value.
#[derive(Deserialize)]
struct SelectionUpdate {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    window: Option<u32>,
    #[serde(default)]
    indicators: Option<Vec<String>>,
}

#[derive(Serialize)]
struct SelectionAccepted {
    generation: u64,
    request: ChartRequest,
}

async fn select(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SelectionUpdate>,
) -> impl IntoResponse {
    let current = state.session.request();

    let indicators = match update.indicators {
        Some(names) => match parse_indicator_list(&names.join(",")) {
            Ok(keys) => keys,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
        },
        None => current.indicators,
    };

    let request = match ChartRequest::new(
        update.symbol.as_deref().unwrap_or(&current.symbol),
        update.window.unwrap_or(current.window_minutes),
        indicators,
    ) {
        Ok(r) => r,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    let generation = state.spawn_refresh(request.clone());
    state.remember_selection(&request);

    info!(
        generation,
        symbol = %request.symbol,
        window = request.window_minutes,
        indicators = ?request.indicators,
        "Chart selection changed"
    );

    (
        StatusCode::ACCEPTED,
        Json(SelectionAccepted {
            generation,
            request,
        }),
    )
        .into_response()
}

// =============================================================================
// Selector metadata
// =============================================================================

#[derive(Serialize)]
struct IndicatorInfo {
    key: IndicatorKey,
    label: &'static str,
    color: &'static str,
}

async fn indicators() -> impl IntoResponse {
    let list: Vec<IndicatorInfo> = IndicatorKey::ALL
        .iter()
        .map(|&key| IndicatorInfo {
            key,
            label: key.label(),
            color: key.color(),
        })
        .collect();
    Json(list)
}

#[derive(Serialize)]
struct WindowInfo {
    minutes: u32,
    label: String,
}

async fn windows() -> impl IntoResponse {
    let list: Vec<WindowInfo> = WINDOW_PRESETS
        .iter()
        .map(|&minutes| WindowInfo {
            minutes,
            label: window_label(minutes),
        })
        .collect();
    Json(list)
}

async fn symbols(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.runtime_config.read().symbols.clone())
}

// =============================================================================
// Formatting
// =============================================================================

#[derive(Deserialize)]
struct FormatQuery {
    value: f64,
    #[serde(default)]
    profile: FormatProfile,
}

async fn format_value(Query(q): Query<FormatQuery>) -> impl IntoResponse {
    Json(serde_json::json!({ "formatted": q.profile.format(q.value) }))
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::SeriesSource;
    use crate::runtime_config::RuntimeConfig;
    use crate::series::IndicatorSeries;
    use anyhow::Result;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    /// Every indicator returns the same two samples.
    struct FlatSource;

    #[async_trait]
    impl SeriesSource for FlatSource {
        async fn fetch(&self, _key: IndicatorKey, _symbol: &str, _window: u32) -> Result<IndicatorSeries> {
            Ok(IndicatorSeries::from_samples([(60_000, 1.0), (120_000, 2.0)]))
        }
    }

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(RuntimeConfig::default(), Arc::new(FlatSource), None).unwrap())
    }

    async fn call(state: Arc<AppState>, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = router(state).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_generation() {
        let (status, body) = call(state(), get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["generation"], 0);
        assert_eq!(body["samples"], 0);
    }

    #[tokio::test]
    async fn initial_chart_is_loading() {
        let (status, body) = call(state(), get("/api/v1/chart")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "loading");
        assert_eq!(body["request"]["symbol"], "BTCUSDT");
        assert_eq!(body["domain"]["min"], 0.0);
        assert_eq!(body["domain"]["max"], 100.0);
    }

    #[tokio::test]
    async fn selection_refreshes_chart() {
        let state = state();
        let (status, body) = call(
            Arc::clone(&state),
            post_json(
                "/api/v1/chart/selection",
                serde_json::json!({ "symbol": "ethusdt", "indicators": ["close", "distance"] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["generation"], 1);
        assert_eq!(body["request"]["symbol"], "ETHUSDT");
        assert_eq!(body["request"]["window_minutes"], 360);

        // Wait for the background cycle to commit.
        for _ in 0..100 {
            if !state.session.view().points.is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        let (_, chart) = call(Arc::clone(&state), get("/api/v1/chart")).await;
        assert_eq!(chart["status"], "ready");
        assert_eq!(chart["zero_reference_line"], true);
        assert_eq!(chart["points"].as_array().unwrap().len(), 2);
        assert_eq!(state.runtime_config.read().default_symbol, "ETHUSDT");
    }

    #[tokio::test]
    async fn bad_selection_is_rejected() {
        let (status, body) = call(
            state(),
            post_json("/api/v1/chart/selection", serde_json::json!({ "indicators": ["rsi"] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("rsi"));

        let (status, _) = call(
            state(),
            post_json("/api/v1/chart/selection", serde_json::json!({ "window": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn metadata_endpoints() {
        let (_, inds) = call(state(), get("/api/v1/indicators")).await;
        assert_eq!(inds.as_array().unwrap().len(), IndicatorKey::COUNT);
        assert_eq!(inds[2]["key"], "ema_short");
        assert_eq!(inds[2]["label"], "EMA Short");

        let (_, wins) = call(state(), get("/api/v1/windows")).await;
        assert_eq!(wins[3]["minutes"], 4320);
        assert_eq!(wins[3]["label"], "3 days");

        let (_, syms) = call(state(), get("/api/v1/symbols")).await;
        assert_eq!(syms[0], "BTCUSDT");
    }

    #[tokio::test]
    async fn format_endpoint_uses_profile() {
        let (_, body) = call(state(), get("/api/v1/format?value=1500")).await;
        assert_eq!(body["formatted"], "1500.0");
        let (_, body) = call(state(), get("/api/v1/format?value=1500&profile=tooltip")).await;
        assert_eq!(body["formatted"], "1500.00");
        let (_, body) = call(state(), get("/api/v1/format?value=NaN&profile=tooltip")).await;
        assert_eq!(body["formatted"], "0");
    }
}
