//! HTTP routes and handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use moodstream_core::{AggregateStats, ModelTier, RawItem, ScoredItem, SentimentLabel, StoredItem};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::state::AppState;
use crate::store::ItemFilter;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/api/sentiment/analyze", post(analyze))
        .route("/api/items/ingest", post(ingest))
        .route("/api/items", get(list_items))
        .route("/api/items/stats", get(item_stats))
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    text: String,
}

/// Score a single text on demand
async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Json<ScoredItem> {
    metrics::counter!("moodstream_requests_total", "route" => "analyze").increment(1);
    let item = state.cascade.score(&req.text).await;
    debug!(
        label = %item.label,
        tier = %item.model_tier.as_str(),
        degraded = item.is_degraded(),
        "Analyzed text"
    );
    Json(item)
}

#[derive(Debug, Deserialize)]
struct IngestRequest {
    topic: String,
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IngestResponse {
    topic: String,
    received: usize,
    stored: usize,
    model_tier: Option<ModelTier>,
}

/// Score and store a batch of raw items under a topic
async fn ingest(
    State(state): State<AppState>,
    Json(req): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, AppError> {
    metrics::counter!("moodstream_requests_total", "route" => "ingest").increment(1);

    let topic = req.topic.trim().to_string();
    if topic.is_empty() {
        return Err(AppError::InvalidRequest("topic must not be empty".to_string()));
    }

    let received = req.items.len();
    let start = Instant::now();

    // Ids stay claimed until the scored items are stored, so concurrent
    // ingests of the same ids score each one once.
    let (fresh, claim) = state.store.claim(req.items);

    let texts: Vec<&str> = fresh.iter().map(|item| item.text.as_str()).collect();
    let scored = state.cascade.score_batch(texts.as_slice()).await;

    let items: Vec<StoredItem> = fresh
        .into_iter()
        .zip(scored)
        .map(|(raw, scored)| StoredItem::new(raw, topic.as_str(), scored))
        .collect();
    let stored = state.store.insert_new(items);
    drop(claim);

    info!(
        topic = %topic,
        received,
        stored = stored.len(),
        store_size = state.store.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Ingested items"
    );

    Ok(Json(IngestResponse {
        topic,
        received,
        stored: stored.len(),
        model_tier: stored.first().map(|item| item.scored.model_tier.clone()),
    }))
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    topic: Option<String>,
    search: Option<String>,
    sentiment: Option<String>,
    limit: Option<usize>,
}

/// Stored items, newest first
async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<StoredItem>>, AppError> {
    let filter = ItemFilter {
        topic: non_empty(query.topic),
        search: non_empty(query.search),
        sentiment: parse_sentiment(query.sentiment.as_deref())?,
        limit: Some(state.config.list_limit(query.limit)),
    };

    Ok(Json(state.store.query(&filter)))
}

#[derive(Debug, Default, Deserialize)]
struct StatsQuery {
    topic: Option<String>,
}

/// Aggregate statistics over stored items
async fn item_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Json<AggregateStats> {
    let filter = ItemFilter {
        topic: non_empty(query.topic),
        ..Default::default()
    };

    Json(state.store.stats(&filter))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `None` or `all` means no filter
fn parse_sentiment(value: Option<&str>) -> Result<Option<SentimentLabel>, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.eq_ignore_ascii_case("all") => Ok(None),
        Some(v) => v
            .to_ascii_lowercase()
            .parse()
            .map(Some)
            .map_err(|e: moodstream_core::Error| AppError::InvalidRequest(e.to_string())),
    }
}

async fn fallback() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Error handling
#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("{0}")]
    InvalidRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request_error"),
        };

        let body = json!({
            "error": {
                "message": self.to_string(),
                "type": kind,
            }
        });

        (status, Json(body)).into_response()
    }
}
