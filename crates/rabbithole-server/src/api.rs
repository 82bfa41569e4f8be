//! HTTP API for the rabbithole service.
//!
//! Endpoints:
//!   GET  /sentence        → current sentence, text/plain, never cached
//!   POST /sentence        → propose an update (authenticated)
//!   GET  /api/projection  → full ProjectionRecord sequence, never cached
//!   POST /api/regenerate  → recompute the projection on demand
//!   POST /api/reset       → discard sentence + vectors + projection (authenticated)
//!   GET  /api/health      → liveness probe, independent of data state
//!   GET  /metrics         → Prometheus text exposition format
//!
//! Failure envelope: `{"error": <message>, "reason": <snake_case_code>}`.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tokio::sync::{mpsc, Mutex, RwLock};
use tower_http::cors::CorsLayer;
use tracing::warn;

use rabbithole_core::{LedgerError, SentenceLedger};

use crate::auth::EditTokenGuard;
use crate::metrics::OperationMetrics;
use crate::orchestrator::{RegenerateOutcome, Trajectory};

// ── Shared state ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<RwLock<SentenceLedger>>,
    pub trajectory: Arc<Mutex<Trajectory>>,
    pub jobs: mpsc::Sender<String>,
    pub auth: Arc<EditTokenGuard>,
    pub metrics: Arc<OperationMetrics>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/sentence", get(get_sentence))
        .route("/sentence", post(update_sentence))
        .route("/api/projection", get(get_projection))
        .route("/api/regenerate", post(regenerate))
        .route("/api/reset", post(reset))
        .route("/api/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn failure(status: StatusCode, reason: &str, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message, "reason": reason })),
    )
        .into_response()
}

fn unauthorized() -> Response {
    failure(
        StatusCode::UNAUTHORIZED,
        "unauthorized",
        "missing or invalid edit token",
    )
}

// ── Handlers ─────────────────────────────────────────────────────────────────

// GET /sentence
async fn get_sentence(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics.inc(&state.metrics.sentence_reads);
    let sentence = state.ledger.read().await.current().to_string();
    ([(header::CACHE_CONTROL, "no-store")], sentence)
}

// POST /sentence
#[derive(Deserialize)]
struct UpdateRequest {
    sentence: String,
}

async fn update_sentence(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<UpdateRequest>,
) -> Response {
    if !state.auth.allows(&headers) {
        state.metrics.inc(&state.metrics.updates_rejected);
        return unauthorized();
    }

    // Near-simultaneous proposals are last-write-wins under this write
    // guard; single-editor usage makes that an accepted race.
    let result = state.ledger.write().await.propose(&req.sentence);

    match result {
        Ok(accepted) => {
            state.metrics.inc(&state.metrics.updates_accepted);
            state.metrics.inc(&state.metrics.embed_jobs);
            if let Err(e) = state.jobs.send(accepted.clone()).await {
                warn!(error = %e, "embedding queue unavailable, trajectory will miss this step");
            }
            ([(header::CACHE_CONTROL, "no-store")], accepted).into_response()
        }
        Err(err @ LedgerError::Storage(_)) => {
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                err.reason_code(),
                &err.to_string(),
            )
        }
        Err(err) => {
            state.metrics.inc(&state.metrics.updates_rejected);
            failure(
                StatusCode::UNPROCESSABLE_ENTITY,
                err.reason_code(),
                &err.to_string(),
            )
        }
    }
}

// GET /api/projection
async fn get_projection(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics.inc(&state.metrics.projection_reads);
    let records = state.trajectory.lock().await.projection.all().to_vec();
    ([(header::CACHE_CONTROL, "no-store")], Json(records))
}

// POST /api/regenerate
async fn regenerate(State(state): State<AppState>) -> Response {
    state.metrics.inc(&state.metrics.regenerate_count);
    let mut traj = state.trajectory.lock().await;
    match traj.regenerate() {
        Ok(RegenerateOutcome::Empty) => {
            Json(serde_json::json!({ "status": "empty", "points": 0 })).into_response()
        }
        Ok(RegenerateOutcome::Projected(points)) => {
            Json(serde_json::json!({ "status": "ok", "points": points })).into_response()
        }
        Err(e) => failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "projection",
            &e.to_string(),
        ),
    }
}

// POST /api/reset
async fn reset(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !state.auth.allows(&headers) {
        return unauthorized();
    }
    state.metrics.inc(&state.metrics.reset_count);

    // Lock order: ledger before trajectory, matching every other path.
    let mut ledger = state.ledger.write().await;
    let mut traj = state.trajectory.lock().await;

    let mut first_error: Option<String> = None;
    if let Err(e) = ledger.reset() {
        first_error.get_or_insert(e.to_string());
    }
    if let Err(e) = traj.clear() {
        first_error.get_or_insert(e.to_string());
    }

    match first_error {
        None => Json(serde_json::json!({ "status": "ok" })).into_response(),
        Some(message) => failure(StatusCode::INTERNAL_SERVER_ERROR, "storage", &message),
    }
}

// GET /api/health
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// GET /metrics
async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let (vectors, projections) = {
        let traj = state.trajectory.lock().await;
        (traj.vectors.len(), traj.projection.all().len())
    };
    let body = state.metrics.to_prometheus(vectors, projections);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}
