use axum::extract::{Path, State};
use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::summary;
use crate::types::activity::Activity;
use crate::types::metrics::{Metrics, Split};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/activities/:id", get(get_activity))
        .route("/api/activities/:id/splits", get(get_splits))
        .route("/api/activities/:id/summary", get(get_summary))
}

#[derive(Serialize, Deserialize)]
pub struct ActivityResponse {
    pub activity: Activity,
    pub metrics: Metrics,
    pub point_count: usize,
}

async fn get_activity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActivityResponse>, AppError> {
    let stored = state
        .get_activity(id)
        .ok_or_else(|| AppError::NotFound(format!("Activity not found: {}", id)))?;

    Ok(Json(ActivityResponse {
        activity: stored.activity,
        metrics: stored.metrics,
        point_count: stored.points.len(),
    }))
}

async fn get_splits(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Split>>, AppError> {
    let stored = state
        .get_activity(id)
        .ok_or_else(|| AppError::NotFound(format!("Activity not found: {}", id)))?;

    Ok(Json(stored.metrics.splits))
}

#[derive(Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub metrics: Metrics,
}

async fn get_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SummaryResponse>, AppError> {
    let stored = state
        .get_activity(id)
        .ok_or_else(|| AppError::NotFound(format!("Activity not found: {}", id)))?;

    let summary = summary::render(&stored.activity, &stored.metrics);

    Ok(Json(SummaryResponse {
        summary,
        metrics: stored.metrics,
    }))
}
