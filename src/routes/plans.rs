use axum::extract::{Path, Query, State};
use axum::{
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::types::activity::{Activity, ActivityType, TrainingEntry};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/plans", get(list_entries).post(create_entry))
        .route("/api/activities/:id/match/:entry_id", post(confirm_match))
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateEntryRequest {
    pub date: NaiveDate,
    pub title: String,
    pub activity_type: ActivityType,
}

async fn create_entry(
    State(state): State<AppState>,
    Json(request): Json<CreateEntryRequest>,
) -> Result<Json<TrainingEntry>, AppError> {
    let entry = TrainingEntry {
        id: Uuid::new_v4(),
        date: request.date,
        title: request.title,
        activity_type: request.activity_type,
        completed: false,
        activity_id: None,
    };

    tracing::info!("Created training entry {} for {}", entry.id, entry.date);

    state.insert_entry(entry.clone());
    Ok(Json(entry))
}

#[derive(Deserialize)]
pub struct ListEntriesQuery {
    pub date: NaiveDate,
}

async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<ListEntriesQuery>,
) -> Json<Vec<TrainingEntry>> {
    Json(state.entries_for_day(query.date))
}

#[derive(Serialize, Deserialize)]
pub struct MatchResponse {
    pub activity: Activity,
    pub entry: TrainingEntry,
}

async fn confirm_match(
    State(state): State<AppState>,
    Path((id, entry_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MatchResponse>, AppError> {
    let (activity, entry) = state.confirm_match(id, entry_id)?;

    tracing::info!("Matched activity {} to training entry {}", id, entry_id);

    Ok(Json(MatchResponse { activity, entry }))
}
