use axum::extract::Multipart;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::matcher;
use crate::pipeline::metrics::MetricsOptions;
use crate::pipeline::parse::{self, ParsePolicy};
use crate::pipeline::process::{self, ProcessedActivity};
use crate::state::{AppState, StoredActivity};
use crate::types::activity::{Activity, ActivityType, FileKind, TrainingEntry};
use crate::types::metrics::Metrics;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/upload", post(upload))
}

#[derive(Serialize, Deserialize)]
pub struct UploadResponse {
    pub activity_id: String,
    pub activity: Activity,
    pub metrics: Metrics,
    pub has_gps_data: bool,
    pub match_candidates: Vec<TrainingEntry>,
}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;
    let mut declared_type: Option<ActivityType> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                filename = field.file_name().map(|s| s.to_string());
                file_bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Failed to read file bytes: {}", e)))?
                        .to_vec(),
                );
            }
            "activity_type" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read activity_type: {}", e)))?;
                declared_type = Some(ActivityType::from_name(&value).ok_or_else(|| {
                    AppError::BadRequest(format!("Unknown activity type: {}", value))
                })?);
            }
            _ => {}
        }
    }

    let bytes = file_bytes.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;
    let filename = filename.ok_or_else(|| AppError::BadRequest("No filename provided".to_string()))?;

    let kind = FileKind::from_filename(&filename)
        .ok_or_else(|| AppError::BadRequest("Unsupported file format".to_string()))?;

    tracing::info!("Parsing {} file: {}", kind_name(kind), filename);

    let parsed = parse::parse(&bytes, kind, declared_type, &ParsePolicy::default())?;
    let processed = process::process(parsed, MetricsOptions::default());

    let activity = to_activity(Uuid::new_v4(), &processed);
    let candidates = matcher::same_day_candidates(activity.start_time, state.all_entries());

    tracing::info!(
        "Stored activity {} ({}, {} points, {:.2} km, {} match candidates)",
        activity.id,
        activity.activity_type.name(),
        processed.points.len(),
        activity.distance_m / 1000.0,
        candidates.len()
    );

    let response = UploadResponse {
        activity_id: activity.id.to_string(),
        activity: activity.clone(),
        metrics: processed.metrics.clone(),
        has_gps_data: processed.has_gps_data(),
        match_candidates: candidates,
    };

    state.insert_activity(StoredActivity {
        activity,
        metrics: processed.metrics,
        points: processed.points,
    });

    Ok(Json(response))
}

fn to_activity(id: Uuid, processed: &ProcessedActivity) -> Activity {
    Activity {
        id,
        name: processed.name.clone(),
        activity_type: processed.activity_type,
        start_time: processed.start_time,
        end_time: processed.end_time,
        duration_seconds: processed.duration_seconds,
        distance_m: processed.distance_m,
        elevation_gain_m: processed.elevation_gain_m,
        avg_heart_rate: processed.avg_heart_rate,
        max_heart_rate: processed.max_heart_rate,
        avg_power: processed.avg_power,
        max_power: processed.max_power,
        avg_speed_kmh: processed.avg_speed_kmh,
        max_speed_kmh: processed.max_speed_kmh,
        avg_cadence: processed.avg_cadence,
        max_cadence: processed.max_cadence,
        calories: processed.calories,
        matched_entry: None,
    }
}

fn kind_name(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Gpx => "gpx",
        FileKind::Fit => "fit",
    }
}
