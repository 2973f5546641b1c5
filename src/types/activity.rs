use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackPoint {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub elevation: f64,
    pub time: DateTime<Utc>,
    pub heart_rate: Option<u16>,
    pub power: Option<u16>,
    pub cadence: Option<u16>,
}

impl TrackPoint {
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Running,
    Cycling,
    Swimming,
    Triathlon,
    Walking,
}

impl ActivityType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "running" => Some(ActivityType::Running),
            "cycling" => Some(ActivityType::Cycling),
            "swimming" => Some(ActivityType::Swimming),
            "triathlon" => Some(ActivityType::Triathlon),
            "walking" => Some(ActivityType::Walking),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ActivityType::Running => "running",
            ActivityType::Cycling => "cycling",
            ActivityType::Swimming => "swimming",
            ActivityType::Triathlon => "triathlon",
            ActivityType::Walking => "walking",
        }
    }

    /// Running and swimming report pace (min/km), everything else speed (km/h).
    pub fn uses_pace(self) -> bool {
        matches!(self, ActivityType::Running | ActivityType::Swimming)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum FileKind {
    Gpx,
    Fit,
}

impl FileKind {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = filename.rsplit('.').next()?.to_lowercase();
        match ext.as_str() {
            "gpx" => Some(FileKind::Gpx),
            "fit" => Some(FileKind::Fit),
            _ => None,
        }
    }
}

/// Aggregates reported by the recording device itself. Everything is optional;
/// absent fields are computed from the point sequence where derivable.
#[derive(Debug, Clone, Default)]
pub struct DeviceSummary {
    pub sport: Option<ActivityType>,
    pub start_time: Option<DateTime<Utc>>,
    pub total_elapsed_seconds: Option<f64>,
    pub total_distance_m: Option<f64>,
    pub avg_heart_rate: Option<u16>,
    pub max_heart_rate: Option<u16>,
    pub avg_power: Option<u16>,
    pub max_power: Option<u16>,
    pub avg_speed_ms: Option<f64>,
    pub max_speed_ms: Option<f64>,
    pub avg_cadence: Option<u16>,
    pub max_cadence: Option<u16>,
    pub calories: Option<u16>,
}

#[derive(Debug, Clone)]
pub struct ParsedActivity {
    pub name: String,
    pub activity_type: ActivityType,
    pub device: DeviceSummary,
    pub points: Vec<TrackPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub name: String,
    pub activity_type: ActivityType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: u64,
    pub distance_m: f64,
    pub elevation_gain_m: f64,
    pub avg_heart_rate: Option<u16>,
    pub max_heart_rate: Option<u16>,
    pub avg_power: Option<u16>,
    pub max_power: Option<u16>,
    pub avg_speed_kmh: Option<f64>,
    pub max_speed_kmh: Option<f64>,
    pub avg_cadence: Option<u16>,
    pub max_cadence: Option<u16>,
    pub calories: Option<u16>,
    pub matched_entry: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub title: String,
    pub activity_type: ActivityType,
    pub completed: bool,
    pub activity_id: Option<Uuid>,
}
