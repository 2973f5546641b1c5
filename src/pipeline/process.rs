use chrono::{DateTime, Duration, Utc};

use crate::pipeline::metrics::{self, MetricsOptions};
use crate::types::activity::{ActivityType, ParsedActivity, TrackPoint};
use crate::types::metrics::Metrics;

#[derive(Debug, Clone)]
pub struct ProcessedActivity {
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
    pub metrics: Metrics,
    pub points: Vec<TrackPoint>,
}

impl ProcessedActivity {
    /// Fewer than 2 usable points means distance, tempo and splits are not
    /// derivable. Not an error; callers branch on this.
    pub fn has_gps_data(&self) -> bool {
        self.points.len() >= 2
    }
}

/// Merges device-reported aggregates with values computed from the point
/// sequence. Device values win where present; derived metrics are always
/// computed so splits and tempo exist even for summarized files.
pub fn process(parsed: ParsedActivity, options: MetricsOptions) -> ProcessedActivity {
    let computed = metrics::compute(&parsed.points, parsed.activity_type, options);
    let device = parsed.device;

    let duration_seconds = device
        .total_elapsed_seconds
        .map(|s| s.round().max(0.0) as u64)
        .unwrap_or(computed.duration_seconds);

    let distance_m = device.total_distance_m.unwrap_or(computed.distance_m);

    // first()/last() exist: parsers reject empty tracks.
    let start_time = device
        .start_time
        .or_else(|| parsed.points.first().map(|p| p.time))
        .unwrap_or_else(Utc::now);
    let end_time = match (device.start_time, device.total_elapsed_seconds) {
        (Some(start), Some(elapsed)) => start + Duration::seconds(elapsed.round() as i64),
        _ => parsed.points.last().map(|p| p.time).unwrap_or(start_time),
    };

    let avg_speed_kmh = device.avg_speed_ms.map(|ms| ms * 3.6).or_else(|| {
        if duration_seconds > 0 {
            Some((distance_m / 1000.0) / (duration_seconds as f64 / 3600.0))
        } else {
            None
        }
    });

    ProcessedActivity {
        name: parsed.name,
        activity_type: parsed.activity_type,
        start_time,
        end_time,
        duration_seconds,
        distance_m,
        elevation_gain_m: computed.elevation_gain_m,
        avg_heart_rate: device.avg_heart_rate.or(computed.avg_heart_rate),
        max_heart_rate: device.max_heart_rate.or(computed.max_heart_rate),
        avg_power: device.avg_power.or(computed.avg_power),
        max_power: device.max_power.or(computed.max_power),
        avg_speed_kmh,
        max_speed_kmh: device.max_speed_ms.map(|ms| ms * 3.6),
        avg_cadence: device.avg_cadence,
        max_cadence: device.max_cadence,
        calories: device.calories,
        metrics: computed,
        points: parsed.points,
    }
}
