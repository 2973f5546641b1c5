use crate::types::activity::Activity;
use crate::types::metrics::{Metrics, Tempo};

/// Renders a plain-language performance summary from the typed metrics.
/// Lives outside the pipeline so other consumers can render the same data
/// their own way.
pub fn render(activity: &Activity, metrics: &Metrics) -> String {
    let mut parts = Vec::new();

    if activity.distance_m > 0.0 {
        parts.push(format!(
            "{:.2} km {} in {}",
            activity.distance_m / 1000.0,
            activity.activity_type.name(),
            format_duration(activity.duration_seconds)
        ));
    } else {
        parts.push(format!(
            "{} for {} with no GPS data",
            activity.activity_type.name(),
            format_duration(activity.duration_seconds)
        ));
    }

    if let Some(tempo) = metrics.tempo {
        parts.push(format_tempo(tempo));
    }

    if activity.elevation_gain_m >= 1.0 {
        parts.push(format!("{:.0} m climbed", activity.elevation_gain_m));
    }

    if let (Some(avg), Some(max)) = (activity.avg_heart_rate, activity.max_heart_rate) {
        parts.push(format!("avg HR {} bpm (max {})", avg, max));
    }

    if let Some(avg) = activity.avg_power {
        match activity.max_power {
            Some(max) => parts.push(format!("avg power {} W (max {})", avg, max)),
            None => parts.push(format!("avg power {} W", avg)),
        }
    }

    let mut summary = format!("{}: {}", activity.name, parts.join(", "));
    if !metrics.splits.is_empty() {
        summary.push_str(&format!(", {} splits", metrics.splits.len()));
    }
    summary
}

pub fn format_duration(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

pub fn format_tempo(tempo: Tempo) -> String {
    match tempo {
        Tempo::Pace { min_per_km } => {
            let total_seconds = (min_per_km * 60.0).round() as u64;
            format!("{}:{:02} min/km", total_seconds / 60, total_seconds % 60)
        }
        Tempo::Speed { kmh } => format!("{:.1} km/h", kmh),
    }
}
