use crate::pipeline::geo::haversine_m;
use crate::types::activity::{ActivityType, TrackPoint};
use crate::types::metrics::{Metrics, Split, Tempo};

pub const DEFAULT_SPLIT_INTERVAL_M: f64 = 1000.0;
/// Swimming pace is reported on a 100-unit basis.
pub const SWIM_SPLIT_INTERVAL_M: f64 = 100.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsOptions {
    pub split_interval_m: Option<f64>,
}

pub fn split_interval_for(activity_type: ActivityType) -> f64 {
    match activity_type {
        ActivityType::Swimming => SWIM_SPLIT_INTERVAL_M,
        _ => DEFAULT_SPLIT_INTERVAL_M,
    }
}

pub fn tempo_for(activity_type: ActivityType, distance_m: f64, seconds: f64) -> Option<Tempo> {
    if distance_m <= 0.0 || seconds <= 0.0 {
        return None;
    }
    let km = distance_m / 1000.0;
    if activity_type.uses_pace() {
        Some(Tempo::Pace {
            min_per_km: (seconds / 60.0) / km,
        })
    } else {
        Some(Tempo::Speed {
            kmh: km / (seconds / 3600.0),
        })
    }
}

/// Single forward pass over an immutable point sequence. Total: a 0 or 1
/// point track yields zero distance and duration, absent tempo and no splits.
pub fn compute(points: &[TrackPoint], activity_type: ActivityType, options: MetricsOptions) -> Metrics {
    let interval = options
        .split_interval_m
        .unwrap_or_else(|| split_interval_for(activity_type));

    let mut acc = Accumulator::new(interval, activity_type);
    let mut prev: Option<&TrackPoint> = None;
    for point in points {
        acc.sample(point);
        if let Some(prev) = prev {
            acc.advance(prev, point);
        }
        prev = Some(point);
    }

    let duration_seconds = match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() >= 2 => {
            (last.time - first.time).num_seconds().max(0) as u64
        }
        _ => 0,
    };

    acc.finish(duration_seconds)
}

struct Accumulator {
    activity_type: ActivityType,
    split_interval_m: f64,

    distance_m: f64,
    elevation_gain_m: f64,

    hr_sum: u64,
    hr_count: u64,
    max_hr: u16,
    power_sum: u64,
    power_count: u64,
    max_power: u16,

    split_distance_m: f64,
    split_seconds: f64,
    cumulative_distance_m: f64,
    cumulative_seconds: f64,
    splits: Vec<Split>,
}

impl Accumulator {
    fn new(split_interval_m: f64, activity_type: ActivityType) -> Self {
        Self {
            activity_type,
            split_interval_m,
            distance_m: 0.0,
            elevation_gain_m: 0.0,
            hr_sum: 0,
            hr_count: 0,
            max_hr: 0,
            power_sum: 0,
            power_count: 0,
            max_power: 0,
            split_distance_m: 0.0,
            split_seconds: 0.0,
            cumulative_distance_m: 0.0,
            cumulative_seconds: 0.0,
            splits: Vec::new(),
        }
    }

    fn sample(&mut self, point: &TrackPoint) {
        if let Some(hr) = point.heart_rate {
            self.hr_sum += hr as u64;
            self.hr_count += 1;
            self.max_hr = self.max_hr.max(hr);
        }
        if let Some(power) = point.power {
            self.power_sum += power as u64;
            self.power_count += 1;
            self.max_power = self.max_power.max(power);
        }
    }

    fn advance(&mut self, prev: &TrackPoint, curr: &TrackPoint) {
        // Pairs with a missing coordinate contribute zero distance but do not
        // break the pass.
        if let (Some((lat1, lon1)), Some((lat2, lon2))) = (prev.position(), curr.position()) {
            let leg = haversine_m(lat1, lon1, lat2, lon2);
            self.distance_m += leg;
            self.split_distance_m += leg;
            self.cumulative_distance_m += leg;
        }

        let gain = curr.elevation - prev.elevation;
        if gain > 0.0 {
            self.elevation_gain_m += gain;
        }

        let dt = (curr.time - prev.time).num_milliseconds().max(0) as f64 / 1000.0;
        self.split_seconds += dt;
        self.cumulative_seconds += dt;

        if self.split_distance_m >= self.split_interval_m {
            let number = self.splits.len() as u32 + 1;
            self.splits.push(Split {
                number,
                distance_m: self.split_distance_m,
                cumulative_distance_m: self.cumulative_distance_m,
                cumulative_seconds: self.cumulative_seconds,
                tempo: tempo_for(self.activity_type, self.split_distance_m, self.split_seconds),
            });
            self.split_distance_m = 0.0;
            self.split_seconds = 0.0;
        }
    }

    fn finish(self, duration_seconds: u64) -> Metrics {
        Metrics {
            distance_m: self.distance_m,
            duration_seconds,
            elevation_gain_m: self.elevation_gain_m,
            tempo: tempo_for(self.activity_type, self.distance_m, duration_seconds as f64),
            avg_heart_rate: if self.hr_count > 0 {
                Some((self.hr_sum / self.hr_count) as u16)
            } else {
                None
            },
            max_heart_rate: if self.hr_count > 0 { Some(self.max_hr) } else { None },
            avg_power: if self.power_count > 0 {
                Some((self.power_sum / self.power_count) as u16)
            } else {
                None
            },
            max_power: if self.power_count > 0 { Some(self.max_power) } else { None },
            splits: self.splits,
        }
    }
}
