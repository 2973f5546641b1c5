use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Tempo {
    Pace { min_per_km: f64 },
    Speed { kmh: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Split {
    pub number: u32,
    pub distance_m: f64,
    pub cumulative_distance_m: f64,
    pub cumulative_seconds: f64,
    pub tempo: Option<Tempo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metrics {
    pub distance_m: f64,
    pub duration_seconds: u64,
    pub elevation_gain_m: f64,
    pub tempo: Option<Tempo>,
    pub avg_heart_rate: Option<u16>,
    pub max_heart_rate: Option<u16>,
    pub avg_power: Option<u16>,
    pub max_power: Option<u16>,
    pub splits: Vec<Split>,
}
