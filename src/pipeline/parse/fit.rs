use chrono::DateTime;
use fitparser::profile::MesgNum;

use crate::error::ParseError;
use crate::pipeline::parse::{ParsePolicy, Parser};
use crate::types::activity::{ActivityType, DeviceSummary, ParsedActivity, TrackPoint};

pub struct FitParser;

impl Parser for FitParser {
    fn parse(
        &self,
        bytes: &[u8],
        declared: Option<ActivityType>,
        policy: &ParsePolicy,
    ) -> Result<ParsedActivity, ParseError> {
        let data = fitparser::from_bytes(bytes)
            .map_err(|e| ParseError::InvalidFit(format!("Failed to parse FIT file: {}", e)))?;

        let mut device = DeviceSummary::default();
        let mut saw_session = false;
        let mut points = Vec::new();

        for record in data {
            match record.kind() {
                MesgNum::Session if !saw_session => {
                    saw_session = true;
                    read_session(&record, policy, &mut device);
                }
                MesgNum::Record => {
                    if let Some(point) = read_record(&record, policy) {
                        points.push(point);
                    }
                }
                _ => {}
            }
        }

        if points.is_empty() {
            return Err(ParseError::EmptyTrack);
        }

        let activity_type = device
            .sport
            .or(declared)
            .unwrap_or(policy.default_sport);

        Ok(ParsedActivity {
            name: policy.fallback_track_name.to_string(),
            activity_type,
            device,
            points,
        })
    }
}

fn read_session(record: &fitparser::FitDataRecord, policy: &ParsePolicy, device: &mut DeviceSummary) {
    for field in record.fields() {
        match field.name() {
            "sport" => {
                if let fitparser::Value::String(val) = field.value() {
                    device.sport = Some(map_sport(val, policy.default_sport));
                }
            }
            "start_time" => {
                if let fitparser::Value::Timestamp(val) = field.value() {
                    device.start_time = DateTime::from_timestamp(val.timestamp(), 0);
                }
            }
            "total_elapsed_time" => {
                if let fitparser::Value::Float64(val) = field.value() {
                    device.total_elapsed_seconds = Some(*val);
                }
            }
            "total_distance" => {
                if let fitparser::Value::Float64(val) = field.value() {
                    device.total_distance_m = Some(*val);
                }
            }
            "avg_heart_rate" => {
                if let fitparser::Value::UInt8(val) = field.value() {
                    device.avg_heart_rate = Some(*val as u16);
                }
            }
            "max_heart_rate" => {
                if let fitparser::Value::UInt8(val) = field.value() {
                    device.max_heart_rate = Some(*val as u16);
                }
            }
            "avg_power" => {
                if let fitparser::Value::UInt16(val) = field.value() {
                    device.avg_power = Some(*val);
                }
            }
            "max_power" => {
                if let fitparser::Value::UInt16(val) = field.value() {
                    device.max_power = Some(*val);
                }
            }
            "enhanced_avg_speed" => {
                if let fitparser::Value::Float64(val) = field.value() {
                    device.avg_speed_ms = Some(*val);
                }
            }
            "avg_speed" => {
                if device.avg_speed_ms.is_none() {
                    if let fitparser::Value::Float64(val) = field.value() {
                        device.avg_speed_ms = Some(*val);
                    }
                }
            }
            "enhanced_max_speed" => {
                if let fitparser::Value::Float64(val) = field.value() {
                    device.max_speed_ms = Some(*val);
                }
            }
            "max_speed" => {
                if device.max_speed_ms.is_none() {
                    if let fitparser::Value::Float64(val) = field.value() {
                        device.max_speed_ms = Some(*val);
                    }
                }
            }
            "avg_cadence" => {
                if let fitparser::Value::UInt8(val) = field.value() {
                    device.avg_cadence = Some(*val as u16);
                }
            }
            "max_cadence" => {
                if let fitparser::Value::UInt8(val) = field.value() {
                    device.max_cadence = Some(*val as u16);
                }
            }
            "total_calories" => {
                if let fitparser::Value::UInt16(val) = field.value() {
                    device.calories = Some(*val);
                }
            }
            _ => {}
        }
    }
}

fn read_record(record: &fitparser::FitDataRecord, policy: &ParsePolicy) -> Option<TrackPoint> {
    let mut lat = None;
    let mut lon = None;
    let mut elevation = None;
    let mut time = None;
    let mut heart_rate = None;
    let mut power = None;
    let mut cadence = None;

    for field in record.fields() {
        match field.name() {
            "position_lat" => {
                if let fitparser::Value::SInt32(val) = field.value() {
                    lat = Some(semicircles_to_degrees(*val));
                }
            }
            "position_long" => {
                if let fitparser::Value::SInt32(val) = field.value() {
                    lon = Some(semicircles_to_degrees(*val));
                }
            }
            "altitude" | "enhanced_altitude" => {
                if let fitparser::Value::Float64(val) = field.value() {
                    elevation = Some(*val);
                }
            }
            "timestamp" => {
                if let fitparser::Value::Timestamp(val) = field.value() {
                    time = DateTime::from_timestamp(val.timestamp(), 0);
                }
            }
            "heart_rate" => {
                if let fitparser::Value::UInt8(val) = field.value() {
                    heart_rate = Some(*val as u16);
                }
            }
            "power" => {
                if let fitparser::Value::UInt16(val) = field.value() {
                    power = Some(*val);
                }
            }
            "cadence" => {
                if let fitparser::Value::UInt8(val) = field.value() {
                    cadence = Some(*val as u16);
                }
            }
            _ => {}
        }
    }

    // A sample with no timestamp cannot be ordered; drop it. Samples without a
    // position are kept, they may still carry sensor data.
    let time = time?;

    Some(TrackPoint {
        lat,
        lon,
        elevation: elevation.unwrap_or(policy.default_elevation_m),
        time,
        heart_rate,
        power,
        cadence,
    })
}

fn map_sport(sport: &str, default: ActivityType) -> ActivityType {
    match sport {
        "running" | "trail_running" => ActivityType::Running,
        "cycling" | "mountain_biking" | "e_biking" => ActivityType::Cycling,
        "swimming" | "open_water_swimming" => ActivityType::Swimming,
        "walking" | "hiking" => ActivityType::Walking,
        "triathlon" | "multisport" | "transition" => ActivityType::Triathlon,
        _ => default,
    }
}

fn semicircles_to_degrees(semicircles: i32) -> f64 {
    (semicircles as f64) * (180.0 / 2_147_483_648.0)
}
