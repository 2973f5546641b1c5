use chrono::{DateTime, Duration, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ParseError;
use crate::pipeline::parse::{ParsePolicy, Parser};
use crate::types::activity::{ActivityType, DeviceSummary, ParsedActivity, TrackPoint};

pub struct GpxParser;

struct RawPoint {
    lat: f64,
    lon: f64,
    elevation: Option<f64>,
    time: Option<DateTime<Utc>>,
    heart_rate: Option<u16>,
    power: Option<u16>,
    cadence: Option<u16>,
}

impl Parser for GpxParser {
    fn parse(
        &self,
        bytes: &[u8],
        declared: Option<ActivityType>,
        policy: &ParsePolicy,
    ) -> Result<ParsedActivity, ParseError> {
        let mut reader = Reader::from_reader(bytes);
        reader.trim_text(true);

        let mut raw: Vec<RawPoint> = Vec::new();
        let mut in_trkpt = false;
        let mut current_point: Option<RawPoint> = None;
        let mut current_element = String::new();
        let mut track_name: Option<String> = None;
        let mut base_time: Option<DateTime<Utc>> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let name = e.name();
                    let name_str = std::str::from_utf8(name.as_ref())
                        .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

                    if name_str == "trkpt" {
                        in_trkpt = true;
                        current_point = point_from_attrs(&e)?;
                    } else {
                        current_element = name_str.to_string();
                    }
                }
                Ok(Event::Empty(e)) => {
                    let name = e.name();
                    let name_str = std::str::from_utf8(name.as_ref())
                        .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

                    // Self-closed points carry attributes only; no End event
                    // follows, so push right away.
                    if name_str == "trkpt" {
                        if let Some(point) = point_from_attrs(&e)? {
                            raw.push(point);
                        }
                    }
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

                    if in_trkpt {
                        if let Some(point) = current_point.as_mut() {
                            match current_element.as_str() {
                                "ele" => point.elevation = text.parse().ok(),
                                "time" => point.time = text.parse::<DateTime<Utc>>().ok(),
                                "hr" | "gpxtpx:hr" => point.heart_rate = text.parse().ok(),
                                "power" | "gpxtpx:power" => point.power = text.parse().ok(),
                                "cad" | "gpxtpx:cad" => point.cadence = text.parse().ok(),
                                _ => {}
                            }
                        }
                    } else {
                        match current_element.as_str() {
                            "name" => {
                                if track_name.is_none() {
                                    track_name = Some(text.to_string());
                                }
                            }
                            "time" => {
                                if base_time.is_none() {
                                    base_time = text.parse::<DateTime<Utc>>().ok();
                                }
                            }
                            _ => {}
                        }
                    }
                }
                Ok(Event::End(e)) => {
                    let name = e.name();
                    let name_str = std::str::from_utf8(name.as_ref())
                        .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

                    if name_str == "trkpt" {
                        if let Some(point) = current_point.take() {
                            raw.push(point);
                        }
                        in_trkpt = false;
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ParseError::InvalidGpx(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        if raw.is_empty() {
            return Err(ParseError::EmptyTrack);
        }

        let times = resolve_times(&raw, base_time, policy);

        let points = raw
            .into_iter()
            .zip(times)
            .map(|(p, time)| TrackPoint {
                lat: Some(p.lat),
                lon: Some(p.lon),
                elevation: p.elevation.unwrap_or(policy.default_elevation_m),
                time,
                heart_rate: p.heart_rate,
                power: p.power,
                cadence: p.cadence,
            })
            .collect();

        Ok(ParsedActivity {
            name: track_name.unwrap_or_else(|| policy.fallback_track_name.to_string()),
            activity_type: declared.unwrap_or(policy.default_sport),
            device: DeviceSummary::default(),
            points,
        })
    }
}

fn point_from_attrs(e: &quick_xml::events::BytesStart) -> Result<Option<RawPoint>, ParseError> {
    let mut lat = None;
    let mut lon = None;

    for attr in e.attributes() {
        let attr = attr.map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
        let value = std::str::from_utf8(&attr.value)
            .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

        match key {
            "lat" => lat = value.parse().ok(),
            "lon" => lon = value.parse().ok(),
            _ => {}
        }
    }

    Ok(match (lat, lon) {
        (Some(lat), Some(lon)) => Some(RawPoint {
            lat,
            lon,
            elevation: None,
            time: None,
            heart_rate: None,
            power: None,
            cadence: None,
        }),
        _ => None,
    })
}

/// Per-point timestamps win. When no point carries one, timestamps are
/// synthesized one sample interval apart from the track-level time, or from
/// decode time when the file has no time at all (duration is then an accepted
/// approximation). Points with gaps between timestamped neighbours inherit
/// the nearest earlier timestamp.
fn resolve_times(
    raw: &[RawPoint],
    base_time: Option<DateTime<Utc>>,
    policy: &ParsePolicy,
) -> Vec<DateTime<Utc>> {
    let step = Duration::seconds(policy.synthetic_sample_seconds);

    if raw.iter().all(|p| p.time.is_none()) {
        let base = base_time.unwrap_or_else(|| policy.decode_now());
        return (0..raw.len() as i32).map(|i| base + step * i).collect();
    }

    let mut times: Vec<Option<DateTime<Utc>>> = raw.iter().map(|p| p.time).collect();

    let mut last = None;
    for time in times.iter_mut() {
        match time {
            Some(t) => last = Some(*t),
            None => *time = last,
        }
    }

    // Leading points before the first timestamp inherit it.
    let first = times.iter().find_map(|t| *t);
    times
        .into_iter()
        .map(|t| t.or(first).unwrap_or_else(|| policy.decode_now()))
        .collect()
}
