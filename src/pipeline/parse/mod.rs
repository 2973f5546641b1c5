mod fit;
mod gpx;

use chrono::{DateTime, Utc};

use crate::error::ParseError;
use crate::types::activity::{ActivityType, FileKind, ParsedActivity};

/// Fallback defaults applied while decoding. Kept in one place so tests can
/// override them instead of rediscovering them branch by branch.
#[derive(Debug, Clone)]
pub struct ParsePolicy {
    pub default_sport: ActivityType,
    pub default_elevation_m: f64,
    pub synthetic_sample_seconds: i64,
    pub fallback_track_name: &'static str,
    /// Base for synthesized timestamps when the file carries no time at all.
    /// None means "now at decode time".
    pub decode_time: Option<DateTime<Utc>>,
}

impl Default for ParsePolicy {
    fn default() -> Self {
        Self {
            default_sport: ActivityType::Running,
            default_elevation_m: 0.0,
            synthetic_sample_seconds: 1,
            fallback_track_name: "Imported activity",
            decode_time: None,
        }
    }
}

impl ParsePolicy {
    pub(crate) fn decode_now(&self) -> DateTime<Utc> {
        self.decode_time.unwrap_or_else(Utc::now)
    }
}

pub trait Parser {
    fn parse(
        &self,
        bytes: &[u8],
        declared: Option<ActivityType>,
        policy: &ParsePolicy,
    ) -> Result<ParsedActivity, ParseError>;
}

pub fn parse(
    bytes: &[u8],
    kind: FileKind,
    declared: Option<ActivityType>,
    policy: &ParsePolicy,
) -> Result<ParsedActivity, ParseError> {
    match kind {
        FileKind::Gpx => gpx::GpxParser.parse(bytes, declared, policy),
        FileKind::Fit => fit::FitParser.parse(bytes, declared, policy),
    }
}
