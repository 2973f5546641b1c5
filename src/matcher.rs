use chrono::{DateTime, Utc};

use crate::types::activity::TrainingEntry;

/// Planned-but-incomplete entries on the activity's calendar day (UTC),
/// offered to the user as match candidates. Pure query; confirmation is the
/// store's job.
pub fn same_day_candidates<I>(start: DateTime<Utc>, entries: I) -> Vec<TrainingEntry>
where
    I: IntoIterator<Item = TrainingEntry>,
{
    let day = start.date_naive();
    let mut candidates: Vec<TrainingEntry> = entries
        .into_iter()
        .filter(|entry| entry.date == day && !entry.completed)
        .collect();
    candidates.sort_by(|a, b| a.title.cmp(&b.title));
    candidates
}
