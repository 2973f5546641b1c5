use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::types::activity::{Activity, TrackPoint, TrainingEntry};
use crate::types::metrics::Metrics;

#[derive(Debug, Clone)]
pub struct StoredActivity {
    pub activity: Activity,
    pub metrics: Metrics,
    pub points: Vec<TrackPoint>,
}

#[derive(Clone, Default)]
pub struct AppState {
    activities: Arc<DashMap<Uuid, StoredActivity>>,
    plans: Arc<DashMap<Uuid, TrainingEntry>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activity and its child points go in as one record, so a parent without
    /// points can never be observed.
    pub fn insert_activity(&self, stored: StoredActivity) {
        self.activities.insert(stored.activity.id, stored);
    }

    pub fn get_activity(&self, id: Uuid) -> Option<StoredActivity> {
        self.activities.get(&id).map(|entry| entry.clone())
    }

    pub fn insert_entry(&self, entry: TrainingEntry) {
        self.plans.insert(entry.id, entry);
    }

    pub fn entries_for_day(&self, date: NaiveDate) -> Vec<TrainingEntry> {
        let mut entries: Vec<TrainingEntry> = self
            .plans
            .iter()
            .filter(|entry| entry.date == date)
            .map(|entry| entry.clone())
            .collect();
        entries.sort_by(|a, b| a.title.cmp(&b.title));
        entries
    }

    pub fn all_entries(&self) -> Vec<TrainingEntry> {
        self.plans.iter().map(|entry| entry.clone()).collect()
    }

    /// Links an activity to a training entry and marks the entry completed.
    /// Both guards are taken before either write (always activity first, then
    /// plan), so no reader observes one side without the other.
    pub fn confirm_match(
        &self,
        activity_id: Uuid,
        entry_id: Uuid,
    ) -> Result<(Activity, TrainingEntry), AppError> {
        let mut stored = self
            .activities
            .get_mut(&activity_id)
            .ok_or_else(|| AppError::NotFound(format!("Activity not found: {}", activity_id)))?;
        let mut entry = self
            .plans
            .get_mut(&entry_id)
            .ok_or_else(|| AppError::NotFound(format!("Training entry not found: {}", entry_id)))?;

        if entry.completed {
            return Err(AppError::Conflict(format!(
                "Training entry {} is already completed",
                entry_id
            )));
        }
        if stored.activity.matched_entry.is_some() {
            return Err(AppError::Conflict(format!(
                "Activity {} is already matched",
                activity_id
            )));
        }
        if entry.date != stored.activity.start_time.date_naive() {
            return Err(AppError::Conflict(format!(
                "Training entry {} is not on the activity's day",
                entry_id
            )));
        }

        stored.activity.matched_entry = Some(entry_id);
        entry.completed = true;
        entry.activity_id = Some(activity_id);

        Ok((stored.activity.clone(), entry.clone()))
    }
}
