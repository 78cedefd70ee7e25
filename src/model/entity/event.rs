use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scheduled training session. Events hang off the trainer running
/// them, not off a course; deleting the trainer account orphans the
/// event instead of removing it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::prelude::FromRow, utoipa::ToSchema)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub trainer_id: Option<i64>,
    pub event_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub format: Option<String>,
    pub seats_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct EventCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Required on create; the store rejects ids of users that do not
    /// exist.
    pub trainer_id: i64,
    #[serde(default)]
    pub event_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub seats_count: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub trainer_id: Option<i64>,
    pub event_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub format: Option<String>,
    pub seats_count: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct EventFilter {
    pub trainer_id: Option<i64>,
    pub search: Option<String>,
}

impl Event {
    pub fn from_create(id: i64, data: EventCreate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: data.title,
            description: data.description,
            trainer_id: Some(data.trainer_id),
            event_date: data.event_date,
            location: data.location,
            format: data.format,
            seats_count: data.seats_count,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: EventPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(trainer_id) = patch.trainer_id {
            self.trainer_id = Some(trainer_id);
        }
        if let Some(event_date) = patch.event_date {
            self.event_date = Some(event_date);
        }
        if let Some(location) = patch.location {
            self.location = Some(location);
        }
        if let Some(format) = patch.format {
            self.format = Some(format);
        }
        if let Some(seats_count) = patch.seats_count {
            self.seats_count = Some(seats_count);
        }
        self.updated_at = now;
    }

    pub fn matches(&self, filter: &EventFilter) -> bool {
        if let Some(trainer_id) = filter.trainer_id {
            if self.trainer_id != Some(trainer_id) {
                return false;
            }
        }
        if let Some(search) = &filter.search {
            let description = self.description.as_deref().unwrap_or("");
            if !super::matches_search(search, &self.title, description) {
                return false;
            }
        }
        true
    }
}
