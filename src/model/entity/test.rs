use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Assessment attached to a course; aggregate root of its questions.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::prelude::FromRow, utoipa::ToSchema)]
pub struct Test {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub number_of_attempts: Option<i32>,
    pub time_limit_minutes: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct TestCreate {
    pub course_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub number_of_attempts: Option<i32>,
    #[serde(default)]
    pub time_limit_minutes: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct TestPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub number_of_attempts: Option<i32>,
    pub time_limit_minutes: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct TestFilter {
    pub course_id: Option<i64>,
}

impl Test {
    pub fn from_create(id: i64, data: TestCreate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            course_id: data.course_id,
            title: data.title,
            description: data.description,
            number_of_attempts: data.number_of_attempts,
            time_limit_minutes: data.time_limit_minutes,
            created_at: now,
        }
    }

    pub fn apply(&mut self, patch: TestPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(number_of_attempts) = patch.number_of_attempts {
            self.number_of_attempts = Some(number_of_attempts);
        }
        if let Some(time_limit_minutes) = patch.time_limit_minutes {
            self.time_limit_minutes = Some(time_limit_minutes);
        }
    }

    pub fn matches(&self, filter: &TestFilter) -> bool {
        filter.course_id.is_none_or(|cid| self.course_id == cid)
    }
}
