use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Assignment inside a course. `status` is a free-form label, not a
/// closed enum; existing data carries arbitrary values.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::prelude::FromRow, utoipa::ToSchema)]
pub struct Task {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub assigned_to_user_id: Option<i64>,
    pub created_by_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct TaskCreate {
    pub course_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assigned_to_user_id: Option<i64>,
    /// Set by the service from the authenticated actor, never taken
    /// from the request body.
    #[serde(skip)]
    pub created_by_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub assigned_to_user_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct TaskFilter {
    pub course_id: Option<i64>,
    pub created_by: Option<i64>,
    pub assigned_to: Option<i64>,
}

impl Task {
    pub fn from_create(id: i64, data: TaskCreate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            course_id: data.course_id,
            title: data.title,
            description: data.description,
            status: data.status,
            deadline: data.deadline,
            assigned_to_user_id: data.assigned_to_user_id,
            created_by_id: data.created_by_id,
            created_at: now,
        }
    }

    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(status) = patch.status {
            self.status = Some(status);
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = Some(deadline);
        }
        if let Some(assigned_to_user_id) = patch.assigned_to_user_id {
            self.assigned_to_user_id = Some(assigned_to_user_id);
        }
    }

    pub fn matches(&self, filter: &TaskFilter) -> bool {
        if let Some(course_id) = filter.course_id {
            if self.course_id != course_id {
                return false;
            }
        }
        if let Some(created_by) = filter.created_by {
            if self.created_by_id != created_by {
                return false;
            }
        }
        if let Some(assigned_to) = filter.assigned_to {
            if self.assigned_to_user_id != Some(assigned_to) {
                return false;
            }
        }
        true
    }
}
