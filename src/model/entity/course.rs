use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Course lifecycle. Forward-only (draft -> published -> archived) by
/// convention; transitions are not validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    Draft,
    Published,
    Archived,
}

impl CourseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }

    /// Unrecognized values fall back to draft, the least visible state.
    pub fn parse(value: &str) -> Self {
        match value {
            "published" => Self::Published,
            "archived" => Self::Archived,
            _ => Self::Draft,
        }
    }
}

/// Aggregate root for modules, lessons, tests, materials, tasks and
/// enrollments; deleting a course removes all of them.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub short_description: Option<String>,
    pub image_url: Option<String>,
    pub status: CourseStatus,
    pub duration_hours: i32,
    pub tags: Vec<String>,
    pub requirements: Vec<String>,
    pub what_you_learn: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CourseCreate {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub duration_hours: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub what_you_learn: Vec<String>,
}

/// Strict patch: absent fields stay untouched, present fields are
/// applied even when empty.
#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CoursePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<CourseStatus>,
    pub duration_hours: Option<i32>,
    pub tags: Option<Vec<String>>,
    pub requirements: Option<Vec<String>>,
    pub what_you_learn: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
pub struct CourseFilter {
    pub status: Option<CourseStatus>,
    pub search: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl Default for CourseFilter {
    fn default() -> Self {
        Self {
            status: None,
            search: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl Course {
    pub fn from_create(id: i64, data: CourseCreate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: data.title,
            description: data.description,
            short_description: data.short_description,
            image_url: data.image_url,
            status: CourseStatus::Draft, // every course starts as a draft
            duration_hours: data.duration_hours,
            tags: data.tags,
            requirements: data.requirements,
            what_you_learn: data.what_you_learn,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: CoursePatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(short_description) = patch.short_description {
            self.short_description = Some(short_description);
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = Some(image_url);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(duration_hours) = patch.duration_hours {
            self.duration_hours = duration_hours;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(requirements) = patch.requirements {
            self.requirements = requirements;
        }
        if let Some(what_you_learn) = patch.what_you_learn {
            self.what_you_learn = what_you_learn;
        }
        self.updated_at = now;
    }

    pub fn matches(&self, filter: &CourseFilter) -> bool {
        if let Some(status) = filter.status {
            if self.status != status {
                return false;
            }
        }
        if let Some(search) = &filter.search {
            if !super::matches_search(search, &self.title, &self.description) {
                return false;
            }
        }
        true
    }
}
