use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether the enrollment grants student or trainer visibility. The
/// policy table treats the two differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentKind {
    Student,
    Trainer,
}

impl EnrollmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Trainer => "trainer",
        }
    }
}

/// Visibility edge between a user and a course. Not ownership: it has
/// its own lifecycle and references both sides. At most one row may
/// exist per (user, course, kind).
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Enrollment {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    pub kind: EnrollmentKind,
    pub enrolled_at: DateTime<Utc>,
    pub progress: f32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct EnrollmentFilter {
    pub user_id: Option<i64>,
    pub course_id: Option<i64>,
    pub kind: Option<EnrollmentKind>,
}

impl Enrollment {
    pub fn new(id: i64, user_id: i64, course_id: i64, kind: EnrollmentKind, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            course_id,
            kind,
            enrolled_at: now,
            progress: 0.0,
            is_active: true,
        }
    }

    pub fn matches(&self, filter: &EnrollmentFilter) -> bool {
        if let Some(user_id) = filter.user_id {
            if self.user_id != user_id {
                return false;
            }
        }
        if let Some(course_id) = filter.course_id {
            if self.course_id != course_id {
                return false;
            }
        }
        if let Some(kind) = filter.kind {
            if self.kind != kind {
                return false;
            }
        }
        true
    }
}
