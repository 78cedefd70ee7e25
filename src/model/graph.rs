//! Enrollment edges viewed as a graph between users and courses.
//!
//! The store treats a duplicate (user, course, kind) insert as a
//! Conflict; this layer absorbs that into idempotent enroll/unenroll,
//! so callers can retry freely.

use std::collections::HashSet;

use crate::model::entity::{Enrollment, EnrollmentFilter, EnrollmentKind};
use crate::model::{ModelManager, StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct EnrollmentGraph {
    mm: ModelManager,
}

impl EnrollmentGraph {
    pub fn new(mm: ModelManager) -> Self {
        Self { mm }
    }

    /// Adds the edge, returning the existing one when already present.
    pub async fn enroll(
        &self,
        user_id: i64,
        course_id: i64,
        kind: EnrollmentKind,
    ) -> StoreResult<Enrollment> {
        match self
            .mm
            .store()
            .insert_enrollment(user_id, course_id, kind)
            .await
        {
            Ok(enrollment) => Ok(enrollment),
            Err(StoreError::Conflict { .. }) => {
                let existing = self.find(user_id, course_id, kind).await?;
                existing.ok_or(StoreError::SqlxError(sqlx::Error::RowNotFound))
            }
            Err(err) => Err(err),
        }
    }

    /// Removes the edge; `false` when it was already absent.
    pub async fn unenroll(
        &self,
        user_id: i64,
        course_id: i64,
        kind: EnrollmentKind,
    ) -> StoreResult<bool> {
        self.mm
            .store()
            .remove_enrollment(user_id, course_id, kind)
            .await
    }

    pub async fn find(
        &self,
        user_id: i64,
        course_id: i64,
        kind: EnrollmentKind,
    ) -> StoreResult<Option<Enrollment>> {
        let filter = EnrollmentFilter {
            user_id: Some(user_id),
            course_id: Some(course_id),
            kind: Some(kind),
        };
        let mut found = self.mm.store().enrollments(&filter).await?;
        Ok(found.pop())
    }

    pub async fn is_enrolled(
        &self,
        user_id: i64,
        course_id: i64,
        kind: EnrollmentKind,
    ) -> StoreResult<bool> {
        Ok(self.find(user_id, course_id, kind).await?.is_some())
    }

    /// Course ids the user reaches through edges of the given kind.
    pub async fn courses_for(
        &self,
        user_id: i64,
        kind: EnrollmentKind,
    ) -> StoreResult<HashSet<i64>> {
        let filter = EnrollmentFilter {
            user_id: Some(user_id),
            course_id: None,
            kind: Some(kind),
        };
        let edges = self.mm.store().enrollments(&filter).await?;
        Ok(edges.into_iter().map(|e| e.course_id).collect())
    }

    /// All edges attached to a course, both kinds.
    pub async fn roster(&self, course_id: i64) -> StoreResult<Vec<Enrollment>> {
        let filter = EnrollmentFilter {
            user_id: None,
            course_id: Some(course_id),
            kind: None,
        };
        self.mm.store().enrollments(&filter).await
    }
}
