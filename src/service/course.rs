use serde::Serialize;

use crate::model::entity::{
    Course, CourseFilter, Enrollment, EnrollmentKind, Lesson, LessonFilter, Module, ModuleFilter,
};
use crate::model::{ModelManager, StoreResult};
use crate::policy::{Action, ActorScope};
use crate::service::assets;

/// Composes cross-entity course views: detail with deterministically
/// ordered lessons, enrollment annotation and content summaries.
#[derive(Debug, Clone)]
pub struct CourseService {
    mm: ModelManager,
    base_url: String,
}

/// Enrollment annotation attached to a detail view when the actor has
/// an edge to the course.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct EnrollmentInfo {
    pub kind: EnrollmentKind,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
    pub progress: f32,
    pub is_active: bool,
}

impl From<Enrollment> for EnrollmentInfo {
    fn from(e: Enrollment) -> Self {
        Self {
            kind: e.kind,
            enrolled_at: e.enrolled_at,
            progress: e.progress,
            is_active: e.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub modules: Vec<Module>,
    pub lessons: Vec<Lesson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<EnrollmentInfo>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ContentSummary {
    pub lesson_count: usize,
    pub total_duration_minutes: i64,
    pub total_duration_hours: f64,
}

impl CourseService {
    pub fn new(mm: ModelManager, base_url: impl Into<String>) -> Self {
        Self {
            mm,
            base_url: base_url.into(),
        }
    }

    fn finish_course(&self, mut course: Course) -> Course {
        let image = course
            .image_url
            .as_deref()
            .unwrap_or(assets::DEFAULT_COURSE_IMAGE);
        course.image_url = Some(assets::absolutize(&self.base_url, image));
        course
    }

    fn finish_lesson(&self, mut lesson: Lesson) -> Lesson {
        lesson.content_url = assets::absolutize_opt(&self.base_url, lesson.content_url.as_deref());
        lesson
    }

    /// Lists courses the actor may read, preserving the store's
    /// ordering within the allowed subset.
    pub async fn list_courses(
        &self,
        scope: &ActorScope,
        filter: &CourseFilter,
    ) -> StoreResult<Vec<Course>> {
        let courses = self.mm.store().courses(filter).await?;
        let allowed = scope.filter_readable(courses, |c| (c.id, true));
        Ok(allowed.into_iter().map(|c| self.finish_course(c)).collect())
    }

    /// Full detail view. Absent course is `Ok(None)`; an actor outside
    /// the course's visibility set gets Forbidden before any data is
    /// assembled.
    pub async fn course_detail(
        &self,
        scope: &ActorScope,
        course_id: i64,
    ) -> StoreResult<Option<CourseDetail>> {
        let Some(course) = self.mm.store().course_by_id(course_id).await? else {
            return Ok(None);
        };
        scope.authorize(Action::Read, course_id, true)?;

        let modules = self
            .mm
            .store()
            .modules(&ModuleFilter {
                course_id: Some(course_id),
            })
            .await?;
        let lessons = self.ordered_lessons(course_id).await?;

        let modules = scope.filter_readable(modules, |m| (m.course_id, m.is_published));
        let lessons = scope.filter_readable(lessons, |l| (l.course_id, l.is_published));
        let lessons = lessons
            .into_iter()
            .map(|l| self.finish_lesson(l))
            .collect();

        let enrollment = self.annotation(scope, course_id).await?;

        Ok(Some(CourseDetail {
            course: self.finish_course(course),
            modules,
            lessons,
            enrollment,
        }))
    }

    /// Lessons of a course in render order. `order` is not unique, so
    /// ties fall back to id ascending to keep repeated fetches stable.
    pub async fn ordered_lessons(&self, course_id: i64) -> StoreResult<Vec<Lesson>> {
        let mut lessons = self
            .mm
            .store()
            .lessons(&LessonFilter {
                course_id: Some(course_id),
                ..Default::default()
            })
            .await?;
        lessons.sort_by_key(|l| (l.order, l.id));
        Ok(lessons)
    }

    pub async fn content_summary(
        &self,
        scope: &ActorScope,
        course_id: i64,
    ) -> StoreResult<Option<ContentSummary>> {
        if self.mm.store().course_by_id(course_id).await?.is_none() {
            return Ok(None);
        }
        scope.authorize(Action::Read, course_id, true)?;

        let lessons = self.ordered_lessons(course_id).await?;
        let lessons = scope.filter_readable(lessons, |l| (l.course_id, l.is_published));
        let total_minutes: i64 = lessons.iter().map(|l| i64::from(l.duration_minutes)).sum();
        Ok(Some(ContentSummary {
            lesson_count: lessons.len(),
            total_duration_minutes: total_minutes,
            total_duration_hours: total_minutes as f64 / 60.0,
        }))
    }

    async fn annotation(
        &self,
        scope: &ActorScope,
        course_id: i64,
    ) -> StoreResult<Option<EnrollmentInfo>> {
        let graph = self.mm.graph();
        let actor = scope.actor();
        for kind in [EnrollmentKind::Student, EnrollmentKind::Trainer] {
            if let Some(edge) = graph.find(actor.user_id, course_id, kind).await? {
                return Ok(Some(edge.into()));
            }
        }
        Ok(None)
    }
}
