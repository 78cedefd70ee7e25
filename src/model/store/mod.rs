//! Uniform CRUD contract per entity kind, implemented by exactly two
//! interchangeable backends: [`JsonStore`] (flat-collection documents)
//! and [`PgStore`] (relational, transactional).
//!
//! The shared semantics both backends must honor:
//! - `*_by_id` returns `Ok(None)` for an absent id, `delete_*` returns
//!   `Ok(false)`; absence is a result, not an error.
//! - `create_*` assigns an identifier strictly greater than any id
//!   currently persisted for that kind, derived from durable state.
//! - `update_*` applies only the fields present in the patch.
//! - Deleting an aggregate root removes everything it transitively
//!   owns: Course -> {Module, Lesson, Test, Material, Task, Enrollment},
//!   Test -> Question, Question -> {Answer, UserAnswer}. Deleting a
//!   user removes their submissions, enrollments and created tasks,
//!   and only unlinks assigned tasks and trained events.

mod json;
pub use json::JsonStore;

mod postgres;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::model::{StoreResult, entity::*};

#[async_trait]
pub trait UserStore {
    async fn users(&self, filter: &UserFilter) -> StoreResult<Vec<User>>;
    async fn user_by_id(&self, id: i64) -> StoreResult<Option<User>>;
    async fn user_by_login(&self, login: &str) -> StoreResult<Option<User>>;
    async fn create_user(&self, data: UserCreate) -> StoreResult<User>;
    async fn update_user(&self, id: i64, patch: UserPatch) -> StoreResult<Option<User>>;
    async fn delete_user(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait CourseStore {
    async fn courses(&self, filter: &CourseFilter) -> StoreResult<Vec<Course>>;
    async fn course_by_id(&self, id: i64) -> StoreResult<Option<Course>>;
    async fn create_course(&self, data: CourseCreate) -> StoreResult<Course>;
    async fn update_course(&self, id: i64, patch: CoursePatch) -> StoreResult<Option<Course>>;
    async fn delete_course(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait ModuleStore {
    async fn modules(&self, filter: &ModuleFilter) -> StoreResult<Vec<Module>>;
    async fn module_by_id(&self, id: i64) -> StoreResult<Option<Module>>;
    async fn create_module(&self, data: ModuleCreate) -> StoreResult<Module>;
    async fn update_module(&self, id: i64, patch: ModulePatch) -> StoreResult<Option<Module>>;
    async fn delete_module(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait LessonStore {
    async fn lessons(&self, filter: &LessonFilter) -> StoreResult<Vec<Lesson>>;
    async fn lesson_by_id(&self, id: i64) -> StoreResult<Option<Lesson>>;
    async fn create_lesson(&self, data: LessonCreate) -> StoreResult<Lesson>;
    async fn update_lesson(&self, id: i64, patch: LessonPatch) -> StoreResult<Option<Lesson>>;
    async fn delete_lesson(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait TestStore {
    async fn tests(&self, filter: &TestFilter) -> StoreResult<Vec<Test>>;
    async fn test_by_id(&self, id: i64) -> StoreResult<Option<Test>>;
    async fn create_test(&self, data: TestCreate) -> StoreResult<Test>;
    async fn update_test(&self, id: i64, patch: TestPatch) -> StoreResult<Option<Test>>;
    async fn delete_test(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait QuestionStore {
    async fn questions(&self, filter: &QuestionFilter) -> StoreResult<Vec<Question>>;
    async fn question_by_id(&self, id: i64) -> StoreResult<Option<Question>>;
    /// Creates the question together with its nested answer options.
    async fn create_question(&self, data: QuestionCreate) -> StoreResult<Question>;
    async fn update_question(&self, id: i64, patch: QuestionPatch) -> StoreResult<Option<Question>>;
    async fn delete_question(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait AnswerStore {
    async fn answers(&self, filter: &AnswerFilter) -> StoreResult<Vec<Answer>>;
    async fn answer_by_id(&self, id: i64) -> StoreResult<Option<Answer>>;
    async fn create_answer(&self, data: AnswerCreate) -> StoreResult<Answer>;
    async fn update_answer(&self, id: i64, patch: AnswerPatch) -> StoreResult<Option<Answer>>;
    async fn delete_answer(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait UserAnswerStore {
    async fn user_answers(&self, filter: &UserAnswerFilter) -> StoreResult<Vec<UserAnswer>>;
    async fn user_answer_by_id(&self, id: i64) -> StoreResult<Option<UserAnswer>>;
    async fn create_user_answer(&self, data: UserAnswerCreate) -> StoreResult<UserAnswer>;
    async fn update_user_answer(
        &self,
        id: i64,
        patch: UserAnswerPatch,
    ) -> StoreResult<Option<UserAnswer>>;
    async fn delete_user_answer(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait TaskStore {
    async fn task_items(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>>;
    async fn task_by_id(&self, id: i64) -> StoreResult<Option<Task>>;
    async fn create_task(&self, data: TaskCreate) -> StoreResult<Task>;
    async fn update_task(&self, id: i64, patch: TaskPatch) -> StoreResult<Option<Task>>;
    async fn delete_task(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait MaterialStore {
    async fn materials(&self, filter: &MaterialFilter) -> StoreResult<Vec<Material>>;
    async fn material_by_id(&self, id: i64) -> StoreResult<Option<Material>>;
    async fn create_material(&self, data: MaterialCreate) -> StoreResult<Material>;
    async fn update_material(&self, id: i64, patch: MaterialPatch) -> StoreResult<Option<Material>>;
    async fn delete_material(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait EventStore {
    async fn events(&self, filter: &EventFilter) -> StoreResult<Vec<Event>>;
    async fn event_by_id(&self, id: i64) -> StoreResult<Option<Event>>;
    /// `trainer_id` must reference an existing user; deleting that user
    /// later orphans the event instead of removing it.
    async fn create_event(&self, data: EventCreate) -> StoreResult<Event>;
    async fn update_event(&self, id: i64, patch: EventPatch) -> StoreResult<Option<Event>>;
    async fn delete_event(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait EnrollmentStore {
    async fn enrollments(&self, filter: &EnrollmentFilter) -> StoreResult<Vec<Enrollment>>;
    /// Inserts the (user, course, kind) edge; duplicate keys are a
    /// Conflict. Idempotency lives in [`crate::model::EnrollmentGraph`].
    async fn insert_enrollment(
        &self,
        user_id: i64,
        course_id: i64,
        kind: EnrollmentKind,
    ) -> StoreResult<Enrollment>;
    async fn remove_enrollment(
        &self,
        user_id: i64,
        course_id: i64,
        kind: EnrollmentKind,
    ) -> StoreResult<bool>;
}

/// Union of every per-kind store; the strategy object injected into
/// [`crate::model::ModelManager`].
pub trait Storage:
    UserStore
    + CourseStore
    + ModuleStore
    + LessonStore
    + TestStore
    + QuestionStore
    + AnswerStore
    + UserAnswerStore
    + TaskStore
    + MaterialStore
    + EventStore
    + EnrollmentStore
    + std::fmt::Debug
    + Send
    + Sync
{
}

impl<T> Storage for T where
    T: UserStore
        + CourseStore
        + ModuleStore
        + LessonStore
        + TestStore
        + QuestionStore
        + AnswerStore
        + UserAnswerStore
        + TaskStore
        + MaterialStore
        + EventStore
        + EnrollmentStore
        + std::fmt::Debug
        + Send
        + Sync
{
}
