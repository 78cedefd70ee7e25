//! Relational backend: one transactional query (or explicit
//! transaction) per logical operation against Postgres. Cascade rules
//! are declared in the migration schema, not here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::prelude::FromRow;

use crate::model::store::*;
use crate::model::{DbConnection, EntityKind, StoreError, StoreResult, entity::*};

#[derive(Debug)]
pub struct PgStore {
    db: DbConnection,
}

impl PgStore {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn pool(&self) -> &sqlx::PgPool {
        self.db.pool()
    }
}

fn is_fk_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23503")
    )
}

/// Maps constraint violations onto the store taxonomy; everything else
/// stays a storage error.
fn map_write_err(err: sqlx::Error, kind: EntityKind) -> StoreError {
    if StoreError::is_unique_violation(&err) {
        StoreError::conflict(kind, err.to_string())
    } else if is_fk_violation(&err) {
        StoreError::validation(kind, err.to_string())
    } else {
        err.into()
    }
}

// Rows whose column layout differs from the entity (enum text columns,
// order_index naming) get explicit row types; the rest derive FromRow
// on the entity itself.

#[derive(FromRow)]
struct CourseRow {
    id: i64,
    title: String,
    description: String,
    short_description: Option<String>,
    image_url: Option<String>,
    status: String,
    duration_hours: i32,
    tags: Vec<String>,
    requirements: Vec<String>,
    what_you_learn: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            short_description: row.short_description,
            image_url: row.image_url,
            status: CourseStatus::parse(&row.status),
            duration_hours: row.duration_hours,
            tags: row.tags,
            requirements: row.requirements,
            what_you_learn: row.what_you_learn,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ModuleRow {
    id: i64,
    course_id: i64,
    title: String,
    description: String,
    order_index: i32,
    is_published: bool,
}

impl From<ModuleRow> for Module {
    fn from(row: ModuleRow) -> Self {
        Self {
            id: row.id,
            course_id: row.course_id,
            title: row.title,
            description: row.description,
            order: row.order_index,
            is_published: row.is_published,
        }
    }
}

#[derive(FromRow)]
struct LessonRow {
    id: i64,
    course_id: i64,
    module_id: Option<i64>,
    title: String,
    content_type: String,
    content_url: Option<String>,
    content_text: Option<String>,
    duration_minutes: i32,
    order_index: i32,
    lesson_type: String,
    is_published: bool,
}

impl From<LessonRow> for Lesson {
    fn from(row: LessonRow) -> Self {
        Self {
            id: row.id,
            course_id: row.course_id,
            module_id: row.module_id,
            title: row.title,
            content_type: ContentType::parse(&row.content_type),
            content_url: row.content_url,
            content_text: row.content_text,
            duration_minutes: row.duration_minutes,
            order: row.order_index,
            lesson_type: LessonType::parse(&row.lesson_type),
            is_published: row.is_published,
        }
    }
}

#[derive(FromRow)]
struct EnrollmentRow {
    id: i64,
    user_id: i64,
    course_id: i64,
    kind: String,
    enrolled_at: DateTime<Utc>,
    progress: f32,
    is_active: bool,
}

impl From<EnrollmentRow> for Enrollment {
    fn from(row: EnrollmentRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            course_id: row.course_id,
            kind: if row.kind == "trainer" {
                EnrollmentKind::Trainer
            } else {
                EnrollmentKind::Student
            },
            enrolled_at: row.enrolled_at,
            progress: row.progress,
            is_active: row.is_active,
        }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn users(&self, filter: &UserFilter) -> StoreResult<Vec<User>> {
        let rows: Vec<User> = sqlx::query_as(
            r#"
            SELECT * FROM users
            WHERE ($1::text IS NULL OR login ILIKE '%' || $1 || '%' OR full_name ILIKE '%' || $1 || '%')
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter.search.as_deref())
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    async fn user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let row = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row)
    }

    async fn user_by_login(&self, login: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as("SELECT * FROM users WHERE login = $1")
            .bind(login)
            .fetch_optional(self.pool())
            .await?;
        Ok(row)
    }

    async fn create_user(&self, data: UserCreate) -> StoreResult<User> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO users (login, password_hash, full_name, role, company, department, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&data.login)
        .bind(&data.password_hash)
        .bind(&data.full_name)
        .bind(&data.role)
        .bind(&data.company)
        .bind(&data.department)
        .bind(&data.position)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_write_err(e, EntityKind::User))?;
        Ok(row)
    }

    async fn update_user(&self, id: i64, patch: UserPatch) -> StoreResult<Option<User>> {
        let row = sqlx::query_as(
            r#"
            UPDATE users SET
                login = COALESCE($2, login),
                password_hash = COALESCE($3, password_hash),
                full_name = COALESCE($4, full_name),
                role = COALESCE($5, role),
                company = COALESCE($6, company),
                department = COALESCE($7, department),
                position = COALESCE($8, position),
                is_active = COALESCE($9, is_active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.login)
        .bind(&patch.password_hash)
        .bind(&patch.full_name)
        .bind(&patch.role)
        .bind(&patch.company)
        .bind(&patch.department)
        .bind(&patch.position)
        .bind(patch.is_active)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_write_err(e, EntityKind::User))?;
        Ok(row)
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CourseStore for PgStore {
    async fn courses(&self, filter: &CourseFilter) -> StoreResult<Vec<Course>> {
        let rows: Vec<CourseRow> = sqlx::query_as(
            r#"
            SELECT * FROM courses
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL
                   OR title ILIKE '%' || $2 || '%'
                   OR description ILIKE '%' || $2 || '%')
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.status.map(CourseStatus::as_str))
        .bind(filter.search.as_deref())
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Course::from).collect())
    }

    async fn course_by_id(&self, id: i64) -> StoreResult<Option<Course>> {
        let row: Option<CourseRow> = sqlx::query_as("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(Course::from))
    }

    async fn create_course(&self, data: CourseCreate) -> StoreResult<Course> {
        let row: CourseRow = sqlx::query_as(
            r#"
            INSERT INTO courses
                (title, description, short_description, image_url, duration_hours,
                 tags, requirements, what_you_learn)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.short_description)
        .bind(&data.image_url)
        .bind(data.duration_hours)
        .bind(&data.tags)
        .bind(&data.requirements)
        .bind(&data.what_you_learn)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_write_err(e, EntityKind::Course))?;
        Ok(row.into())
    }

    async fn update_course(&self, id: i64, patch: CoursePatch) -> StoreResult<Option<Course>> {
        let row: Option<CourseRow> = sqlx::query_as(
            r#"
            UPDATE courses SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                short_description = COALESCE($4, short_description),
                image_url = COALESCE($5, image_url),
                status = COALESCE($6, status),
                duration_hours = COALESCE($7, duration_hours),
                tags = COALESCE($8, tags),
                requirements = COALESCE($9, requirements),
                what_you_learn = COALESCE($10, what_you_learn),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(&patch.short_description)
        .bind(&patch.image_url)
        .bind(patch.status.map(CourseStatus::as_str))
        .bind(patch.duration_hours)
        .bind(&patch.tags)
        .bind(&patch.requirements)
        .bind(&patch.what_you_learn)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Course::from))
    }

    async fn delete_course(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ModuleStore for PgStore {
    async fn modules(&self, filter: &ModuleFilter) -> StoreResult<Vec<Module>> {
        let rows: Vec<ModuleRow> = sqlx::query_as(
            r#"
            SELECT * FROM modules
            WHERE ($1::bigint IS NULL OR course_id = $1)
            ORDER BY order_index, id
            "#,
        )
        .bind(filter.course_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Module::from).collect())
    }

    async fn module_by_id(&self, id: i64) -> StoreResult<Option<Module>> {
        let row: Option<ModuleRow> = sqlx::query_as("SELECT * FROM modules WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(Module::from))
    }

    async fn create_module(&self, data: ModuleCreate) -> StoreResult<Module> {
        let row: ModuleRow = sqlx::query_as(
            r#"
            INSERT INTO modules (course_id, title, description, order_index, is_published)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.order)
        .bind(data.is_published)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_write_err(e, EntityKind::Module))?;
        Ok(row.into())
    }

    async fn update_module(&self, id: i64, patch: ModulePatch) -> StoreResult<Option<Module>> {
        let row: Option<ModuleRow> = sqlx::query_as(
            r#"
            UPDATE modules SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                order_index = COALESCE($4, order_index),
                is_published = COALESCE($5, is_published)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.order)
        .bind(patch.is_published)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Module::from))
    }

    async fn delete_module(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl LessonStore for PgStore {
    async fn lessons(&self, filter: &LessonFilter) -> StoreResult<Vec<Lesson>> {
        let rows: Vec<LessonRow> = sqlx::query_as(
            r#"
            SELECT * FROM lessons
            WHERE ($1::bigint IS NULL OR course_id = $1)
              AND ($2::bigint IS NULL OR module_id = $2)
              AND ($3::text IS NULL OR lesson_type = $3)
            ORDER BY order_index, id
            "#,
        )
        .bind(filter.course_id)
        .bind(filter.module_id)
        .bind(filter.lesson_type.map(LessonType::as_str))
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Lesson::from).collect())
    }

    async fn lesson_by_id(&self, id: i64) -> StoreResult<Option<Lesson>> {
        let row: Option<LessonRow> = sqlx::query_as("SELECT * FROM lessons WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(Lesson::from))
    }

    async fn create_lesson(&self, data: LessonCreate) -> StoreResult<Lesson> {
        let row: LessonRow = sqlx::query_as(
            r#"
            INSERT INTO lessons
                (course_id, module_id, title, content_type, content_url, content_text,
                 duration_minutes, order_index, lesson_type, is_published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(data.course_id)
        .bind(data.module_id)
        .bind(&data.title)
        .bind(data.content_type.as_str())
        .bind(&data.content_url)
        .bind(&data.content_text)
        .bind(data.duration_minutes)
        .bind(data.order)
        .bind(data.lesson_type.as_str())
        .bind(data.is_published)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_write_err(e, EntityKind::Lesson))?;
        Ok(row.into())
    }

    async fn update_lesson(&self, id: i64, patch: LessonPatch) -> StoreResult<Option<Lesson>> {
        let row: Option<LessonRow> = sqlx::query_as(
            r#"
            UPDATE lessons SET
                module_id = COALESCE($2, module_id),
                title = COALESCE($3, title),
                content_type = COALESCE($4, content_type),
                content_url = COALESCE($5, content_url),
                content_text = COALESCE($6, content_text),
                duration_minutes = COALESCE($7, duration_minutes),
                order_index = COALESCE($8, order_index),
                lesson_type = COALESCE($9, lesson_type),
                is_published = COALESCE($10, is_published)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.module_id)
        .bind(&patch.title)
        .bind(patch.content_type.map(ContentType::as_str))
        .bind(&patch.content_url)
        .bind(&patch.content_text)
        .bind(patch.duration_minutes)
        .bind(patch.order)
        .bind(patch.lesson_type.map(LessonType::as_str))
        .bind(patch.is_published)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_write_err(e, EntityKind::Lesson))?;
        Ok(row.map(Lesson::from))
    }

    async fn delete_lesson(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TestStore for PgStore {
    async fn tests(&self, filter: &TestFilter) -> StoreResult<Vec<Test>> {
        let rows: Vec<Test> = sqlx::query_as(
            r#"
            SELECT * FROM tests
            WHERE ($1::bigint IS NULL OR course_id = $1)
            ORDER BY id
            "#,
        )
        .bind(filter.course_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    async fn test_by_id(&self, id: i64) -> StoreResult<Option<Test>> {
        let row = sqlx::query_as("SELECT * FROM tests WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row)
    }

    async fn create_test(&self, data: TestCreate) -> StoreResult<Test> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO tests (course_id, title, description, number_of_attempts, time_limit_minutes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.number_of_attempts)
        .bind(data.time_limit_minutes)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_write_err(e, EntityKind::Test))?;
        Ok(row)
    }

    async fn update_test(&self, id: i64, patch: TestPatch) -> StoreResult<Option<Test>> {
        let row = sqlx::query_as(
            r#"
            UPDATE tests SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                number_of_attempts = COALESCE($4, number_of_attempts),
                time_limit_minutes = COALESCE($5, time_limit_minutes)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.number_of_attempts)
        .bind(patch.time_limit_minutes)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    async fn delete_test(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tests WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl QuestionStore for PgStore {
    async fn questions(&self, filter: &QuestionFilter) -> StoreResult<Vec<Question>> {
        let rows: Vec<Question> = sqlx::query_as(
            r#"
            SELECT * FROM questions
            WHERE ($1::bigint IS NULL OR test_id = $1)
            ORDER BY id
            "#,
        )
        .bind(filter.test_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    async fn question_by_id(&self, id: i64) -> StoreResult<Option<Question>> {
        let row = sqlx::query_as("SELECT * FROM questions WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row)
    }

    async fn create_question(&self, data: QuestionCreate) -> StoreResult<Question> {
        // question + nested answers commit or roll back together
        let mut tx = self.pool().begin().await?;

        let question: Question = sqlx::query_as(
            r#"
            INSERT INTO questions (test_id, question_text, question_type)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(data.test_id)
        .bind(&data.question_text)
        .bind(&data.question_type)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_err(e, EntityKind::Question))?;

        for answer in &data.answers {
            sqlx::query("INSERT INTO answers (question_id, answer_text, is_correct) VALUES ($1, $2, $3)")
                .bind(question.id)
                .bind(&answer.answer_text)
                .bind(answer.is_correct)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_write_err(e, EntityKind::Answer))?;
        }

        tx.commit().await?;
        Ok(question)
    }

    async fn update_question(&self, id: i64, patch: QuestionPatch) -> StoreResult<Option<Question>> {
        let row = sqlx::query_as(
            r#"
            UPDATE questions SET
                question_text = COALESCE($2, question_text),
                question_type = COALESCE($3, question_type)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.question_text)
        .bind(&patch.question_type)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    async fn delete_question(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AnswerStore for PgStore {
    async fn answers(&self, filter: &AnswerFilter) -> StoreResult<Vec<Answer>> {
        let rows: Vec<Answer> = sqlx::query_as(
            r#"
            SELECT * FROM answers
            WHERE ($1::bigint IS NULL OR question_id = $1)
            ORDER BY id
            "#,
        )
        .bind(filter.question_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    async fn answer_by_id(&self, id: i64) -> StoreResult<Option<Answer>> {
        let row = sqlx::query_as("SELECT * FROM answers WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row)
    }

    async fn create_answer(&self, data: AnswerCreate) -> StoreResult<Answer> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO answers (question_id, answer_text, is_correct)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(data.question_id)
        .bind(&data.answer_text)
        .bind(data.is_correct)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_write_err(e, EntityKind::Answer))?;
        Ok(row)
    }

    async fn update_answer(&self, id: i64, patch: AnswerPatch) -> StoreResult<Option<Answer>> {
        let row = sqlx::query_as(
            r#"
            UPDATE answers SET
                answer_text = COALESCE($2, answer_text),
                is_correct = COALESCE($3, is_correct)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.answer_text)
        .bind(patch.is_correct)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    async fn delete_answer(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM answers WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserAnswerStore for PgStore {
    async fn user_answers(&self, filter: &UserAnswerFilter) -> StoreResult<Vec<UserAnswer>> {
        let rows: Vec<UserAnswer> = sqlx::query_as(
            r#"
            SELECT * FROM user_answers
            WHERE ($1::bigint IS NULL OR user_id = $1)
              AND ($2::bigint IS NULL OR question_id = $2)
            ORDER BY id
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.question_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    async fn user_answer_by_id(&self, id: i64) -> StoreResult<Option<UserAnswer>> {
        let row = sqlx::query_as("SELECT * FROM user_answers WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row)
    }

    async fn create_user_answer(&self, data: UserAnswerCreate) -> StoreResult<UserAnswer> {
        let mut tx = self.pool().begin().await?;

        if let Some(answer_id) = data.selected_answer_id {
            let owner: Option<i64> =
                sqlx::query_scalar("SELECT question_id FROM answers WHERE id = $1")
                    .bind(answer_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if owner != Some(data.question_id) {
                return Err(StoreError::validation(
                    EntityKind::UserAnswer,
                    format!(
                        "answer {answer_id} does not belong to question {}",
                        data.question_id
                    ),
                ));
            }
        }

        let row: UserAnswer = sqlx::query_as(
            r#"
            INSERT INTO user_answers (user_id, question_id, selected_answer_id, is_correct)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(data.user_id)
        .bind(data.question_id)
        .bind(data.selected_answer_id)
        .bind(data.is_correct)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_err(e, EntityKind::UserAnswer))?;

        tx.commit().await?;
        Ok(row)
    }

    async fn update_user_answer(
        &self,
        id: i64,
        patch: UserAnswerPatch,
    ) -> StoreResult<Option<UserAnswer>> {
        let mut tx = self.pool().begin().await?;

        if let Some(answer_id) = patch.selected_answer_id {
            let question_id: Option<i64> =
                sqlx::query_scalar("SELECT question_id FROM user_answers WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?;
            let Some(question_id) = question_id else {
                return Ok(None);
            };
            let owner: Option<i64> =
                sqlx::query_scalar("SELECT question_id FROM answers WHERE id = $1")
                    .bind(answer_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if owner != Some(question_id) {
                return Err(StoreError::validation(
                    EntityKind::UserAnswer,
                    format!("answer {answer_id} does not belong to question {question_id}"),
                ));
            }
        }

        let row: Option<UserAnswer> = sqlx::query_as(
            r#"
            UPDATE user_answers SET
                selected_answer_id = COALESCE($2, selected_answer_id),
                is_correct = COALESCE($3, is_correct)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.selected_answer_id)
        .bind(patch.is_correct)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn delete_user_answer(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM user_answers WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn task_items(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        let rows: Vec<Task> = sqlx::query_as(
            r#"
            SELECT * FROM tasks
            WHERE ($1::bigint IS NULL OR course_id = $1)
              AND ($2::bigint IS NULL OR created_by_id = $2)
              AND ($3::bigint IS NULL OR assigned_to_user_id = $3)
            ORDER BY id
            "#,
        )
        .bind(filter.course_id)
        .bind(filter.created_by)
        .bind(filter.assigned_to)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    async fn task_by_id(&self, id: i64) -> StoreResult<Option<Task>> {
        let row = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row)
    }

    async fn create_task(&self, data: TaskCreate) -> StoreResult<Task> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO tasks
                (course_id, title, description, status, deadline, assigned_to_user_id, created_by_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.status)
        .bind(data.deadline)
        .bind(data.assigned_to_user_id)
        .bind(data.created_by_id)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_write_err(e, EntityKind::Task))?;
        Ok(row)
    }

    async fn update_task(&self, id: i64, patch: TaskPatch) -> StoreResult<Option<Task>> {
        let row = sqlx::query_as(
            r#"
            UPDATE tasks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                deadline = COALESCE($5, deadline),
                assigned_to_user_id = COALESCE($6, assigned_to_user_id)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(&patch.status)
        .bind(patch.deadline)
        .bind(patch.assigned_to_user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_write_err(e, EntityKind::Task))?;
        Ok(row)
    }

    async fn delete_task(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl MaterialStore for PgStore {
    async fn materials(&self, filter: &MaterialFilter) -> StoreResult<Vec<Material>> {
        let rows: Vec<Material> = sqlx::query_as(
            r#"
            SELECT * FROM materials
            WHERE ($1::bigint IS NULL OR course_id = $1)
            ORDER BY id
            "#,
        )
        .bind(filter.course_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    async fn material_by_id(&self, id: i64) -> StoreResult<Option<Material>> {
        let row = sqlx::query_as("SELECT * FROM materials WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row)
    }

    async fn create_material(&self, data: MaterialCreate) -> StoreResult<Material> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO materials (course_id, title, description, file_path, number_of_pages)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.file_path)
        .bind(data.number_of_pages)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_write_err(e, EntityKind::Material))?;
        Ok(row)
    }

    async fn update_material(&self, id: i64, patch: MaterialPatch) -> StoreResult<Option<Material>> {
        let row = sqlx::query_as(
            r#"
            UPDATE materials SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                file_path = COALESCE($4, file_path),
                number_of_pages = COALESCE($5, number_of_pages)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(&patch.file_path)
        .bind(patch.number_of_pages)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    async fn delete_material(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM materials WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn events(&self, filter: &EventFilter) -> StoreResult<Vec<Event>> {
        let rows: Vec<Event> = sqlx::query_as(
            r#"
            SELECT * FROM events
            WHERE ($1::bigint IS NULL OR trainer_id = $1)
              AND ($2::text IS NULL
                   OR title ILIKE '%' || $2 || '%'
                   OR description ILIKE '%' || $2 || '%')
            ORDER BY id
            "#,
        )
        .bind(filter.trainer_id)
        .bind(filter.search.as_deref())
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    async fn event_by_id(&self, id: i64) -> StoreResult<Option<Event>> {
        let row = sqlx::query_as("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row)
    }

    async fn create_event(&self, data: EventCreate) -> StoreResult<Event> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO events
                (title, description, trainer_id, event_date, location, format, seats_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.trainer_id)
        .bind(data.event_date)
        .bind(&data.location)
        .bind(&data.format)
        .bind(data.seats_count)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_write_err(e, EntityKind::Event))?;
        Ok(row)
    }

    async fn update_event(&self, id: i64, patch: EventPatch) -> StoreResult<Option<Event>> {
        let row = sqlx::query_as(
            r#"
            UPDATE events SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                trainer_id = COALESCE($4, trainer_id),
                event_date = COALESCE($5, event_date),
                location = COALESCE($6, location),
                format = COALESCE($7, format),
                seats_count = COALESCE($8, seats_count),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.trainer_id)
        .bind(patch.event_date)
        .bind(&patch.location)
        .bind(&patch.format)
        .bind(patch.seats_count)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_write_err(e, EntityKind::Event))?;
        Ok(row)
    }

    async fn delete_event(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl EnrollmentStore for PgStore {
    async fn enrollments(&self, filter: &EnrollmentFilter) -> StoreResult<Vec<Enrollment>> {
        let rows: Vec<EnrollmentRow> = sqlx::query_as(
            r#"
            SELECT * FROM enrollments
            WHERE ($1::bigint IS NULL OR user_id = $1)
              AND ($2::bigint IS NULL OR course_id = $2)
              AND ($3::text IS NULL OR kind = $3)
            ORDER BY id
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.course_id)
        .bind(filter.kind.map(EnrollmentKind::as_str))
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Enrollment::from).collect())
    }

    async fn insert_enrollment(
        &self,
        user_id: i64,
        course_id: i64,
        kind: EnrollmentKind,
    ) -> StoreResult<Enrollment> {
        let row: EnrollmentRow = sqlx::query_as(
            r#"
            INSERT INTO enrollments (user_id, course_id, kind)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .bind(kind.as_str())
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_write_err(e, EntityKind::Enrollment))?;
        Ok(row.into())
    }

    async fn remove_enrollment(
        &self,
        user_id: i64,
        course_id: i64,
        kind: EnrollmentKind,
    ) -> StoreResult<bool> {
        let result =
            sqlx::query("DELETE FROM enrollments WHERE user_id = $1 AND course_id = $2 AND kind = $3")
                .bind(user_id)
                .bind(course_id)
                .bind(kind.as_str())
                .execute(self.pool())
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
