//! Flat-collection backend: one JSON document per entity kind under a
//! data directory, the whole collection rewritten on every mutation.
//!
//! Identifier assignment is `max(existing ids) + 1` over the loaded
//! collection, never a process-local counter, so the sequence survives
//! a restart. Every read-modify-write span holds that kind's mutex;
//! cascades lock the kinds they touch in the fixed order the fields of
//! [`JsonStore`] are declared in. There is no partial-write recovery: a
//! crash mid-write can corrupt a document, which is an accepted risk of
//! this backend.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;

use crate::model::store::*;
use crate::model::{EntityKind, StoreError, StoreResult, entity::*};

trait HasId {
    fn id(&self) -> i64;
}

macro_rules! impl_has_id {
    ($($ty:ident),+) => {
        $(impl HasId for $ty {
            fn id(&self) -> i64 {
                self.id
            }
        })+
    };
}

impl_has_id!(
    UserDoc, Course, Module, Lesson, Test, Question, Answer, UserAnswer, Task, Material, Event,
    Enrollment
);

/// Durable form of [`User`]. The API serialization of `User` omits the
/// password hash; the collection document must keep it.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserDoc {
    id: i64,
    login: String,
    password_hash: String,
    full_name: String,
    role: String,
    company: Option<String>,
    department: Option<String>,
    position: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<User> for UserDoc {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            login: u.login,
            password_hash: u.password_hash,
            full_name: u.full_name,
            role: u.role,
            company: u.company,
            department: u.department,
            position: u.position,
            is_active: u.is_active,
            created_at: u.created_at,
        }
    }
}

impl From<UserDoc> for User {
    fn from(d: UserDoc) -> Self {
        Self {
            id: d.id,
            login: d.login,
            password_hash: d.password_hash,
            full_name: d.full_name,
            role: d.role,
            company: d.company,
            department: d.department,
            position: d.position,
            is_active: d.is_active,
            created_at: d.created_at,
        }
    }
}

#[derive(Debug)]
struct Collection<T> {
    path: PathBuf,
    items: Vec<T>,
}

impl<T> Collection<T>
where
    T: HasId + Serialize + DeserializeOwned,
{
    async fn load(dir: &Path, kind: EntityKind) -> StoreResult<Self> {
        let path = dir.join(format!("{}.json", kind.collection()));
        let items = if path.exists() {
            let bytes = tokio::fs::read(&path).await?;
            serde_json::from_slice(&bytes)?
        } else {
            Vec::new()
        };
        Ok(Self { path, items })
    }

    /// Serializes the whole collection back to its document.
    async fn persist(&self) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(&self.items)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }

    fn next_id(&self) -> i64 {
        self.items.iter().map(HasId::id).max().unwrap_or(0) + 1
    }

    fn find(&self, id: i64) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    fn contains(&self, id: i64) -> bool {
        self.find(id).is_some()
    }
}

#[derive(Debug)]
pub struct JsonStore {
    // Cascades lock collections in declaration order; keep new kinds in
    // ownership order (roots first).
    users: Mutex<Collection<UserDoc>>,
    courses: Mutex<Collection<Course>>,
    modules: Mutex<Collection<Module>>,
    lessons: Mutex<Collection<Lesson>>,
    tests: Mutex<Collection<Test>>,
    questions: Mutex<Collection<Question>>,
    answers: Mutex<Collection<Answer>>,
    user_answers: Mutex<Collection<UserAnswer>>,
    tasks: Mutex<Collection<Task>>,
    materials: Mutex<Collection<Material>>,
    events: Mutex<Collection<Event>>,
    enrollments: Mutex<Collection<Enrollment>>,
}

impl JsonStore {
    pub async fn open(dir: PathBuf) -> StoreResult<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            users: Mutex::new(Collection::load(&dir, EntityKind::User).await?),
            courses: Mutex::new(Collection::load(&dir, EntityKind::Course).await?),
            modules: Mutex::new(Collection::load(&dir, EntityKind::Module).await?),
            lessons: Mutex::new(Collection::load(&dir, EntityKind::Lesson).await?),
            tests: Mutex::new(Collection::load(&dir, EntityKind::Test).await?),
            questions: Mutex::new(Collection::load(&dir, EntityKind::Question).await?),
            answers: Mutex::new(Collection::load(&dir, EntityKind::Answer).await?),
            user_answers: Mutex::new(Collection::load(&dir, EntityKind::UserAnswer).await?),
            tasks: Mutex::new(Collection::load(&dir, EntityKind::Task).await?),
            materials: Mutex::new(Collection::load(&dir, EntityKind::Material).await?),
            events: Mutex::new(Collection::load(&dir, EntityKind::Event).await?),
            enrollments: Mutex::new(Collection::load(&dir, EntityKind::Enrollment).await?),
        })
    }

    async fn require_course(&self, course_id: i64, kind: EntityKind) -> StoreResult<()> {
        if self.courses.lock().await.contains(course_id) {
            Ok(())
        } else {
            Err(StoreError::validation(
                kind,
                format!("course {course_id} does not exist"),
            ))
        }
    }
}

// Shared mutation helpers; each takes the kind's mutex and persists
// before returning so no mutation is observable without being written.

async fn create_in<T, F>(col: &Mutex<Collection<T>>, build: F) -> StoreResult<T>
where
    T: HasId + Clone + Serialize + DeserializeOwned,
    F: FnOnce(i64) -> T,
{
    let mut col = col.lock().await;
    let item = build(col.next_id());
    col.items.push(item.clone());
    col.persist().await?;
    Ok(item)
}

async fn update_in<T, F>(col: &Mutex<Collection<T>>, id: i64, apply: F) -> StoreResult<Option<T>>
where
    T: HasId + Clone + Serialize + DeserializeOwned,
    F: FnOnce(&mut T),
{
    let mut col = col.lock().await;
    let Some(item) = col.items.iter_mut().find(|item| item.id() == id) else {
        return Ok(None);
    };
    apply(item);
    let updated = item.clone();
    col.persist().await?;
    Ok(Some(updated))
}

async fn delete_in<T>(col: &Mutex<Collection<T>>, id: i64) -> StoreResult<bool>
where
    T: HasId + Serialize + DeserializeOwned,
{
    let mut col = col.lock().await;
    let before = col.items.len();
    col.items.retain(|item| item.id() != id);
    if col.items.len() == before {
        return Ok(false);
    }
    col.persist().await?;
    Ok(true)
}

async fn get_in<T>(col: &Mutex<Collection<T>>, id: i64) -> StoreResult<Option<T>>
where
    T: HasId + Clone + Serialize + DeserializeOwned,
{
    Ok(col.lock().await.find(id).cloned())
}

#[async_trait]
impl UserStore for JsonStore {
    async fn users(&self, filter: &UserFilter) -> StoreResult<Vec<User>> {
        let col = self.users.lock().await;
        let mut items: Vec<User> = col
            .items
            .iter()
            .cloned()
            .map(User::from)
            .filter(|user| user.matches(filter))
            .collect();
        items.sort_by_key(|user| user.id);
        Ok(paginate(items, filter.limit, filter.offset))
    }

    async fn user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.users.lock().await.find(id).cloned().map(User::from))
    }

    async fn user_by_login(&self, login: &str) -> StoreResult<Option<User>> {
        let col = self.users.lock().await;
        Ok(col
            .items
            .iter()
            .find(|user| user.login == login)
            .cloned()
            .map(User::from))
    }

    async fn create_user(&self, data: UserCreate) -> StoreResult<User> {
        let mut col = self.users.lock().await;
        // no schema-level constraint here, so the check happens before
        // anything is written
        if col.items.iter().any(|user| user.login == data.login) {
            return Err(StoreError::conflict(
                EntityKind::User,
                format!("login `{}` already taken", data.login),
            ));
        }
        let user = User::from_create(col.next_id(), data, Utc::now());
        col.items.push(UserDoc::from(user.clone()));
        col.persist().await?;
        Ok(user)
    }

    async fn update_user(&self, id: i64, patch: UserPatch) -> StoreResult<Option<User>> {
        let mut col = self.users.lock().await;
        if let Some(login) = &patch.login {
            if col
                .items
                .iter()
                .any(|user| user.login == *login && user.id != id)
            {
                return Err(StoreError::conflict(
                    EntityKind::User,
                    format!("login `{login}` already taken"),
                ));
            }
        }
        let Some(doc) = col.items.iter_mut().find(|user| user.id == id) else {
            return Ok(None);
        };
        let mut user = User::from(doc.clone());
        user.apply(patch);
        *doc = UserDoc::from(user.clone());
        col.persist().await?;
        Ok(Some(user))
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        let mut users = self.users.lock().await;
        let mut user_answers = self.user_answers.lock().await;
        let mut tasks = self.tasks.lock().await;
        let mut events = self.events.lock().await;
        let mut enrollments = self.enrollments.lock().await;

        let before = users.items.len();
        users.items.retain(|user| user.id != id);
        if users.items.len() == before {
            return Ok(false);
        }

        user_answers.items.retain(|ua| ua.user_id != id);
        tasks.items.retain(|task| task.created_by_id != id);
        for task in tasks.items.iter_mut() {
            if task.assigned_to_user_id == Some(id) {
                task.assigned_to_user_id = None;
            }
        }
        // events outlive their trainer; only the link goes
        for event in events.items.iter_mut() {
            if event.trainer_id == Some(id) {
                event.trainer_id = None;
            }
        }
        enrollments.items.retain(|e| e.user_id != id);

        users.persist().await?;
        user_answers.persist().await?;
        tasks.persist().await?;
        events.persist().await?;
        enrollments.persist().await?;
        Ok(true)
    }
}

#[async_trait]
impl CourseStore for JsonStore {
    async fn courses(&self, filter: &CourseFilter) -> StoreResult<Vec<Course>> {
        let col = self.courses.lock().await;
        let mut items: Vec<Course> = col
            .items
            .iter()
            .filter(|course| course.matches(filter))
            .cloned()
            .collect();
        // newest first, matching the relational backend's ordering
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(items, filter.limit, filter.offset))
    }

    async fn course_by_id(&self, id: i64) -> StoreResult<Option<Course>> {
        get_in(&self.courses, id).await
    }

    async fn create_course(&self, data: CourseCreate) -> StoreResult<Course> {
        create_in(&self.courses, |id| Course::from_create(id, data, Utc::now())).await
    }

    async fn update_course(&self, id: i64, patch: CoursePatch) -> StoreResult<Option<Course>> {
        update_in(&self.courses, id, |course| course.apply(patch, Utc::now())).await
    }

    async fn delete_course(&self, id: i64) -> StoreResult<bool> {
        let mut courses = self.courses.lock().await;
        let mut modules = self.modules.lock().await;
        let mut lessons = self.lessons.lock().await;
        let mut tests = self.tests.lock().await;
        let mut questions = self.questions.lock().await;
        let mut answers = self.answers.lock().await;
        let mut user_answers = self.user_answers.lock().await;
        let mut tasks = self.tasks.lock().await;
        let mut materials = self.materials.lock().await;
        let mut enrollments = self.enrollments.lock().await;

        let before = courses.items.len();
        courses.items.retain(|course| course.id != id);
        if courses.items.len() == before {
            return Ok(false);
        }

        // Course -> {Module, Lesson, Test, Material, Task, Enrollment},
        // then down the Test -> Question -> {Answer, UserAnswer} chain.
        modules.items.retain(|module| module.course_id != id);
        lessons.items.retain(|lesson| lesson.course_id != id);

        let test_ids: Vec<i64> = tests
            .items
            .iter()
            .filter(|test| test.course_id == id)
            .map(|test| test.id)
            .collect();
        tests.items.retain(|test| test.course_id != id);

        let question_ids: Vec<i64> = questions
            .items
            .iter()
            .filter(|q| test_ids.contains(&q.test_id))
            .map(|q| q.id)
            .collect();
        questions.items.retain(|q| !test_ids.contains(&q.test_id));
        answers
            .items
            .retain(|a| !question_ids.contains(&a.question_id));
        user_answers
            .items
            .retain(|ua| !question_ids.contains(&ua.question_id));

        tasks.items.retain(|task| task.course_id != id);
        materials.items.retain(|material| material.course_id != id);
        enrollments.items.retain(|e| e.course_id != id);

        courses.persist().await?;
        modules.persist().await?;
        lessons.persist().await?;
        tests.persist().await?;
        questions.persist().await?;
        answers.persist().await?;
        user_answers.persist().await?;
        tasks.persist().await?;
        materials.persist().await?;
        enrollments.persist().await?;
        Ok(true)
    }
}

#[async_trait]
impl ModuleStore for JsonStore {
    async fn modules(&self, filter: &ModuleFilter) -> StoreResult<Vec<Module>> {
        let col = self.modules.lock().await;
        let mut items: Vec<Module> = col
            .items
            .iter()
            .filter(|module| module.matches(filter))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.order.cmp(&b.order).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn module_by_id(&self, id: i64) -> StoreResult<Option<Module>> {
        get_in(&self.modules, id).await
    }

    async fn create_module(&self, data: ModuleCreate) -> StoreResult<Module> {
        self.require_course(data.course_id, EntityKind::Module)
            .await?;
        create_in(&self.modules, |id| Module::from_create(id, data)).await
    }

    async fn update_module(&self, id: i64, patch: ModulePatch) -> StoreResult<Option<Module>> {
        update_in(&self.modules, id, |module| module.apply(patch)).await
    }

    async fn delete_module(&self, id: i64) -> StoreResult<bool> {
        let mut modules = self.modules.lock().await;
        let mut lessons = self.lessons.lock().await;

        let before = modules.items.len();
        modules.items.retain(|module| module.id != id);
        if modules.items.len() == before {
            return Ok(false);
        }

        // lessons stay owned by the course; they only lose the link
        for lesson in lessons.items.iter_mut() {
            if lesson.module_id == Some(id) {
                lesson.module_id = None;
            }
        }

        modules.persist().await?;
        lessons.persist().await?;
        Ok(true)
    }
}

#[async_trait]
impl LessonStore for JsonStore {
    async fn lessons(&self, filter: &LessonFilter) -> StoreResult<Vec<Lesson>> {
        let col = self.lessons.lock().await;
        let mut items: Vec<Lesson> = col
            .items
            .iter()
            .filter(|lesson| lesson.matches(filter))
            .cloned()
            .collect();
        // `order` is not unique; ties break by id so repeated fetches
        // keep the same relative order
        items.sort_by(|a, b| a.order.cmp(&b.order).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn lesson_by_id(&self, id: i64) -> StoreResult<Option<Lesson>> {
        get_in(&self.lessons, id).await
    }

    async fn create_lesson(&self, data: LessonCreate) -> StoreResult<Lesson> {
        self.require_course(data.course_id, EntityKind::Lesson)
            .await?;
        if let Some(module_id) = data.module_id {
            if !self.modules.lock().await.contains(module_id) {
                return Err(StoreError::validation(
                    EntityKind::Lesson,
                    format!("module {module_id} does not exist"),
                ));
            }
        }
        create_in(&self.lessons, |id| Lesson::from_create(id, data)).await
    }

    async fn update_lesson(&self, id: i64, patch: LessonPatch) -> StoreResult<Option<Lesson>> {
        if let Some(module_id) = patch.module_id {
            if !self.modules.lock().await.contains(module_id) {
                return Err(StoreError::validation(
                    EntityKind::Lesson,
                    format!("module {module_id} does not exist"),
                ));
            }
        }
        update_in(&self.lessons, id, |lesson| lesson.apply(patch)).await
    }

    async fn delete_lesson(&self, id: i64) -> StoreResult<bool> {
        delete_in(&self.lessons, id).await
    }
}

#[async_trait]
impl TestStore for JsonStore {
    async fn tests(&self, filter: &TestFilter) -> StoreResult<Vec<Test>> {
        let col = self.tests.lock().await;
        let mut items: Vec<Test> = col
            .items
            .iter()
            .filter(|test| test.matches(filter))
            .cloned()
            .collect();
        items.sort_by_key(|test| test.id);
        Ok(items)
    }

    async fn test_by_id(&self, id: i64) -> StoreResult<Option<Test>> {
        get_in(&self.tests, id).await
    }

    async fn create_test(&self, data: TestCreate) -> StoreResult<Test> {
        self.require_course(data.course_id, EntityKind::Test).await?;
        create_in(&self.tests, |id| Test::from_create(id, data, Utc::now())).await
    }

    async fn update_test(&self, id: i64, patch: TestPatch) -> StoreResult<Option<Test>> {
        update_in(&self.tests, id, |test| test.apply(patch)).await
    }

    async fn delete_test(&self, id: i64) -> StoreResult<bool> {
        let mut tests = self.tests.lock().await;
        let mut questions = self.questions.lock().await;
        let mut answers = self.answers.lock().await;
        let mut user_answers = self.user_answers.lock().await;

        let before = tests.items.len();
        tests.items.retain(|test| test.id != id);
        if tests.items.len() == before {
            return Ok(false);
        }

        let question_ids: Vec<i64> = questions
            .items
            .iter()
            .filter(|q| q.test_id == id)
            .map(|q| q.id)
            .collect();
        questions.items.retain(|q| q.test_id != id);
        answers
            .items
            .retain(|a| !question_ids.contains(&a.question_id));
        user_answers
            .items
            .retain(|ua| !question_ids.contains(&ua.question_id));

        tests.persist().await?;
        questions.persist().await?;
        answers.persist().await?;
        user_answers.persist().await?;
        Ok(true)
    }
}

#[async_trait]
impl QuestionStore for JsonStore {
    async fn questions(&self, filter: &QuestionFilter) -> StoreResult<Vec<Question>> {
        let col = self.questions.lock().await;
        let mut items: Vec<Question> = col
            .items
            .iter()
            .filter(|q| q.matches(filter))
            .cloned()
            .collect();
        items.sort_by_key(|q| q.id);
        Ok(items)
    }

    async fn question_by_id(&self, id: i64) -> StoreResult<Option<Question>> {
        get_in(&self.questions, id).await
    }

    async fn create_question(&self, data: QuestionCreate) -> StoreResult<Question> {
        if !self.tests.lock().await.contains(data.test_id) {
            return Err(StoreError::validation(
                EntityKind::Question,
                format!("test {} does not exist", data.test_id),
            ));
        }
        let mut questions = self.questions.lock().await;
        let mut answers = self.answers.lock().await;

        let question = Question::from_create(questions.next_id(), &data);
        questions.items.push(question.clone());

        for answer in data.answers {
            let next = answers.next_id();
            answers.items.push(Answer::from_create(
                next,
                AnswerCreate {
                    question_id: question.id,
                    ..answer
                },
            ));
        }

        questions.persist().await?;
        answers.persist().await?;
        Ok(question)
    }

    async fn update_question(&self, id: i64, patch: QuestionPatch) -> StoreResult<Option<Question>> {
        update_in(&self.questions, id, |q| q.apply(patch)).await
    }

    async fn delete_question(&self, id: i64) -> StoreResult<bool> {
        let mut questions = self.questions.lock().await;
        let mut answers = self.answers.lock().await;
        let mut user_answers = self.user_answers.lock().await;

        let before = questions.items.len();
        questions.items.retain(|q| q.id != id);
        if questions.items.len() == before {
            return Ok(false);
        }

        answers.items.retain(|a| a.question_id != id);
        user_answers.items.retain(|ua| ua.question_id != id);

        questions.persist().await?;
        answers.persist().await?;
        user_answers.persist().await?;
        Ok(true)
    }
}

#[async_trait]
impl AnswerStore for JsonStore {
    async fn answers(&self, filter: &AnswerFilter) -> StoreResult<Vec<Answer>> {
        let col = self.answers.lock().await;
        let mut items: Vec<Answer> = col
            .items
            .iter()
            .filter(|a| a.matches(filter))
            .cloned()
            .collect();
        items.sort_by_key(|a| a.id);
        Ok(items)
    }

    async fn answer_by_id(&self, id: i64) -> StoreResult<Option<Answer>> {
        get_in(&self.answers, id).await
    }

    async fn create_answer(&self, data: AnswerCreate) -> StoreResult<Answer> {
        if !self.questions.lock().await.contains(data.question_id) {
            return Err(StoreError::validation(
                EntityKind::Answer,
                format!("question {} does not exist", data.question_id),
            ));
        }
        create_in(&self.answers, |id| Answer::from_create(id, data)).await
    }

    async fn update_answer(&self, id: i64, patch: AnswerPatch) -> StoreResult<Option<Answer>> {
        update_in(&self.answers, id, |a| a.apply(patch)).await
    }

    async fn delete_answer(&self, id: i64) -> StoreResult<bool> {
        let mut answers = self.answers.lock().await;
        let mut user_answers = self.user_answers.lock().await;

        let before = answers.items.len();
        answers.items.retain(|a| a.id != id);
        if answers.items.len() == before {
            return Ok(false);
        }

        user_answers
            .items
            .retain(|ua| ua.selected_answer_id != Some(id));

        answers.persist().await?;
        user_answers.persist().await?;
        Ok(true)
    }
}

#[async_trait]
impl UserAnswerStore for JsonStore {
    async fn user_answers(&self, filter: &UserAnswerFilter) -> StoreResult<Vec<UserAnswer>> {
        let col = self.user_answers.lock().await;
        let mut items: Vec<UserAnswer> = col
            .items
            .iter()
            .filter(|ua| ua.matches(filter))
            .cloned()
            .collect();
        items.sort_by_key(|ua| ua.id);
        Ok(items)
    }

    async fn user_answer_by_id(&self, id: i64) -> StoreResult<Option<UserAnswer>> {
        get_in(&self.user_answers, id).await
    }

    async fn create_user_answer(&self, data: UserAnswerCreate) -> StoreResult<UserAnswer> {
        if !self.questions.lock().await.contains(data.question_id) {
            return Err(StoreError::validation(
                EntityKind::UserAnswer,
                format!("question {} does not exist", data.question_id),
            ));
        }
        if let Some(answer_id) = data.selected_answer_id {
            let answers = self.answers.lock().await;
            match answers.find(answer_id) {
                Some(answer) if answer.question_id == data.question_id => {}
                _ => {
                    return Err(StoreError::validation(
                        EntityKind::UserAnswer,
                        format!(
                            "answer {answer_id} does not belong to question {}",
                            data.question_id
                        ),
                    ));
                }
            }
        }
        create_in(&self.user_answers, |id| {
            UserAnswer::from_create(id, data, Utc::now())
        })
        .await
    }

    async fn update_user_answer(
        &self,
        id: i64,
        patch: UserAnswerPatch,
    ) -> StoreResult<Option<UserAnswer>> {
        if let Some(answer_id) = patch.selected_answer_id {
            let Some(current) = get_in(&self.user_answers, id).await? else {
                return Ok(None);
            };
            let answers = self.answers.lock().await;
            match answers.find(answer_id) {
                Some(answer) if answer.question_id == current.question_id => {}
                _ => {
                    return Err(StoreError::validation(
                        EntityKind::UserAnswer,
                        format!(
                            "answer {answer_id} does not belong to question {}",
                            current.question_id
                        ),
                    ));
                }
            }
        }
        update_in(&self.user_answers, id, |ua| ua.apply(patch)).await
    }

    async fn delete_user_answer(&self, id: i64) -> StoreResult<bool> {
        delete_in(&self.user_answers, id).await
    }
}

#[async_trait]
impl TaskStore for JsonStore {
    async fn task_items(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        let col = self.tasks.lock().await;
        let mut items: Vec<Task> = col
            .items
            .iter()
            .filter(|task| task.matches(filter))
            .cloned()
            .collect();
        items.sort_by_key(|task| task.id);
        Ok(items)
    }

    async fn task_by_id(&self, id: i64) -> StoreResult<Option<Task>> {
        get_in(&self.tasks, id).await
    }

    async fn create_task(&self, data: TaskCreate) -> StoreResult<Task> {
        self.require_course(data.course_id, EntityKind::Task).await?;
        create_in(&self.tasks, |id| Task::from_create(id, data, Utc::now())).await
    }

    async fn update_task(&self, id: i64, patch: TaskPatch) -> StoreResult<Option<Task>> {
        update_in(&self.tasks, id, |task| task.apply(patch)).await
    }

    async fn delete_task(&self, id: i64) -> StoreResult<bool> {
        delete_in(&self.tasks, id).await
    }
}

#[async_trait]
impl MaterialStore for JsonStore {
    async fn materials(&self, filter: &MaterialFilter) -> StoreResult<Vec<Material>> {
        let col = self.materials.lock().await;
        let mut items: Vec<Material> = col
            .items
            .iter()
            .filter(|material| material.matches(filter))
            .cloned()
            .collect();
        items.sort_by_key(|material| material.id);
        Ok(items)
    }

    async fn material_by_id(&self, id: i64) -> StoreResult<Option<Material>> {
        get_in(&self.materials, id).await
    }

    async fn create_material(&self, data: MaterialCreate) -> StoreResult<Material> {
        self.require_course(data.course_id, EntityKind::Material)
            .await?;
        create_in(&self.materials, |id| Material::from_create(id, data)).await
    }

    async fn update_material(&self, id: i64, patch: MaterialPatch) -> StoreResult<Option<Material>> {
        update_in(&self.materials, id, |material| material.apply(patch)).await
    }

    async fn delete_material(&self, id: i64) -> StoreResult<bool> {
        delete_in(&self.materials, id).await
    }
}

#[async_trait]
impl EventStore for JsonStore {
    async fn events(&self, filter: &EventFilter) -> StoreResult<Vec<Event>> {
        let col = self.events.lock().await;
        let mut items: Vec<Event> = col
            .items
            .iter()
            .filter(|event| event.matches(filter))
            .cloned()
            .collect();
        items.sort_by_key(|event| event.id);
        Ok(items)
    }

    async fn event_by_id(&self, id: i64) -> StoreResult<Option<Event>> {
        get_in(&self.events, id).await
    }

    async fn create_event(&self, data: EventCreate) -> StoreResult<Event> {
        if !self.users.lock().await.contains(data.trainer_id) {
            return Err(StoreError::validation(
                EntityKind::Event,
                format!("trainer {} does not exist", data.trainer_id),
            ));
        }
        create_in(&self.events, |id| Event::from_create(id, data, Utc::now())).await
    }

    async fn update_event(&self, id: i64, patch: EventPatch) -> StoreResult<Option<Event>> {
        if let Some(trainer_id) = patch.trainer_id {
            if !self.users.lock().await.contains(trainer_id) {
                return Err(StoreError::validation(
                    EntityKind::Event,
                    format!("trainer {trainer_id} does not exist"),
                ));
            }
        }
        update_in(&self.events, id, |event| event.apply(patch, Utc::now())).await
    }

    async fn delete_event(&self, id: i64) -> StoreResult<bool> {
        delete_in(&self.events, id).await
    }
}

#[async_trait]
impl EnrollmentStore for JsonStore {
    async fn enrollments(&self, filter: &EnrollmentFilter) -> StoreResult<Vec<Enrollment>> {
        let col = self.enrollments.lock().await;
        let mut items: Vec<Enrollment> = col
            .items
            .iter()
            .filter(|e| e.matches(filter))
            .cloned()
            .collect();
        items.sort_by_key(|e| e.id);
        Ok(items)
    }

    async fn insert_enrollment(
        &self,
        user_id: i64,
        course_id: i64,
        kind: EnrollmentKind,
    ) -> StoreResult<Enrollment> {
        if !self.users.lock().await.contains(user_id) {
            return Err(StoreError::validation(
                EntityKind::Enrollment,
                format!("user {user_id} does not exist"),
            ));
        }
        self.require_course(course_id, EntityKind::Enrollment)
            .await?;

        let mut col = self.enrollments.lock().await;
        let duplicate = col
            .items
            .iter()
            .any(|e| e.user_id == user_id && e.course_id == course_id && e.kind == kind);
        if duplicate {
            return Err(StoreError::conflict(
                EntityKind::Enrollment,
                format!(
                    "({user_id}, {course_id}, {}) already enrolled",
                    kind.as_str()
                ),
            ));
        }
        let enrollment = Enrollment::new(col.next_id(), user_id, course_id, kind, Utc::now());
        col.items.push(enrollment.clone());
        col.persist().await?;
        Ok(enrollment)
    }

    async fn remove_enrollment(
        &self,
        user_id: i64,
        course_id: i64,
        kind: EnrollmentKind,
    ) -> StoreResult<bool> {
        let mut col = self.enrollments.lock().await;
        let before = col.items.len();
        col.items
            .retain(|e| !(e.user_id == user_id && e.course_id == course_id && e.kind == kind));
        if col.items.len() == before {
            return Ok(false);
        }
        col.persist().await?;
        Ok(true)
    }
}

fn paginate<T>(items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}
