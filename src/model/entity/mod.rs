mod user;
pub use user::{User, UserCreate, UserFilter, UserPatch};

mod course;
pub use course::{Course, CourseCreate, CourseFilter, CoursePatch, CourseStatus};

mod module;
pub use module::{Module, ModuleCreate, ModuleFilter, ModulePatch};

mod lesson;
pub use lesson::{ContentType, Lesson, LessonCreate, LessonFilter, LessonPatch, LessonType};

mod test;
pub use test::{Test, TestCreate, TestFilter, TestPatch};

mod question;
pub use question::{Question, QuestionCreate, QuestionFilter, QuestionPatch};

mod answer;
pub use answer::{Answer, AnswerCreate, AnswerFilter, AnswerPatch};

mod user_answer;
pub use user_answer::{UserAnswer, UserAnswerCreate, UserAnswerFilter, UserAnswerPatch};

mod task;
pub use task::{Task, TaskCreate, TaskFilter, TaskPatch};

mod material;
pub use material::{Material, MaterialCreate, MaterialFilter, MaterialPatch};

mod event;
pub use event::{Event, EventCreate, EventFilter, EventPatch};

mod enrollment;
pub use enrollment::{Enrollment, EnrollmentFilter, EnrollmentKind};

/// Case-insensitive substring search over title and description, the
/// contract every kind-specific `search` filter follows.
pub(crate) fn matches_search(needle: &str, title: &str, description: &str) -> bool {
    let needle = needle.to_lowercase();
    title.to_lowercase().contains(&needle) || description.to_lowercase().contains(&needle)
}
