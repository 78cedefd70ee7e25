pub mod assets;

mod course;
pub use course::{ContentSummary, CourseDetail, CourseService, EnrollmentInfo};
