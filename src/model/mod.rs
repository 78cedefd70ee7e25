mod database;
pub use database::DbConnection;

pub mod entity;

mod error;
pub use error::{StoreError, StoreResult};

mod graph;
pub use graph::EnrollmentGraph;

pub mod store;
pub use store::{JsonStore, PgStore, Storage};

use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Course,
    Module,
    Lesson,
    Test,
    Question,
    Answer,
    UserAnswer,
    Task,
    Material,
    Event,
    Enrollment,
}

impl EntityKind {
    /// Collection name, also the document file stem of the flat-collection backend.
    pub fn collection(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Course => "courses",
            Self::Module => "modules",
            Self::Lesson => "lessons",
            Self::Test => "tests",
            Self::Question => "questions",
            Self::Answer => "answers",
            Self::UserAnswer => "user_answers",
            Self::Task => "tasks",
            Self::Material => "materials",
            Self::Event => "events",
            Self::Enrollment => "enrollments",
        }
    }
}

/// Owner of the active storage backend. Constructed once at startup and
/// passed to collaborators; which backend is behind it is decided by
/// configuration, never by call sites.
#[derive(Debug, Clone)]
pub struct ModelManager {
    storage: Arc<dyn Storage>,
}

impl ModelManager {
    pub fn postgres(conn: DbConnection) -> Self {
        Self {
            storage: Arc::new(PgStore::new(conn)),
        }
    }

    /// Opens the flat-collection backend rooted at `data_dir`, loading
    /// every collection document into memory.
    pub async fn json<P: Into<std::path::PathBuf>>(data_dir: P) -> StoreResult<Self> {
        Ok(Self {
            storage: Arc::new(JsonStore::open(data_dir.into()).await?),
        })
    }

    pub fn store(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn graph(&self) -> EnrollmentGraph {
        EnrollmentGraph::new(self.clone())
    }
}
