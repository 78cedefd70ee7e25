use crate::model::ModelManager;
use crate::policy::PolicyEngine;
use crate::service::CourseService;

#[derive(Debug, Clone)]
pub struct AppState {
    mm: ModelManager,
    policy: PolicyEngine,
    courses: CourseService,
}

impl AppState {
    pub fn new(mm: ModelManager, public_url: &str) -> Self {
        let policy = PolicyEngine::new(mm.graph());
        let courses = CourseService::new(mm.clone(), public_url);
        Self {
            mm,
            policy,
            courses,
        }
    }

    pub fn mm(&self) -> &ModelManager {
        &self.mm
    }

    pub fn policy(&self) -> &PolicyEngine {
        &self.policy
    }

    pub fn courses(&self) -> &CourseService {
        &self.courses
    }
}
