//! Role and enrollment based authorization.
//!
//! One decision table serves every resource kind, so role semantics
//! cannot drift between courses, lessons, tasks, tests and events.
//! Decisions
//! are pure functions over an [`ActorScope`] snapshot; the snapshot is
//! built once per request from the enrollment graph.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::entity::EnrollmentKind;
use crate::model::{EnrollmentGraph, StoreError, StoreResult};

/// Global user role. Anything unrecognized parses to `Unknown`, which
/// the decision table denies everywhere (fail closed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Trainer,
    Student,
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "admin" => Self::Admin,
            "manager" => Self::Manager,
            "trainer" => Self::Trainer,
            "student" => Self::Student,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Trainer => "trainer",
            Self::Student => "student",
            Self::Unknown => "unknown",
        }
    }

    fn is_privileged(self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn is_mutation(self) -> bool {
        !matches!(self, Self::Read)
    }
}

/// The authenticated actor as supplied by the identity boundary.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: i64,
    pub role: Role,
}

/// Per-request snapshot of the actor plus the course sets their
/// enrollments reach. Privileged roles skip the graph lookups and
/// carry empty sets.
#[derive(Debug, Clone)]
pub struct ActorScope {
    actor: Actor,
    student_courses: HashSet<i64>,
    trainer_courses: HashSet<i64>,
}

impl ActorScope {
    pub fn new(actor: Actor, student_courses: HashSet<i64>, trainer_courses: HashSet<i64>) -> Self {
        Self {
            actor,
            student_courses,
            trainer_courses,
        }
    }

    pub fn unscoped(actor: Actor) -> Self {
        Self::new(actor, HashSet::new(), HashSet::new())
    }

    pub fn actor(&self) -> Actor {
        self.actor
    }

    /// Core decision table for course-owned content (courses, modules,
    /// lessons, tests, questions, answers, materials).
    ///
    /// `published` gates student visibility only; pass `true` for kinds
    /// without a publish flag.
    pub fn decide(&self, action: Action, course_id: i64, published: bool) -> bool {
        match self.actor.role {
            Role::Admin | Role::Manager => true,
            Role::Trainer => self.trainer_courses.contains(&course_id),
            Role::Student => {
                !action.is_mutation() && published && self.student_courses.contains(&course_id)
            }
            Role::Unknown => false,
        }
    }

    /// Tasks carry creator and assignee, which relax the student row of
    /// the table: a student may create a task assigned to themselves
    /// and may update or delete tasks they created.
    pub fn decide_task(
        &self,
        action: Action,
        course_id: i64,
        created_by: i64,
        assigned_to: Option<i64>,
    ) -> bool {
        match self.actor.role {
            Role::Admin | Role::Manager => true,
            Role::Trainer => self.trainer_courses.contains(&course_id),
            Role::Student => match action {
                Action::Read => self.student_courses.contains(&course_id),
                Action::Create => {
                    assigned_to == Some(self.actor.user_id)
                        && self.student_courses.contains(&course_id)
                }
                Action::Update | Action::Delete => created_by == self.actor.user_id,
            },
            Role::Unknown => false,
        }
    }

    /// Submitted answers belong to the user who answered; students see
    /// and mutate only their own, trainers read within their courses.
    pub fn decide_user_answer(&self, action: Action, owner_user_id: i64, course_id: i64) -> bool {
        match self.actor.role {
            Role::Admin | Role::Manager => true,
            Role::Trainer => !action.is_mutation() && self.trainer_courses.contains(&course_id),
            Role::Student => owner_user_id == self.actor.user_id,
            Role::Unknown => false,
        }
    }

    /// Events hang off their trainer rather than a course: privileged
    /// roles see and manage everything, a trainer reads their own
    /// events, students get nothing (invitations live outside this
    /// surface).
    pub fn decide_event(&self, action: Action, trainer_id: Option<i64>) -> bool {
        match self.actor.role {
            Role::Admin | Role::Manager => true,
            Role::Trainer => !action.is_mutation() && trainer_id == Some(self.actor.user_id),
            Role::Student | Role::Unknown => false,
        }
    }

    /// Operations with no owning course yet (creating a course,
    /// managing users, assigning trainers) are privileged-only.
    pub fn require_privileged(&self) -> StoreResult<()> {
        if self.actor.role.is_privileged() {
            Ok(())
        } else {
            Err(StoreError::Forbidden)
        }
    }

    pub fn is_privileged(&self) -> bool {
        self.actor.role.is_privileged()
    }

    pub fn authorize(&self, action: Action, course_id: i64, published: bool) -> StoreResult<()> {
        if self.decide(action, course_id, published) {
            Ok(())
        } else {
            Err(StoreError::Forbidden)
        }
    }

    pub fn authorize_task(
        &self,
        action: Action,
        course_id: i64,
        created_by: i64,
        assigned_to: Option<i64>,
    ) -> StoreResult<()> {
        if self.decide_task(action, course_id, created_by, assigned_to) {
            Ok(())
        } else {
            Err(StoreError::Forbidden)
        }
    }

    pub fn authorize_event(&self, action: Action, trainer_id: Option<i64>) -> StoreResult<()> {
        if self.decide_event(action, trainer_id) {
            Ok(())
        } else {
            Err(StoreError::Forbidden)
        }
    }

    pub fn authorize_user_answer(
        &self,
        action: Action,
        owner_user_id: i64,
        course_id: i64,
    ) -> StoreResult<()> {
        if self.decide_user_answer(action, owner_user_id, course_id) {
            Ok(())
        } else {
            Err(StoreError::Forbidden)
        }
    }

    /// Keeps the readable subset, preserving relative order. The
    /// closure maps an item to its (owning course id, published) pair.
    pub fn filter_readable<T, F>(&self, items: Vec<T>, facts: F) -> Vec<T>
    where
        F: Fn(&T) -> (i64, bool),
    {
        items
            .into_iter()
            .filter(|item| {
                let (course_id, published) = facts(item);
                self.decide(Action::Read, course_id, published)
            })
            .collect()
    }
}

/// Builds [`ActorScope`] snapshots from the enrollment graph.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    graph: EnrollmentGraph,
}

impl PolicyEngine {
    pub fn new(graph: EnrollmentGraph) -> Self {
        Self { graph }
    }

    pub async fn scope_for(&self, actor: Actor) -> StoreResult<ActorScope> {
        if actor.role.is_privileged() || actor.role == Role::Unknown {
            return Ok(ActorScope::unscoped(actor));
        }
        let student_courses = self
            .graph
            .courses_for(actor.user_id, EnrollmentKind::Student)
            .await?;
        let trainer_courses = self
            .graph
            .courses_for(actor.user_id, EnrollmentKind::Trainer)
            .await?;
        Ok(ActorScope::new(actor, student_courses, trainer_courses))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(role: Role, student: &[i64], trainer: &[i64]) -> ActorScope {
        ActorScope::new(
            Actor { user_id: 42, role },
            student.iter().copied().collect(),
            trainer.iter().copied().collect(),
        )
    }

    #[test]
    fn admin_and_manager_allow_everything() {
        for role in [Role::Admin, Role::Manager] {
            let scope = scope(role, &[], &[]);
            for action in [Action::Read, Action::Create, Action::Update, Action::Delete] {
                assert!(scope.decide(action, 7, false), "{role:?} {action:?}");
            }
        }
    }

    #[test]
    fn trainer_is_scoped_to_trainer_enrollments() {
        let scope = scope(Role::Trainer, &[9], &[3]);
        assert!(scope.decide(Action::Read, 3, false));
        assert!(scope.decide(Action::Update, 3, true));
        // a student enrollment grants nothing to the trainer row
        assert!(!scope.decide(Action::Read, 9, true));
        assert!(!scope.decide(Action::Delete, 5, true));
    }

    #[test]
    fn student_reads_published_within_enrollment_only() {
        let scope = scope(Role::Student, &[7], &[]);
        assert!(scope.decide(Action::Read, 7, true));
        assert!(!scope.decide(Action::Read, 7, false));
        assert!(!scope.decide(Action::Read, 9, true));
        assert!(!scope.decide(Action::Create, 7, true));
        assert!(!scope.decide(Action::Update, 7, true));
        assert!(!scope.decide(Action::Delete, 7, true));
    }

    #[test]
    fn unknown_role_denies_everything() {
        let scope = scope(Role::Unknown, &[7], &[7]);
        for action in [Action::Read, Action::Create, Action::Update, Action::Delete] {
            assert!(!scope.decide(action, 7, true));
        }
        assert!(!scope.decide_task(Action::Read, 7, 42, Some(42)));
        assert!(!scope.decide_user_answer(Action::Read, 42, 7));
    }

    #[test]
    fn role_parse_fails_closed() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("superuser"), Role::Unknown);
        assert_eq!(Role::parse(""), Role::Unknown);
    }

    #[test]
    fn student_task_rules() {
        let scope = scope(Role::Student, &[7], &[]);
        // create only when self-assigned inside an enrolled course
        assert!(scope.decide_task(Action::Create, 7, 42, Some(42)));
        assert!(!scope.decide_task(Action::Create, 7, 42, Some(99)));
        assert!(!scope.decide_task(Action::Create, 7, 42, None));
        assert!(!scope.decide_task(Action::Create, 9, 42, Some(42)));
        // update and delete only their own
        assert!(scope.decide_task(Action::Update, 7, 42, None));
        assert!(scope.decide_task(Action::Delete, 9, 42, None));
        assert!(!scope.decide_task(Action::Update, 7, 1, Some(42)));
    }

    #[test]
    fn student_owns_their_answers() {
        let scope = scope(Role::Student, &[7], &[]);
        assert!(scope.decide_user_answer(Action::Update, 42, 7));
        assert!(!scope.decide_user_answer(Action::Read, 99, 7));
    }

    #[test]
    fn trainer_reads_answers_in_scope_but_never_mutates() {
        let scope = scope(Role::Trainer, &[], &[3]);
        assert!(scope.decide_user_answer(Action::Read, 99, 3));
        assert!(!scope.decide_user_answer(Action::Read, 99, 5));
        assert!(!scope.decide_user_answer(Action::Update, 99, 3));
    }

    #[test]
    fn trainer_reads_own_events_but_never_mutates() {
        let scope = scope(Role::Trainer, &[], &[3]);
        assert!(scope.decide_event(Action::Read, Some(42)));
        assert!(!scope.decide_event(Action::Read, Some(7)));
        assert!(!scope.decide_event(Action::Read, None));
        assert!(!scope.decide_event(Action::Update, Some(42)));
        assert!(!scope.decide_event(Action::Delete, Some(42)));
    }

    #[test]
    fn events_are_invisible_to_students_and_open_to_privileged() {
        let student = scope(Role::Student, &[7], &[]);
        assert!(!student.decide_event(Action::Read, Some(42)));

        for role in [Role::Admin, Role::Manager] {
            let scope = scope(role, &[], &[]);
            for action in [Action::Read, Action::Create, Action::Update, Action::Delete] {
                assert!(scope.decide_event(action, None), "{role:?} {action:?}");
            }
        }
    }

    #[test]
    fn filter_preserves_relative_order() {
        let scope = scope(Role::Student, &[1, 3], &[]);
        let items = vec![(1, true), (2, true), (3, true), (1, false), (3, true)];
        let kept = scope.filter_readable(items, |&(course, published)| (course, published));
        assert_eq!(kept, vec![(1, true), (3, true), (3, true)]);
    }
}
