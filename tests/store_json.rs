//! Behavior of the flat-collection backend: durable id assignment,
//! strict patches, cascades and conflict reporting.

use corso::model::entity::{
    AnswerCreate, AnswerFilter, ContentType, CourseCreate, CoursePatch, EnrollmentKind,
    EventCreate, LessonCreate, LessonFilter, ModuleCreate, ModuleFilter, QuestionCreate,
    QuestionFilter, TestCreate, UserAnswerCreate, UserAnswerFilter, UserCreate,
};
use corso::model::{ModelManager, StoreError};

fn course(title: &str) -> CourseCreate {
    CourseCreate {
        title: title.to_string(),
        description: format!("{title} description"),
        short_description: None,
        image_url: None,
        duration_hours: 0,
        tags: Vec::new(),
        requirements: Vec::new(),
        what_you_learn: Vec::new(),
    }
}

fn lesson(course_id: i64, title: &str, order: i32) -> LessonCreate {
    LessonCreate {
        course_id,
        module_id: None,
        title: title.to_string(),
        content_type: ContentType::Text,
        content_url: None,
        content_text: Some("body".to_string()),
        duration_minutes: 10,
        order,
        lesson_type: corso::model::entity::LessonType::Theory,
        is_published: true,
    }
}

fn test_for(course_id: i64) -> TestCreate {
    TestCreate {
        course_id,
        title: "checkpoint".to_string(),
        description: None,
        number_of_attempts: None,
        time_limit_minutes: None,
    }
}

fn question(test_id: i64, text: &str) -> QuestionCreate {
    QuestionCreate {
        test_id,
        question_text: text.to_string(),
        question_type: "single".to_string(),
        answers: vec![AnswerCreate {
            question_id: 0,
            answer_text: format!("{text} option"),
            is_correct: true,
        }],
    }
}

fn user(login: &str) -> UserCreate {
    UserCreate {
        login: login.to_string(),
        password_hash: "not-a-real-hash".to_string(),
        full_name: login.to_string(),
        role: "student".to_string(),
        company: None,
        department: None,
        position: None,
    }
}

#[tokio::test]
async fn ids_are_monotonic_and_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mm = ModelManager::json(dir.path()).await.unwrap();
        let c1 = mm.store().create_course(course("first")).await.unwrap();
        let c2 = mm.store().create_course(course("second")).await.unwrap();
        assert_eq!(c1.id, 1);
        assert_eq!(c2.id, 2);
    }

    // a fresh process over the same data directory continues the sequence
    let mm = ModelManager::json(dir.path()).await.unwrap();
    let c3 = mm.store().create_course(course("third")).await.unwrap();
    assert_eq!(c3.id, 3);

    let reloaded = mm.store().course_by_id(1).await.unwrap().unwrap();
    assert_eq!(reloaded.title, "first");
}

#[tokio::test]
async fn password_hash_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mm = ModelManager::json(dir.path()).await.unwrap();
        mm.store().create_user(user("alice")).await.unwrap();
    }

    let mm = ModelManager::json(dir.path()).await.unwrap();
    let alice = mm.store().user_by_login("alice").await.unwrap().unwrap();
    assert_eq!(alice.password_hash, "not-a-real-hash");
}

#[tokio::test]
async fn patch_applies_present_fields_only() {
    let dir = tempfile::tempdir().unwrap();
    let mm = ModelManager::json(dir.path()).await.unwrap();

    let created = mm.store().create_course(course("patchme")).await.unwrap();

    // empty patch is a no-op
    let untouched = mm
        .store()
        .update_course(created.id, CoursePatch::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(untouched.title, "patchme");
    assert_eq!(untouched.description, "patchme description");

    // a present-but-empty value is applied, not ignored
    let patched = mm
        .store()
        .update_course(
            created.id,
            CoursePatch {
                description: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(patched.title, "patchme");
    assert_eq!(patched.description, "");
}

#[tokio::test]
async fn absence_is_a_result_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mm = ModelManager::json(dir.path()).await.unwrap();

    assert!(mm.store().course_by_id(42).await.unwrap().is_none());
    assert!(
        mm.store()
            .update_course(42, CoursePatch::default())
            .await
            .unwrap()
            .is_none()
    );
    assert!(!mm.store().delete_course(42).await.unwrap());
}

#[tokio::test]
async fn duplicate_login_is_a_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let mm = ModelManager::json(dir.path()).await.unwrap();

    mm.store().create_user(user("bob")).await.unwrap();
    let err = mm.store().create_user(user("bob")).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));
}

#[tokio::test]
async fn deleting_a_course_cascades_to_owned_content() {
    let dir = tempfile::tempdir().unwrap();
    let mm = ModelManager::json(dir.path()).await.unwrap();

    let c = mm.store().create_course(course("doomed")).await.unwrap();
    mm.store()
        .create_module(ModuleCreate {
            course_id: c.id,
            title: "m1".to_string(),
            description: String::new(),
            order: 0,
            is_published: true,
        })
        .await
        .unwrap();
    mm.store()
        .create_lesson(lesson(c.id, "l1", 0))
        .await
        .unwrap();
    let t = mm
        .store()
        .create_test(TestCreate {
            course_id: c.id,
            title: "t1".to_string(),
            description: None,
            number_of_attempts: None,
            time_limit_minutes: None,
        })
        .await
        .unwrap();
    let q = mm
        .store()
        .create_question(QuestionCreate {
            test_id: t.id,
            question_text: "q1".to_string(),
            question_type: "single".to_string(),
            answers: vec![AnswerCreate {
                question_id: 0,
                answer_text: "a1".to_string(),
                is_correct: true,
            }],
        })
        .await
        .unwrap();
    let student = mm.store().create_user(user("carol")).await.unwrap();
    mm.graph()
        .enroll(student.id, c.id, EnrollmentKind::Student)
        .await
        .unwrap();

    assert!(mm.store().delete_course(c.id).await.unwrap());

    assert!(
        mm.store()
            .modules(&ModuleFilter {
                course_id: Some(c.id),
            })
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        mm.store()
            .lessons(&LessonFilter {
                course_id: Some(c.id),
                ..Default::default()
            })
            .await
            .unwrap()
            .is_empty()
    );
    assert!(mm.store().test_by_id(t.id).await.unwrap().is_none());
    assert!(mm.store().question_by_id(q.id).await.unwrap().is_none());
    assert!(
        mm.store()
            .answers(&AnswerFilter {
                question_id: Some(q.id),
            })
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        !mm.graph()
            .is_enrolled(student.id, c.id, EnrollmentKind::Student)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn question_creation_binds_nested_answers() {
    let dir = tempfile::tempdir().unwrap();
    let mm = ModelManager::json(dir.path()).await.unwrap();

    let c = mm.store().create_course(course("quiz")).await.unwrap();
    let t = mm
        .store()
        .create_test(TestCreate {
            course_id: c.id,
            title: "quiz".to_string(),
            description: None,
            number_of_attempts: None,
            time_limit_minutes: None,
        })
        .await
        .unwrap();

    let q = mm
        .store()
        .create_question(QuestionCreate {
            test_id: t.id,
            question_text: "pick one".to_string(),
            question_type: "single".to_string(),
            answers: vec![
                AnswerCreate {
                    // whatever the payload claims, options belong to the
                    // question being created
                    question_id: 999,
                    answer_text: "yes".to_string(),
                    is_correct: true,
                },
                AnswerCreate {
                    question_id: 999,
                    answer_text: "no".to_string(),
                    is_correct: false,
                },
            ],
        })
        .await
        .unwrap();

    let answers = mm
        .store()
        .answers(&AnswerFilter {
            question_id: Some(q.id),
        })
        .await
        .unwrap();
    assert_eq!(answers.len(), 2);
    assert!(answers.iter().all(|a| a.question_id == q.id));

    let questions = mm
        .store()
        .questions(&QuestionFilter { test_id: Some(t.id) })
        .await
        .unwrap();
    assert_eq!(questions.len(), 1);
}

#[tokio::test]
async fn deleting_a_test_cascades_to_submissions() {
    let dir = tempfile::tempdir().unwrap();
    let mm = ModelManager::json(dir.path()).await.unwrap();

    let c = mm.store().create_course(course("graded")).await.unwrap();
    let t = mm.store().create_test(test_for(c.id)).await.unwrap();
    let q = mm
        .store()
        .create_question(question(t.id, "pick"))
        .await
        .unwrap();
    let option = mm
        .store()
        .answers(&AnswerFilter {
            question_id: Some(q.id),
        })
        .await
        .unwrap()
        .pop()
        .unwrap();
    let student = mm.store().create_user(user("erin")).await.unwrap();
    let submission = mm
        .store()
        .create_user_answer(UserAnswerCreate {
            user_id: student.id,
            question_id: q.id,
            selected_answer_id: Some(option.id),
            is_correct: true,
        })
        .await
        .unwrap();

    assert!(mm.store().delete_test(t.id).await.unwrap());

    // the whole chain under the test is gone
    assert!(mm.store().test_by_id(t.id).await.unwrap().is_none());
    assert!(mm.store().question_by_id(q.id).await.unwrap().is_none());
    assert!(
        mm.store()
            .answers(&AnswerFilter {
                question_id: Some(q.id),
            })
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        mm.store()
            .user_answer_by_id(submission.id)
            .await
            .unwrap()
            .is_none()
    );
    // the owning course is untouched
    assert!(mm.store().course_by_id(c.id).await.unwrap().is_some());
}

#[tokio::test]
async fn deleting_a_question_spares_its_siblings() {
    let dir = tempfile::tempdir().unwrap();
    let mm = ModelManager::json(dir.path()).await.unwrap();

    let c = mm.store().create_course(course("partial")).await.unwrap();
    let t = mm.store().create_test(test_for(c.id)).await.unwrap();
    let q1 = mm
        .store()
        .create_question(question(t.id, "first"))
        .await
        .unwrap();
    let q2 = mm
        .store()
        .create_question(question(t.id, "second"))
        .await
        .unwrap();
    let student = mm.store().create_user(user("frank")).await.unwrap();
    mm.store()
        .create_user_answer(UserAnswerCreate {
            user_id: student.id,
            question_id: q1.id,
            selected_answer_id: None,
            is_correct: false,
        })
        .await
        .unwrap();

    assert!(mm.store().delete_question(q1.id).await.unwrap());

    assert!(
        mm.store()
            .answers(&AnswerFilter {
                question_id: Some(q1.id),
            })
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        mm.store()
            .user_answers(&UserAnswerFilter {
                user_id: Some(student.id),
                question_id: None,
            })
            .await
            .unwrap()
            .is_empty()
    );
    // the sibling question and the test itself survive
    assert!(mm.store().question_by_id(q2.id).await.unwrap().is_some());
    assert!(mm.store().test_by_id(t.id).await.unwrap().is_some());
}

#[tokio::test]
async fn submission_must_reference_an_answer_of_its_question() {
    let dir = tempfile::tempdir().unwrap();
    let mm = ModelManager::json(dir.path()).await.unwrap();

    let c = mm.store().create_course(course("strict")).await.unwrap();
    let t = mm.store().create_test(test_for(c.id)).await.unwrap();
    let q1 = mm
        .store()
        .create_question(question(t.id, "first"))
        .await
        .unwrap();
    let q2 = mm
        .store()
        .create_question(question(t.id, "second"))
        .await
        .unwrap();
    let foreign_option = mm
        .store()
        .answers(&AnswerFilter {
            question_id: Some(q2.id),
        })
        .await
        .unwrap()
        .pop()
        .unwrap();
    let student = mm.store().create_user(user("grace")).await.unwrap();

    let err = mm
        .store()
        .create_user_answer(UserAnswerCreate {
            user_id: student.id,
            question_id: q1.id,
            selected_answer_id: Some(foreign_option.id),
            is_correct: true,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation { .. }));

    // the rejected submission left nothing behind
    assert!(
        mm.store()
            .user_answers(&UserAnswerFilter {
                user_id: Some(student.id),
                question_id: None,
            })
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn deleting_a_user_orphans_their_events() {
    let dir = tempfile::tempdir().unwrap();
    let mm = ModelManager::json(dir.path()).await.unwrap();

    let trainer = mm.store().create_user(user("harriet")).await.unwrap();
    let event = mm
        .store()
        .create_event(EventCreate {
            title: "onboarding day".to_string(),
            description: None,
            trainer_id: trainer.id,
            event_date: None,
            location: None,
            format: None,
            seats_count: None,
        })
        .await
        .unwrap();
    assert_eq!(event.trainer_id, Some(trainer.id));

    assert!(mm.store().delete_user(trainer.id).await.unwrap());

    // the event survives without its trainer
    let orphaned = mm.store().event_by_id(event.id).await.unwrap().unwrap();
    assert_eq!(orphaned.trainer_id, None);

    // a missing trainer is rejected up front
    let err = mm
        .store()
        .create_event(EventCreate {
            title: "ghost session".to_string(),
            description: None,
            trainer_id: 999,
            event_date: None,
            location: None,
            format: None,
            seats_count: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation { .. }));
}

#[tokio::test]
async fn enrollment_is_unique_per_user_course_kind() {
    let dir = tempfile::tempdir().unwrap();
    let mm = ModelManager::json(dir.path()).await.unwrap();

    let c = mm.store().create_course(course("enrollable")).await.unwrap();
    let u = mm.store().create_user(user("dave")).await.unwrap();

    let first = mm
        .store()
        .insert_enrollment(u.id, c.id, EnrollmentKind::Student)
        .await
        .unwrap();
    let err = mm
        .store()
        .insert_enrollment(u.id, c.id, EnrollmentKind::Student)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));

    // the graph smooths the conflict into idempotency
    let again = mm
        .graph()
        .enroll(u.id, c.id, EnrollmentKind::Student)
        .await
        .unwrap();
    assert_eq!(again.id, first.id);

    // same pair, different kind, is a distinct edge
    mm.store()
        .insert_enrollment(u.id, c.id, EnrollmentKind::Trainer)
        .await
        .unwrap();

    assert!(mm.graph().unenroll(u.id, c.id, EnrollmentKind::Student).await.unwrap());
    // removing an absent edge reports false and nothing else
    assert!(!mm.graph().unenroll(u.id, c.id, EnrollmentKind::Student).await.unwrap());
}
