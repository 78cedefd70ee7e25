mod common;

use axum::http::StatusCode;
use corso::model::entity::CourseCreate;
use serde_json::{Value, json};

use crate::common::{Action, Flow, setup_env, setup_server, signin_admin_action, signup_action};

fn course_id(ctx: &common::FlowContext, key: &str) -> i64 {
    ctx.get(key)["id"].as_i64().expect("course id")
}

fn seed_course(title: &str) -> CourseCreate {
    CourseCreate {
        title: title.to_string(),
        description: "seeded".to_string(),
        short_description: None,
        image_url: None,
        duration_hours: 1,
        tags: vec![],
        requirements: vec![],
        what_you_learn: vec![],
    }
}

#[tokio::test]
async fn course_lifecycle_flow() {
    let env = setup_env().await;
    let mut server = setup_server(&env).await;

    Flow::new()
        .step(signin_admin_action())
        .step(
            Action::new("course_create", "POST", "/api/v1/courses/")
                .with_body(json!({
                    "title": "Rust for teams",
                    "description": "From zero to borrow checker",
                }))
                .with_save_as("course")
                .assert_body(|body| {
                    assert!(body.contains(r#""title":"Rust for teams""#));
                }),
        )
        .step(
            Action::new("lesson_create_published", "POST", "/api/v1/lessons/")
                .with_dyn_body(|ctx| {
                    json!({
                        "course_id": course_id(ctx, "course"),
                        "title": "Ownership",
                        "content_type": "text",
                        "content_text": "moves and borrows",
                        "duration_minutes": 45,
                        "order": 0,
                    })
                }),
        )
        .step(
            Action::new("lesson_create_draft", "POST", "/api/v1/lessons/")
                .with_dyn_body(|ctx| {
                    json!({
                        "course_id": course_id(ctx, "course"),
                        "title": "Unsafe secrets",
                        "content_type": "text",
                        "content_text": "wip",
                        "duration_minutes": 60,
                        "order": 1,
                        "is_published": false,
                    })
                }),
        )
        // admin detail carries both lessons and no annotation
        .step(
            Action::new("detail_as_admin", "GET", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/courses/{}", course_id(ctx, "course")))
                .assert_body(|body| {
                    assert!(body.contains("Ownership"));
                    assert!(body.contains("Unsafe secrets"));
                    assert!(!body.contains("enrollment"));
                }),
        )
        .run(&mut server, env)
        .await;
}

#[tokio::test]
async fn students_are_scoped_by_enrollment() {
    let env = setup_env().await;
    let mut server = setup_server(&env).await;

    Flow::new()
        .step(signin_admin_action())
        .step(
            Action::new("course_create", "POST", "/api/v1/courses/")
                .with_body(json!({
                    "title": "Scoped course",
                    "description": "enrollment required",
                }))
                .with_save_as("course"),
        )
        .step(
            Action::new("lesson_create_published", "POST", "/api/v1/lessons/")
                .with_dyn_body(|ctx| {
                    json!({
                        "course_id": course_id(ctx, "course"),
                        "title": "Welcome",
                        "content_type": "text",
                        "content_text": "hello",
                        "duration_minutes": 10,
                        "order": 0,
                    })
                }),
        )
        .step(
            Action::new("lesson_create_draft", "POST", "/api/v1/lessons/")
                .with_dyn_body(|ctx| {
                    json!({
                        "course_id": course_id(ctx, "course"),
                        "title": "Hidden draft",
                        "content_type": "text",
                        "content_text": "wip",
                        "duration_minutes": 10,
                        "order": 1,
                        "is_published": false,
                    })
                }),
        )
        // fresh student session
        .step(signup_action("student1", "hunter2").with_clear_cookies(true))
        // students cannot create courses
        .step(
            Action::new("course_create_denied", "POST", "/api/v1/courses/")
                .with_body(json!({
                    "title": "nope",
                    "description": "nope",
                }))
                .with_expect(StatusCode::FORBIDDEN),
        )
        // nor read a course they are not enrolled in
        .step(
            Action::new("detail_denied", "GET", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/courses/{}", course_id(ctx, "course")))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("enroll", "POST", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/courses/{}/enroll", course_id(ctx, "course")))
                .assert_body(|body| {
                    assert!(body.contains(r#""kind":"student""#));
                }),
        )
        // enrolling twice changes nothing
        .step(
            Action::new("enroll_again", "POST", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/courses/{}/enroll", course_id(ctx, "course"))),
        )
        // the detail view is now annotated and the draft stays hidden
        .step(
            Action::new("detail_as_student", "GET", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/courses/{}", course_id(ctx, "course")))
                .assert_body(|body| {
                    assert!(body.contains("enrollment"));
                    assert!(body.contains("Welcome"));
                    assert!(!body.contains("Hidden draft"));
                }),
        )
        .step(
            Action::new("summary_as_student", "GET", "dynamic")
                .with_dyn_path(|ctx| {
                    format!("/api/v1/courses/{}/summary", course_id(ctx, "course"))
                })
                .assert_body(|body| {
                    let summary: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(summary["lesson_count"], 1);
                    assert_eq!(summary["total_duration_minutes"], 10);
                }),
        )
        // mutations inside the enrollment are still read-only for students
        .step(
            Action::new("course_update_denied", "PUT", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/courses/{}", course_id(ctx, "course")))
                .with_body(json!({ "title": "hijacked" }))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("unenroll", "DELETE", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/courses/{}/enroll", course_id(ctx, "course"))),
        )
        .step(
            Action::new("detail_denied_after_unenroll", "GET", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/courses/{}", course_id(ctx, "course")))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .run(&mut server, env)
        .await;
}

#[tokio::test]
async fn my_courses_ignore_listing_pagination() {
    let env = setup_env().await;

    // the enrollment target is the oldest course, well outside the
    // default listing page of 20 newest
    let oldest = env
        .mm
        .store()
        .create_course(seed_course("Legacy onboarding"))
        .await
        .unwrap();
    let oldest_id = oldest.id;
    for n in 0..25 {
        env.mm
            .store()
            .create_course(seed_course(&format!("Filler {n}")))
            .await
            .unwrap();
    }

    let mut server = setup_server(&env).await;

    Flow::new()
        .step(signup_action("olga", "hunter2"))
        .step(
            Action::new("enroll_oldest", "POST", "dynamic")
                .with_dyn_path(move |_| format!("/api/v1/courses/{oldest_id}/enroll")),
        )
        .step(
            Action::new("my_courses", "GET", "/api/v1/courses/my").assert_body(move |body| {
                let courses: Vec<Value> = serde_json::from_str(body).unwrap();
                assert_eq!(courses.len(), 1);
                assert_eq!(courses[0]["id"].as_i64(), Some(oldest_id));
                assert_eq!(courses[0]["title"], "Legacy onboarding");
            }),
        )
        .run(&mut server, env)
        .await;
}

#[tokio::test]
async fn anonymous_requests_are_rejected() {
    let env = setup_env().await;
    let mut server = setup_server(&env).await;

    Flow::new()
        .step(
            Action::new("courses_anonymous", "GET", "/api/v1/courses/")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(
            Action::new("tasks_anonymous", "GET", "/api/v1/tasks/")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .run(&mut server, env)
        .await;
}
