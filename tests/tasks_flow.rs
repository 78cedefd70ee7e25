mod common;

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{Action, Flow, setup_env, setup_server, signin_admin_action, signup_action};

fn id_of(ctx: &common::FlowContext, key: &str) -> i64 {
    ctx.get(key)["id"].as_i64().expect("entity id")
}

#[tokio::test]
async fn student_task_rules_flow() {
    let env = setup_env().await;
    let mut server = setup_server(&env).await;

    Flow::new()
        .step(signin_admin_action())
        .step(
            Action::new("course_create", "POST", "/api/v1/courses/")
                .with_body(json!({
                    "title": "Task course",
                    "description": "homework",
                }))
                .with_save_as("course"),
        )
        .step(
            signup_action("tasker", "hunter2")
                .with_clear_cookies(true)
                .with_save_as("student"),
        )
        .step(
            Action::new("enroll", "POST", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/courses/{}/enroll", id_of(ctx, "course"))),
        )
        // a student may only assign work to themselves
        .step(
            Action::new("task_assigned_elsewhere", "POST", "/api/v1/tasks/")
                .with_dyn_body(|ctx| {
                    json!({
                        "course_id": id_of(ctx, "course"),
                        "title": "pawned off",
                        "assigned_to_user_id": 1,
                    })
                })
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("task_self_assigned", "POST", "/api/v1/tasks/")
                .with_dyn_body(|ctx| {
                    json!({
                        "course_id": id_of(ctx, "course"),
                        "title": "read chapter 4",
                        "assigned_to_user_id": id_of(ctx, "student"),
                    })
                })
                .with_save_as("task")
                .assert_body(|body| {
                    assert!(body.contains(r#""title":"read chapter 4""#));
                }),
        )
        // creators may update and delete their own tasks
        .step(
            Action::new("task_update_own", "PUT", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/tasks/{}", id_of(ctx, "task")))
                .with_body(json!({ "status": "done" }))
                .assert_body(|body| {
                    assert!(body.contains(r#""status":"done""#));
                }),
        )
        .step(
            Action::new("task_delete_own", "DELETE", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/tasks/{}", id_of(ctx, "task"))),
        )
        .step(
            Action::new("task_gone", "GET", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/tasks/{}", id_of(ctx, "task")))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, env)
        .await;
}
