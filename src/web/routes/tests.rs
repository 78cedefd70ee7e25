use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use crate::{
    model::{
        EntityKind,
        entity::{AnswerCreate, QuestionCreate, QuestionFilter, Test, TestCreate, TestFilter, TestPatch},
    },
    policy::Action,
    web::{
        AppState, RequestContext, WebError, WebResult, error::ErrorResponse, middlewares,
        routes::actor_scope,
    },
};

/// Answer option nested in a question body; the owning question id is
/// assigned by the store.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AnswerOptionBody {
    pub answer_text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct QuestionCreateBody {
    pub question_text: String,
    pub question_type: String,
    #[serde(default)]
    pub answers: Vec<AnswerOptionBody>,
}

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(tests_list_handler).post(tests_create_handler))
        .route(
            "/{id}",
            get(tests_get_handler)
                .put(tests_update_handler)
                .delete(tests_delete_handler),
        )
        .route(
            "/{id}/questions",
            get(tests_questions_handler).post(tests_add_question_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/tests",
    params(TestFilter),
    responses(
        (status = 200, description = "Tests visible to the actor", body = Vec<Test>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
    ),
    tag = "tests",
    security(("cookie" = []))
)]
pub async fn tests_list_handler(
    ctx: RequestContext,
    Query(filter): Query<TestFilter>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Test).await?;

    let tests = state
        .mm()
        .store()
        .tests(&filter)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Test, e))?;
    let tests = scope.filter_readable(tests, |t| (t.course_id, true));

    Ok((StatusCode::OK, Json(tests)))
}

pub async fn tests_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<TestCreate>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Test).await?;
    scope
        .authorize(Action::Create, payload.course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Test, e))?;

    let created = state
        .mm()
        .store()
        .create_test(payload)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Test, e))?;

    Ok((StatusCode::OK, Json(created)))
}

pub async fn tests_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Test).await?;

    let test = fetch_test(&state, id).await?;
    scope
        .authorize(Action::Read, test.course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Test, e))?;

    Ok((StatusCode::OK, Json(test)))
}

pub async fn tests_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<TestPatch>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Test).await?;

    let test = fetch_test(&state, id).await?;
    scope
        .authorize(Action::Update, test.course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Test, e))?;

    let updated = state
        .mm()
        .store()
        .update_test(id, patch)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Test, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Test))?;

    Ok((StatusCode::OK, Json(updated)))
}

pub async fn tests_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Test).await?;

    let test = fetch_test(&state, id).await?;
    scope
        .authorize(Action::Delete, test.course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Test, e))?;

    state
        .mm()
        .store()
        .delete_test(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Test, e))?;

    Ok(StatusCode::OK)
}

pub async fn tests_questions_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Question).await?;

    let test = fetch_test(&state, id).await?;
    scope
        .authorize(Action::Read, test.course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Question, e))?;

    let questions = state
        .mm()
        .store()
        .questions(&QuestionFilter { test_id: Some(id) })
        .await
        .map_err(|e| WebError::from_store(EntityKind::Question, e))?;

    Ok((StatusCode::OK, Json(questions)))
}

pub async fn tests_add_question_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<QuestionCreateBody>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Question).await?;

    let test = fetch_test(&state, id).await?;
    scope
        .authorize(Action::Create, test.course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Question, e))?;

    let data = QuestionCreate {
        test_id: id,
        question_text: payload.question_text,
        question_type: payload.question_type,
        answers: payload
            .answers
            .into_iter()
            .map(|a| AnswerCreate {
                question_id: 0, // replaced with the created question's id
                answer_text: a.answer_text,
                is_correct: a.is_correct,
            })
            .collect(),
    };

    let created = state
        .mm()
        .store()
        .create_question(data)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Question, e))?;

    Ok((StatusCode::OK, Json(created)))
}

async fn fetch_test(state: &AppState, id: i64) -> WebResult<Test> {
    state
        .mm()
        .store()
        .test_by_id(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Test, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Test))
}
