use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Deserialize;

use crate::{
    model::{
        EntityKind,
        entity::{
            AnswerCreate, AnswerFilter, AnswerPatch, Question, QuestionPatch, UserAnswerCreate,
            UserAnswerFilter,
        },
    },
    policy::Action,
    web::{
        AppState, RequestContext, WebError, WebResult, error::ErrorResponse, middlewares,
        routes::actor_scope,
    },
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AnswerCreateBody {
    pub answer_text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SubmitAnswerBody {
    pub selected_answer_id: Option<i64>,
}

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route(
            "/{id}",
            get(questions_get_handler)
                .put(questions_update_handler)
                .delete(questions_delete_handler),
        )
        .route(
            "/{id}/answers",
            get(questions_answers_handler).post(questions_add_answer_handler),
        )
        .route("/{id}/submit", post(questions_submit_handler))
        .route("/{id}/submissions", get(questions_submissions_handler))
        .route(
            "/answers/{id}",
            put(answers_update_handler).delete(answers_delete_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

/// Walks question -> test -> course to find the owning course id.
async fn owning_course(state: &AppState, question: &Question) -> WebResult<i64> {
    let test = state
        .mm()
        .store()
        .test_by_id(question.test_id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Test, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Test))?;
    Ok(test.course_id)
}

async fn fetch_question(state: &AppState, id: i64) -> WebResult<Question> {
    state
        .mm()
        .store()
        .question_by_id(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Question, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Question))
}

pub async fn questions_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Question).await?;

    let question = fetch_question(&state, id).await?;
    let course_id = owning_course(&state, &question).await?;
    scope
        .authorize(Action::Read, course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Question, e))?;

    Ok((StatusCode::OK, Json(question)))
}

pub async fn questions_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<QuestionPatch>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Question).await?;

    let question = fetch_question(&state, id).await?;
    let course_id = owning_course(&state, &question).await?;
    scope
        .authorize(Action::Update, course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Question, e))?;

    let updated = state
        .mm()
        .store()
        .update_question(id, patch)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Question, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Question))?;

    Ok((StatusCode::OK, Json(updated)))
}

pub async fn questions_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Question).await?;

    let question = fetch_question(&state, id).await?;
    let course_id = owning_course(&state, &question).await?;
    scope
        .authorize(Action::Delete, course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Question, e))?;

    state
        .mm()
        .store()
        .delete_question(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Question, e))?;

    Ok(StatusCode::OK)
}

pub async fn questions_answers_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Answer).await?;

    let question = fetch_question(&state, id).await?;
    let course_id = owning_course(&state, &question).await?;
    scope
        .authorize(Action::Read, course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Answer, e))?;

    let answers = state
        .mm()
        .store()
        .answers(&AnswerFilter {
            question_id: Some(id),
        })
        .await
        .map_err(|e| WebError::from_store(EntityKind::Answer, e))?;

    Ok((StatusCode::OK, Json(answers)))
}

pub async fn questions_add_answer_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AnswerCreateBody>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Answer).await?;

    let question = fetch_question(&state, id).await?;
    let course_id = owning_course(&state, &question).await?;
    scope
        .authorize(Action::Create, course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Answer, e))?;

    let created = state
        .mm()
        .store()
        .create_answer(AnswerCreate {
            question_id: id,
            answer_text: payload.answer_text,
            is_correct: payload.is_correct,
        })
        .await
        .map_err(|e| WebError::from_store(EntityKind::Answer, e))?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    post,
    path = "/api/v1/questions/{id}/submit",
    request_body = SubmitAnswerBody,
    description = "Records the current user's answer; correctness is graded against the selected option",
    params(("id" = i64, Path, description = "Question id")),
    responses(
        (status = 200, description = "Submission recorded", body = crate::model::entity::UserAnswer),
        (status = 400, description = "Answer does not belong to this question", body = ErrorResponse),
        (status = 404, description = "Question not found", body = ErrorResponse),
    ),
    tag = "questions",
    security(("cookie" = []))
)]
pub async fn questions_submit_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<SubmitAnswerBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let scope = actor_scope(&state, &ctx, EntityKind::UserAnswer).await?;

    let question = fetch_question(&state, id).await?;
    let course_id = owning_course(&state, &question).await?;
    scope
        .authorize_user_answer(Action::Create, user.user_id(), course_id)
        .map_err(|e| WebError::from_store(EntityKind::UserAnswer, e))?;

    // grade against the chosen option; the store re-checks ownership
    let is_correct = match payload.selected_answer_id {
        Some(answer_id) => state
            .mm()
            .store()
            .answer_by_id(answer_id)
            .await
            .map_err(|e| WebError::from_store(EntityKind::Answer, e))?
            .is_some_and(|a| a.question_id == id && a.is_correct),
        None => false,
    };

    let created = state
        .mm()
        .store()
        .create_user_answer(UserAnswerCreate {
            user_id: user.user_id(),
            question_id: id,
            selected_answer_id: payload.selected_answer_id,
            is_correct,
        })
        .await
        .map_err(|e| WebError::from_store(EntityKind::UserAnswer, e))?;

    Ok((StatusCode::OK, Json(created)))
}

pub async fn questions_submissions_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::UserAnswer).await?;

    let question = fetch_question(&state, id).await?;
    let course_id = owning_course(&state, &question).await?;

    let submissions = state
        .mm()
        .store()
        .user_answers(&UserAnswerFilter {
            user_id: None,
            question_id: Some(id),
        })
        .await
        .map_err(|e| WebError::from_store(EntityKind::UserAnswer, e))?;

    let visible: Vec<_> = submissions
        .into_iter()
        .filter(|ua| scope.decide_user_answer(Action::Read, ua.user_id, course_id))
        .collect();

    Ok((StatusCode::OK, Json(visible)))
}

pub async fn answers_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<AnswerPatch>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Answer).await?;

    let answer = state
        .mm()
        .store()
        .answer_by_id(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Answer, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Answer))?;

    let question = fetch_question(&state, answer.question_id).await?;
    let course_id = owning_course(&state, &question).await?;
    scope
        .authorize(Action::Update, course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Answer, e))?;

    let updated = state
        .mm()
        .store()
        .update_answer(id, patch)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Answer, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Answer))?;

    Ok((StatusCode::OK, Json(updated)))
}

pub async fn answers_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Answer).await?;

    let answer = state
        .mm()
        .store()
        .answer_by_id(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Answer, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Answer))?;

    let question = fetch_question(&state, answer.question_id).await?;
    let course_id = owning_course(&state, &question).await?;
    scope
        .authorize(Action::Delete, course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Answer, e))?;

    state
        .mm()
        .store()
        .delete_answer(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Answer, e))?;

    Ok(StatusCode::OK)
}
