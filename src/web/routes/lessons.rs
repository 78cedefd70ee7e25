use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};

use crate::{
    model::{
        EntityKind,
        entity::{Lesson, LessonCreate, LessonFilter, LessonPatch},
    },
    policy::Action,
    web::{
        AppState, RequestContext, WebError, WebResult, error::ErrorResponse, middlewares,
        routes::actor_scope,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(lessons_list_handler).post(lessons_create_handler))
        .route(
            "/{id}",
            get(lessons_get_handler)
                .put(lessons_update_handler)
                .delete(lessons_delete_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons",
    params(LessonFilter),
    description = "Lists lessons in render order; students see published content only",
    responses(
        (status = 200, description = "Lessons visible to the actor", body = Vec<Lesson>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
    ),
    tag = "lessons",
    security(("cookie" = []))
)]
pub async fn lessons_list_handler(
    ctx: RequestContext,
    Query(filter): Query<LessonFilter>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Lesson).await?;

    let lessons = state
        .mm()
        .store()
        .lessons(&filter)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Lesson, e))?;
    let lessons = scope.filter_readable(lessons, |l| (l.course_id, l.is_published));

    Ok((StatusCode::OK, Json(lessons)))
}

pub async fn lessons_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<LessonCreate>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Lesson).await?;
    scope
        .authorize(Action::Create, payload.course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Lesson, e))?;

    let created = state
        .mm()
        .store()
        .create_lesson(payload)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Lesson, e))?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{id}",
    description = "Fetch comprehensive info about a lesson including its content",
    params(("id" = i64, Path, description = "ID of the lesson to get")),
    responses(
        (status = 200, description = "Lesson found", body = Lesson),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 403, description = "Lesson is outside your enrollment", body = ErrorResponse),
    ),
    tag = "lessons",
    security(("cookie" = []))
)]
pub async fn lessons_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Lesson).await?;

    let lesson = state
        .mm()
        .store()
        .lesson_by_id(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Lesson, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Lesson))?;

    scope
        .authorize(Action::Read, lesson.course_id, lesson.is_published)
        .map_err(|e| WebError::from_store(EntityKind::Lesson, e))?;

    Ok((StatusCode::OK, Json(lesson)))
}

pub async fn lessons_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<LessonPatch>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Lesson).await?;

    let lesson = state
        .mm()
        .store()
        .lesson_by_id(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Lesson, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Lesson))?;

    scope
        .authorize(Action::Update, lesson.course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Lesson, e))?;

    let updated = state
        .mm()
        .store()
        .update_lesson(id, patch)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Lesson, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Lesson))?;

    Ok((StatusCode::OK, Json(updated)))
}

pub async fn lessons_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Lesson).await?;

    let lesson = state
        .mm()
        .store()
        .lesson_by_id(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Lesson, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Lesson))?;

    scope
        .authorize(Action::Delete, lesson.course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Lesson, e))?;

    state
        .mm()
        .store()
        .delete_lesson(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Lesson, e))?;

    Ok(StatusCode::OK)
}
