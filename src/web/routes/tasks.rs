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
        entity::{Task, TaskCreate, TaskFilter, TaskPatch},
    },
    policy::Action,
    web::{
        AppState, RequestContext, WebError, WebResult, error::ErrorResponse, middlewares,
        routes::actor_scope,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(tasks_list_handler).post(tasks_create_handler))
        .route(
            "/{id}",
            get(tasks_get_handler)
                .put(tasks_update_handler)
                .delete(tasks_delete_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    params(TaskFilter),
    responses(
        (status = 200, description = "Tasks visible to the actor", body = Vec<Task>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
    ),
    tag = "tasks",
    security(("cookie" = []))
)]
pub async fn tasks_list_handler(
    ctx: RequestContext,
    Query(filter): Query<TaskFilter>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Task).await?;

    let tasks = state
        .mm()
        .store()
        .task_items(&filter)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Task, e))?;

    let visible: Vec<_> = tasks
        .into_iter()
        .filter(|t| {
            scope.decide_task(
                Action::Read,
                t.course_id,
                t.created_by_id,
                t.assigned_to_user_id,
            )
        })
        .collect();

    Ok((StatusCode::OK, Json(visible)))
}

#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = TaskCreate,
    description = "Creates a task; students may only assign it to themselves",
    responses(
        (status = 200, description = "Task created", body = Task),
        (status = 403, description = "Task is outside your scope", body = ErrorResponse),
    ),
    tag = "tasks",
    security(("cookie" = []))
)]
pub async fn tasks_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(mut payload): Json<TaskCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let scope = actor_scope(&state, &ctx, EntityKind::Task).await?;

    payload.created_by_id = user.user_id();
    scope
        .authorize_task(
            Action::Create,
            payload.course_id,
            payload.created_by_id,
            payload.assigned_to_user_id,
        )
        .map_err(|e| WebError::from_store(EntityKind::Task, e))?;

    let created = state
        .mm()
        .store()
        .create_task(payload)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Task, e))?;

    Ok((StatusCode::OK, Json(created)))
}

pub async fn tasks_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Task).await?;

    let task = fetch_task(&state, id).await?;
    scope
        .authorize_task(
            Action::Read,
            task.course_id,
            task.created_by_id,
            task.assigned_to_user_id,
        )
        .map_err(|e| WebError::from_store(EntityKind::Task, e))?;

    Ok((StatusCode::OK, Json(task)))
}

pub async fn tasks_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<TaskPatch>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Task).await?;

    let task = fetch_task(&state, id).await?;
    scope
        .authorize_task(
            Action::Update,
            task.course_id,
            task.created_by_id,
            task.assigned_to_user_id,
        )
        .map_err(|e| WebError::from_store(EntityKind::Task, e))?;

    let updated = state
        .mm()
        .store()
        .update_task(id, patch)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Task, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Task))?;

    Ok((StatusCode::OK, Json(updated)))
}

pub async fn tasks_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Task).await?;

    let task = fetch_task(&state, id).await?;
    scope
        .authorize_task(
            Action::Delete,
            task.course_id,
            task.created_by_id,
            task.assigned_to_user_id,
        )
        .map_err(|e| WebError::from_store(EntityKind::Task, e))?;

    state
        .mm()
        .store()
        .delete_task(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Task, e))?;

    Ok(StatusCode::OK)
}

async fn fetch_task(state: &AppState, id: i64) -> WebResult<Task> {
    state
        .mm()
        .store()
        .task_by_id(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Task, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Task))
}
