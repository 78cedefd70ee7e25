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
        entity::{Module, ModuleCreate, ModuleFilter, ModulePatch},
    },
    policy::Action,
    web::{
        AppState, RequestContext, WebError, WebResult, error::ErrorResponse, middlewares,
        routes::actor_scope,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(modules_list_handler).post(modules_create_handler))
        .route(
            "/{id}",
            get(modules_get_handler)
                .put(modules_update_handler)
                .delete(modules_delete_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/modules",
    params(ModuleFilter),
    responses(
        (status = 200, description = "Modules visible to the actor", body = Vec<Module>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
    ),
    tag = "modules",
    security(("cookie" = []))
)]
pub async fn modules_list_handler(
    ctx: RequestContext,
    Query(filter): Query<ModuleFilter>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Module).await?;

    let modules = state
        .mm()
        .store()
        .modules(&filter)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Module, e))?;
    let modules = scope.filter_readable(modules, |m| (m.course_id, m.is_published));

    Ok((StatusCode::OK, Json(modules)))
}

pub async fn modules_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<ModuleCreate>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Module).await?;
    scope
        .authorize(Action::Create, payload.course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Module, e))?;

    let created = state
        .mm()
        .store()
        .create_module(payload)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Module, e))?;

    Ok((StatusCode::OK, Json(created)))
}

pub async fn modules_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Module).await?;

    let module = state
        .mm()
        .store()
        .module_by_id(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Module, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Module))?;

    scope
        .authorize(Action::Read, module.course_id, module.is_published)
        .map_err(|e| WebError::from_store(EntityKind::Module, e))?;

    Ok((StatusCode::OK, Json(module)))
}

pub async fn modules_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<ModulePatch>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Module).await?;

    let module = state
        .mm()
        .store()
        .module_by_id(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Module, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Module))?;

    scope
        .authorize(Action::Update, module.course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Module, e))?;

    let updated = state
        .mm()
        .store()
        .update_module(id, patch)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Module, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Module))?;

    Ok((StatusCode::OK, Json(updated)))
}

pub async fn modules_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Module).await?;

    let module = state
        .mm()
        .store()
        .module_by_id(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Module, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Module))?;

    scope
        .authorize(Action::Delete, module.course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Module, e))?;

    state
        .mm()
        .store()
        .delete_module(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Module, e))?;

    Ok(StatusCode::OK)
}
