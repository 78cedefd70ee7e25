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
        entity::{Material, MaterialCreate, MaterialFilter, MaterialPatch},
    },
    policy::Action,
    web::{
        AppState, RequestContext, WebError, WebResult, error::ErrorResponse, middlewares,
        routes::actor_scope,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route(
            "/",
            get(materials_list_handler).post(materials_create_handler),
        )
        .route(
            "/{id}",
            get(materials_get_handler)
                .put(materials_update_handler)
                .delete(materials_delete_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/materials",
    params(MaterialFilter),
    responses(
        (status = 200, description = "Materials visible to the actor", body = Vec<Material>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
    ),
    tag = "materials",
    security(("cookie" = []))
)]
pub async fn materials_list_handler(
    ctx: RequestContext,
    Query(filter): Query<MaterialFilter>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Material).await?;

    let materials = state
        .mm()
        .store()
        .materials(&filter)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Material, e))?;
    let materials = scope.filter_readable(materials, |m| (m.course_id, true));

    Ok((StatusCode::OK, Json(materials)))
}

pub async fn materials_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<MaterialCreate>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Material).await?;
    scope
        .authorize(Action::Create, payload.course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Material, e))?;

    let created = state
        .mm()
        .store()
        .create_material(payload)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Material, e))?;

    Ok((StatusCode::OK, Json(created)))
}

pub async fn materials_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Material).await?;

    let material = fetch_material(&state, id).await?;
    scope
        .authorize(Action::Read, material.course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Material, e))?;

    Ok((StatusCode::OK, Json(material)))
}

pub async fn materials_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<MaterialPatch>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Material).await?;

    let material = fetch_material(&state, id).await?;
    scope
        .authorize(Action::Update, material.course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Material, e))?;

    let updated = state
        .mm()
        .store()
        .update_material(id, patch)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Material, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Material))?;

    Ok((StatusCode::OK, Json(updated)))
}

pub async fn materials_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Material).await?;

    let material = fetch_material(&state, id).await?;
    scope
        .authorize(Action::Delete, material.course_id, true)
        .map_err(|e| WebError::from_store(EntityKind::Material, e))?;

    state
        .mm()
        .store()
        .delete_material(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Material, e))?;

    Ok(StatusCode::OK)
}

async fn fetch_material(state: &AppState, id: i64) -> WebResult<Material> {
    state
        .mm()
        .store()
        .material_by_id(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Material, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Material))
}
