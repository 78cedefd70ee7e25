use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    auth::hash_password,
    model::{
        EntityKind,
        entity::{UserCreate, UserFilter, UserPatch},
    },
    web::{
        AppState, RequestContext, WebError, WebResult, error::ErrorResponse, middlewares,
        routes::actor_scope,
    },
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserCreateBody {
    pub login: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    pub role: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UserUpdateBody {
    pub login: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub is_active: Option<bool>,
}

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(users_list_handler).post(users_create_handler))
        .route(
            "/{id}",
            get(users_get_handler)
                .put(users_update_handler)
                .delete(users_delete_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(UserFilter),
    responses(
        (status = 200, description = "Page of users", body = Vec<crate::model::entity::User>),
        (status = 403, description = "Privileged roles only", body = ErrorResponse),
    ),
    tag = "users",
    security(("cookie" = []))
)]
pub async fn users_list_handler(
    ctx: RequestContext,
    Query(filter): Query<UserFilter>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::User).await?;
    scope
        .require_privileged()
        .map_err(|e| WebError::from_store(EntityKind::User, e))?;

    let users = state
        .mm()
        .store()
        .users(&filter)
        .await
        .map_err(|e| WebError::from_store(EntityKind::User, e))?;

    Ok((StatusCode::OK, Json(users)))
}

pub async fn users_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<UserCreateBody>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::User).await?;
    scope
        .require_privileged()
        .map_err(|e| WebError::from_store(EntityKind::User, e))?;

    let hash = hash_password(&payload.password).map_err(WebError::server_crypt_error)?;
    let data = UserCreate {
        login: payload.login,
        password_hash: hash,
        full_name: payload.full_name,
        role: payload.role,
        company: payload.company,
        department: payload.department,
        position: payload.position,
    };

    let created = state
        .mm()
        .store()
        .create_user(data)
        .await
        .map_err(|e| WebError::from_store(EntityKind::User, e))?;

    Ok((StatusCode::OK, Json(created)))
}

pub async fn users_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    if user.user_id() != id {
        let scope = actor_scope(&state, &ctx, EntityKind::User).await?;
        scope
            .require_privileged()
            .map_err(|e| WebError::from_store(EntityKind::User, e))?;
    }

    let found = state
        .mm()
        .store()
        .user_by_id(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::User, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::User))?;

    Ok((StatusCode::OK, Json(found)))
}

pub async fn users_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdateBody>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::User).await?;
    scope
        .require_privileged()
        .map_err(|e| WebError::from_store(EntityKind::User, e))?;

    let password_hash = match &payload.password {
        Some(password) => Some(hash_password(password).map_err(WebError::server_crypt_error)?),
        None => None,
    };

    let patch = UserPatch {
        login: payload.login,
        password_hash,
        full_name: payload.full_name,
        role: payload.role,
        company: payload.company,
        department: payload.department,
        position: payload.position,
        is_active: payload.is_active,
    };

    let updated = state
        .mm()
        .store()
        .update_user(id, patch)
        .await
        .map_err(|e| WebError::from_store(EntityKind::User, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::User))?;

    Ok((StatusCode::OK, Json(updated)))
}

pub async fn users_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::User).await?;
    scope
        .require_privileged()
        .map_err(|e| WebError::from_store(EntityKind::User, e))?;

    let deleted = state
        .mm()
        .store()
        .delete_user(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::User, e))?;

    if !deleted {
        return Err(WebError::resource_not_found(EntityKind::User));
    }

    Ok(StatusCode::OK)
}
