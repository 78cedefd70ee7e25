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
        entity::{Event, EventCreate, EventFilter, EventPatch},
    },
    policy::Action,
    web::{
        AppState, RequestContext, WebError, WebResult, error::ErrorResponse, middlewares,
        routes::actor_scope,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(events_list_handler).post(events_create_handler))
        .route(
            "/{id}",
            get(events_get_handler)
                .put(events_update_handler)
                .delete(events_delete_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/events",
    params(EventFilter),
    description = "Lists events visible to the actor; trainers see only their own",
    responses(
        (status = 200, description = "Visible events", body = Vec<Event>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
    ),
    tag = "events",
    security(("cookie" = []))
)]
pub async fn events_list_handler(
    ctx: RequestContext,
    Query(filter): Query<EventFilter>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Event).await?;

    let events = state
        .mm()
        .store()
        .events(&filter)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Event, e))?;

    let visible: Vec<_> = events
        .into_iter()
        .filter(|e| scope.decide_event(Action::Read, e.trainer_id))
        .collect();

    Ok((StatusCode::OK, Json(visible)))
}

#[utoipa::path(
    post,
    path = "/api/v1/events",
    request_body = EventCreate,
    description = "Schedules an event; admin and manager only",
    responses(
        (status = 200, description = "Event created", body = Event),
        (status = 400, description = "Trainer does not exist", body = ErrorResponse),
        (status = 403, description = "Insufficient privileges", body = ErrorResponse),
    ),
    tag = "events",
    security(("cookie" = []))
)]
pub async fn events_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<EventCreate>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Event).await?;
    scope
        .require_privileged()
        .map_err(|e| WebError::from_store(EntityKind::Event, e))?;

    let created = state
        .mm()
        .store()
        .create_event(payload)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Event, e))?;

    Ok((StatusCode::OK, Json(created)))
}

pub async fn events_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Event).await?;

    let event = fetch_event(&state, id).await?;
    scope
        .authorize_event(Action::Read, event.trainer_id)
        .map_err(|e| WebError::from_store(EntityKind::Event, e))?;

    Ok((StatusCode::OK, Json(event)))
}

pub async fn events_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<EventPatch>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Event).await?;

    let event = fetch_event(&state, id).await?;
    scope
        .authorize_event(Action::Update, event.trainer_id)
        .map_err(|e| WebError::from_store(EntityKind::Event, e))?;

    let updated = state
        .mm()
        .store()
        .update_event(id, patch)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Event, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Event))?;

    Ok((StatusCode::OK, Json(updated)))
}

pub async fn events_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Event).await?;

    let event = fetch_event(&state, id).await?;
    scope
        .authorize_event(Action::Delete, event.trainer_id)
        .map_err(|e| WebError::from_store(EntityKind::Event, e))?;

    state
        .mm()
        .store()
        .delete_event(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Event, e))?;

    Ok(StatusCode::OK)
}

async fn fetch_event(state: &AppState, id: i64) -> WebResult<Event> {
    state
        .mm()
        .store()
        .event_by_id(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Event, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Event))
}
