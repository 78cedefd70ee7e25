use crate::{
    Config,
    model::EntityKind,
    policy::ActorScope,
    web::{AppState, RequestContext, WebError, WebResult, doc::ApiDoc},
};
use axum::Router;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, services::ServeDir};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod account;
pub mod courses;
pub mod events;
pub mod lessons;
pub mod materials;
pub mod modules;
pub mod questions;
pub mod tasks;
pub mod tests;
pub mod users;

/// Builds the actor's policy scope for this request; unauthenticated
/// requests stop here with 401.
pub(crate) async fn actor_scope(
    state: &AppState,
    ctx: &RequestContext,
    kind: EntityKind,
) -> WebResult<ActorScope> {
    let user = ctx.user()?;
    state
        .policy()
        .scope_for(user.actor())
        .await
        .map_err(|e| WebError::from_store(kind, e))
}

pub fn build_app<S: Send + Sync + Clone + 'static>(
    state: AppState,
    config: &'static Config,
) -> Router<S> {
    let mut router = Router::new()
        .nest("/api/v1/account/", account::routes(state.clone()))
        .nest("/api/v1/users/", users::routes(state.clone()))
        .nest("/api/v1/courses/", courses::routes(state.clone()))
        .nest("/api/v1/modules/", modules::routes(state.clone()))
        .nest("/api/v1/lessons/", lessons::routes(state.clone()))
        .nest("/api/v1/tests/", tests::routes(state.clone()))
        .nest("/api/v1/questions/", questions::routes(state.clone()))
        .nest("/api/v1/tasks/", tasks::routes(state.clone()))
        .nest("/api/v1/materials/", materials::routes(state.clone()))
        .nest("/api/v1/events/", events::routes(state.clone()))
        .nest_service("/static/", ServeDir::new("static"))
        .nest_service("/uploads/", ServeDir::new("uploads"))
        .layer(CookieManagerLayer::default())
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    if config.app().docs() {
        let openapi = ApiDoc::openapi();

        router = router.merge(SwaggerUi::new("/api/v1/docs").url("/api-doc/openapi.json", openapi));
    }

    router
}
