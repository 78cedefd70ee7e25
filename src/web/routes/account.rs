use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Duration;
use serde::Deserialize;
use tower_cookies::{Cookie, Cookies, cookie::SameSite};

use crate::{
    Config,
    auth::{self, SessionClaims, hash_password, verify_password},
    model::{EntityKind, entity::UserCreate},
    web::{
        AppState, RequestContext, WebError, WebResult, error::ErrorResponse,
        middlewares::{self, AUTH_TOKEN},
    },
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SignupBody {
    pub login: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SigninBody {
    pub login: String,
    pub password: String,
}

pub fn routes<S>(state: AppState) -> Router<S> {
    let protected = Router::new()
        .route("/verify", get(account_verify_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ));

    Router::new()
        .route("/signup", post(account_signup_handler))
        .route("/signin", post(account_signin_handler))
        .merge(protected)
        .with_state(state)
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_TOKEN, token);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie
}

async fn issue_session(cookies: &Cookies, user_id: i64) -> WebResult<()> {
    let jwt_key = Config::get_or_init(false).await.app().jwt();

    let claims = SessionClaims::for_user(user_id, Duration::days(1));
    let token = auth::generate_token(&claims, jwt_key)
        .map_err(|e| WebError::server_crypt_error(e.into()))?;
    cookies.add(session_cookie(token));
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/v1/account/signup",
    request_body = SignupBody,
    description = "Creates new user account with the student role",
    responses(
        (status = 200, description = "Account created successfully", body = crate::model::entity::User),
        (status = 409, description = "Login already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account"
)]
pub async fn account_signup_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<SignupBody>,
) -> WebResult<impl IntoResponse> {
    let found = state
        .mm()
        .store()
        .user_by_login(&payload.login)
        .await
        .map_err(|e| WebError::from_store(EntityKind::User, e))?;

    if found.is_some() {
        return Err(WebError::registration_conflict());
    }

    let hash = hash_password(&payload.password).map_err(WebError::server_crypt_error)?;
    let data = UserCreate {
        login: payload.login,
        password_hash: hash,
        full_name: payload.full_name,
        // self-service signup never picks its own role
        role: String::from("student"),
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

    issue_session(&cookies, created.id).await?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    post,
    path = "/api/v1/account/signin",
    description = "Authorizes user in the system",
    request_body = SigninBody,
    responses(
        (status = 200, description = "User signed in", body = crate::model::entity::User),
        (status = 401, description = "Credentials invalid", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
)]
pub async fn account_signin_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<SigninBody>,
) -> WebResult<impl IntoResponse> {
    let found = state
        .mm()
        .store()
        .user_by_login(&payload.login)
        .await
        .map_err(|e| WebError::from_store(EntityKind::User, e))?;

    let Some(found) = found else {
        return Err(WebError::auth_invalid_credentials());
    };

    let is_verified =
        verify_password(&found.password_hash, &payload.password).map_err(WebError::server_crypt_error)?;

    if !is_verified || !found.is_active {
        return Err(WebError::auth_invalid_credentials());
    }

    issue_session(&cookies, found.id).await?;

    Ok((StatusCode::OK, Json(found)))
}

async fn account_verify_handler(ctx: RequestContext) -> WebResult<impl IntoResponse> {
    let user = ctx.maybe_user();

    if user.is_none() {
        return Ok(StatusCode::UNAUTHORIZED);
    }

    Ok(StatusCode::OK)
}
