use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::{
    auth::CryptError,
    error::log_error,
    model::{EntityKind, StoreError},
};

pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("RegistrationUserConflict")]
    RegistrationUserConflict,
}

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("AuthenticationCookieNotFound, cookie: {cookie}")]
    AuthenticationCookieNotFound { cookie: String },

    #[error("AuthenticationCookieInvalid, cookie: {cookie}. Error: {error}")]
    AuthenticationCookieInvalid {
        cookie: String,
        error: jsonwebtoken::errors::Error,
    },

    #[error("AuthenticationRequired")]
    AuthenticationRequired,

    #[error("AuthenticationInvalidCredentials")]
    AuthenticationInvalidCredentials,
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("ResourceNotFound: {kind:?}")]
    ResourceNotFound { kind: EntityKind },

    #[error("ResourceForbidden: {kind:?}")]
    ResourceForbidden { kind: EntityKind },

    #[error("ResourceConflict: {kind:?}, {detail}")]
    ResourceConflict { kind: EntityKind, detail: String },

    #[error("ResourceBadRequest: {kind:?}, {detail}")]
    ResourceBadRequest { kind: EntityKind, detail: String },

    #[error("ResourceFetchError: {kind:?}. Error: {error}")]
    ResourceFetchError { kind: EntityKind, error: StoreError },
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("ServerCryptError: {0}")]
    ServerCryptError(#[from] crate::auth::CryptError),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    pub fn client_display(&self) -> String {
        String::from("Internal server error.")
    }
}

impl RegistrationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RegistrationUserConflict => StatusCode::CONFLICT,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::RegistrationUserConflict => String::from("User with this login already exists."),
        }
    }
}

impl AuthenticationError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    pub fn client_display(&self) -> String {
        String::from("Authentication error.")
    }
}

impl ResourceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ResourceForbidden { .. } => StatusCode::FORBIDDEN,
            Self::ResourceConflict { .. } => StatusCode::CONFLICT,
            Self::ResourceBadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::ResourceFetchError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceNotFound { kind } => format!("{kind:?} not found."),
            Self::ResourceForbidden { kind } => format!("Access to this {kind:?} is forbidden."),
            Self::ResourceConflict { kind, detail } => format!("{kind:?} conflict: {detail}"),
            Self::ResourceBadRequest { kind, detail } => format!("Bad {kind:?} request: {detail}"),
            Self::ResourceFetchError { .. } => String::from("Internal server error."),
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("AuthenticationError - {0}")]
    AuthenticationError(#[from] AuthenticationError),
    #[error("ResourceError - {0}")]
    ResourceError(#[from] ResourceError),
    #[error("RegistrationError - {0}")]
    RegistrationError(#[from] RegistrationError),
    #[error("ServerError - {0}")]
    ServerError(#[from] ServerError),
}

impl WebError {
    pub fn resource_not_found(kind: EntityKind) -> Self {
        Self::ResourceError(ResourceError::ResourceNotFound { kind })
    }

    pub fn resource_forbidden(kind: EntityKind) -> Self {
        Self::ResourceError(ResourceError::ResourceForbidden { kind })
    }

    pub fn resource_bad_request<S: Into<String>>(kind: EntityKind, detail: S) -> Self {
        Self::ResourceError(ResourceError::ResourceBadRequest {
            kind,
            detail: detail.into(),
        })
    }

    /// Renders the store taxonomy onto HTTP-facing variants; everything
    /// the store calls Conflict/Validation/Forbidden keeps its meaning,
    /// the rest is an opaque fetch error.
    pub fn from_store(kind: EntityKind, error: StoreError) -> Self {
        match error {
            StoreError::Conflict { kind, detail } => {
                Self::ResourceError(ResourceError::ResourceConflict { kind, detail })
            }
            StoreError::Validation { kind, detail } => {
                Self::ResourceError(ResourceError::ResourceBadRequest { kind, detail })
            }
            StoreError::Forbidden => Self::resource_forbidden(kind),
            error => Self::ResourceError(ResourceError::ResourceFetchError { kind, error }),
        }
    }

    pub fn auth_cookie_not_found<S: Into<String>>(cookie: S) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationCookieNotFound {
            cookie: cookie.into(),
        })
    }

    pub fn auth_cookie_invalid<S: Into<String>>(
        cookie: S,
        error: jsonwebtoken::errors::Error,
    ) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationCookieInvalid {
            cookie: cookie.into(),
            error,
        })
    }

    pub fn auth_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRequired)
    }

    pub fn auth_invalid_credentials() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationInvalidCredentials)
    }

    pub fn registration_conflict() -> Self {
        Self::RegistrationError(RegistrationError::RegistrationUserConflict)
    }

    pub fn server_crypt_error(e: CryptError) -> Self {
        Self::ServerError(ServerError::ServerCryptError(e))
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            Self::ResourceError(e) => e.status_code(),
            Self::RegistrationError(e) => e.status_code(),
            Self::AuthenticationError(e) => e.status_code(),
            Self::ServerError(e) => e.status_code(),
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceError(e) => e.client_display(),
            Self::RegistrationError(e) => e.client_display(),
            Self::AuthenticationError(e) => e.client_display(),
            Self::ServerError(e) => e.client_display(),
        }
    }
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message for the client
    pub message: String,
    /// HTTP status code (stringified)
    pub status_code: String,
    /// Optional debug details (only in debug mode)
    pub details: Option<String>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        log_error(&self);

        let status_code = self.status_code();
        let display = self.client_display();

        let body = ErrorResponse {
            message: display,
            status_code: status_code.as_str().to_string(),
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        };

        (status_code, Json(body)).into_response()
    }
}
