use thiserror::Error;

use crate::model::EntityKind;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Error taxonomy for the store layer.
///
/// "Not found" is never an error here: lookups return `Option` and
/// deletes return `bool`, so callers choose their own 404 semantics.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlx migrate error: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("sqlx error: {0}")]
    SqlxError(#[from] sqlx::Error),
    #[error("json error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("uniqueness conflict on {kind:?}: {detail}")]
    Conflict { kind: EntityKind, detail: String },
    #[error("validation failed on {kind:?}: {detail}")]
    Validation { kind: EntityKind, detail: String },
    #[error("access to this resource is forbidden")]
    Forbidden,
}

impl StoreError {
    pub fn conflict<S: Into<String>>(kind: EntityKind, detail: S) -> Self {
        Self::Conflict {
            kind,
            detail: detail.into(),
        }
    }

    pub fn validation<S: Into<String>>(kind: EntityKind, detail: S) -> Self {
        Self::Validation {
            kind,
            detail: detail.into(),
        }
    }

    /// Whether a sqlx error is a unique-constraint violation.
    pub fn is_unique_violation(err: &sqlx::Error) -> bool {
        matches!(
            err,
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
        )
    }
}
