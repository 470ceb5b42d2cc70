//! Error taxonomy shared by the store, auth, rules and handlers.
//! Handlers keep returning `(StatusCode, String)`; `ApiError` converts into it.

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("email or password is incorrect")]
    InvalidCredentials,

    #[error("sign-in required")]
    Unauthenticated,

    #[error("permission denied: you do not have access to this data")]
    PermissionDenied,

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("advisory service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("storage error: {0}")]
    Store(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidCredentials | ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::PermissionDenied => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ApiError> for (StatusCode, String) {
    fn from(e: ApiError) -> Self {
        match &e {
            ApiError::Store(_) => tracing::error!(error = %e, "request failed"),
            ApiError::PermissionDenied | ApiError::ServiceUnavailable(_) => {
                tracing::warn!(error = %e, "request rejected")
            }
            _ => tracing::debug!(error = %e, "request rejected"),
        }
        (e.status(), e.to_string())
    }
}

/// Storage-collaborator failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("duplicate {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => ApiError::NotFound(what),
            StoreError::Conflict(what) => ApiError::Conflict(what),
            other => ApiError::Store(other.to_string()),
        }
    }
}

impl From<crate::core::entry::EntryError> for ApiError {
    fn from(e: crate::core::entry::EntryError) -> Self {
        ApiError::Validation(e.to_string())
    }
}
