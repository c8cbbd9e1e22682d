use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sqlx::error::ErrorKind;
use thiserror::Error;

use crate::flash::Flash;

/// Categorized failure of a storage operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record conflicts with an existing one")]
    Conflict(#[source] sqlx::Error),

    #[error("record rejected by the database")]
    BadData(#[source] sqlx::Error),

    #[error("database unavailable")]
    Connectivity(#[source] sqlx::Error),

    #[error("unexpected database error")]
    Other(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            return match db.kind() {
                ErrorKind::UniqueViolation => StoreError::Conflict(err),
                ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => StoreError::BadData(err),
                _ => StoreError::Other(err),
            };
        }
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. } => StoreError::BadData(err),
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreError::Connectivity(err),
            _ => StoreError::Other(err),
        }
    }
}

impl StoreError {
    pub fn status(&self) -> StatusCode {
        match self {
            StoreError::NotFound => StatusCode::NOT_FOUND,
            StoreError::Conflict(_) => StatusCode::CONFLICT,
            StoreError::BadData(_) => StatusCode::UNPROCESSABLE_ENTITY,
            StoreError::Connectivity(_) => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the user when a form submission hits this failure.
    pub fn flash(&self) -> Flash {
        match self {
            StoreError::NotFound => Flash::warning("Entry not found"),
            StoreError::Conflict(_) => Flash::warning("Entry conflicts with an existing one"),
            StoreError::BadData(_) => Flash::warning("Invalid Entry"),
            StoreError::Connectivity(_) => Flash::danger("Error connecting to the database"),
            StoreError::Other(_) => Flash::danger("Something went wrong!"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Wrong credentials")]
    InvalidCredentials,

    #[error("Password hashing failed")]
    Hashing,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Hashing => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Store(e) => e.status(),
        }
    }

    pub fn flash(&self) -> Flash {
        match self {
            AuthError::InvalidCredentials => Flash::danger("Invalid Username or password!"),
            AuthError::Hashing => Flash::danger("Something went wrong!"),
            AuthError::Store(StoreError::Conflict(_)) => Flash::warning("User already exists!"),
            AuthError::Store(e) => e.flash(),
        }
    }
}

/// Error returned by handlers that do not re-render a form.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Failed to render page")]
    Template(#[from] askama::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound,
            other => AppError::Store(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::Store(e) => (e.status(), e.flash().message),
            AppError::Auth(e) => (e.status(), e.flash().message),
            AppError::Template(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
            ),
        };
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
