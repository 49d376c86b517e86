use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use uuid::Uuid;

use crate::models::lead::LeadStatus;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{message}")]
    Unauthorized {
        code: &'static str,
        message: String,
    },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate resource: {0}")]
    Duplicate(String),

    #[error("Lead already exists with this phone number or email")]
    DuplicateLead { lead_id: Uuid, status: LeadStatus },

    #[error("Lead has already been converted to a user")]
    AlreadyConverted,

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Error::Unauthorized {
            code,
            message: message.into(),
        }
    }
}

fn internal_detail(detail: String) -> String {
    // Suppress internals outside development mode. Config may be uninitialized
    // in unit tests, in which case we also suppress.
    let development = crate::config::CONFIG
        .get()
        .map(|c| c.is_development())
        .unwrap_or(false);
    if development {
        detail
    } else {
        "Internal Server Error".to_string()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            Error::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": msg }),
            ),
            Error::Validation(err) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "message": "Invalid input data",
                    "error": err.to_string(),
                }),
            ),
            Error::Unauthorized { code, message } => (
                StatusCode::UNAUTHORIZED,
                json!({ "success": false, "message": message, "code": code }),
            ),
            Error::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                json!({ "success": false, "message": msg }),
            ),
            Error::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                json!({ "success": false, "message": msg }),
            ),
            Error::Duplicate(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": msg }),
            ),
            Error::DuplicateLead { lead_id, status } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "message": "Lead already exists with this phone number or email",
                    "data": { "leadId": lead_id, "status": status },
                }),
            ),
            Error::AlreadyConverted => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "message": "Lead has already been converted to a user",
                }),
            ),
            Error::Json(err) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": err.to_string() }),
            ),
            Error::Database(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "success": false,
                    "message": "Server error",
                    "error": internal_detail(err.to_string()),
                }),
            ),
            Error::Reqwest(err) => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "success": false,
                    "message": "External service error",
                    "error": internal_detail(err.to_string()),
                }),
            ),
            Error::Config(msg) | Error::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "success": false,
                    "message": "Server error",
                    "error": internal_detail(msg),
                }),
            ),
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "success": false,
                    "message": "Server error",
                    "error": internal_detail(err.to_string()),
                }),
            ),
            Error::Anyhow(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "success": false,
                    "message": "Server error",
                    "error": internal_detail(err.to_string()),
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}

/// True when a database error is a unique-constraint violation (code 23505).
/// The advisory duplicate pre-check can lose the race; callers convert this
/// into the same "already exists" response.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}
