//! HTTP error responses.
//!
//! Callers only ever see two kinds of failure: a missing note (404) or a
//! generic per-handler message (500). The underlying cause is logged.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::error::ScribbleError;

pub const READ_FAILED: &str = "Failed to read notes";
pub const CREATE_FAILED: &str = "Failed to create note";
pub const UPDATE_FAILED: &str = "Failed to update note";
pub const DELETE_FAILED: &str = "Failed to delete note";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Note not found")]
    NotFound,

    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    /// Map a store error, falling back to `message` for anything but a missing note.
    pub fn from_store(err: ScribbleError, message: &'static str) -> Self {
        match err {
            ScribbleError::NoteNotFound(id) => {
                tracing::debug!(%id, "note not found");
                ApiError::NotFound
            }
            other => ApiError::internal(message, &other),
        }
    }

    /// Log `cause` and hide it behind `message`.
    pub fn internal(message: &'static str, cause: &dyn std::fmt::Display) -> Self {
        tracing::error!(error = %cause, "{}", message);
        ApiError::Internal(message)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (self.status_code(), body).into_response()
    }
}
