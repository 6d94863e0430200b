use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant is recoverable: a failed operation leaves the session (stopwords and
/// current artifact) exactly as it was before the call.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Input text is empty")]
    EmptyInput,

    #[error("No terms left after stopword and frequency filtering")]
    EmptyAfterFilter,

    #[error("'{0}' is already a custom stopword")]
    AlreadyPresent(String),

    #[error("'{0}' is not a custom stopword")]
    NotPresent(String),

    #[error("No word cloud has been generated yet")]
    NoArtifactYet,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code, shared by the HTTP body and log lines.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::EmptyInput => "EMPTY_INPUT",
            AppError::EmptyAfterFilter => "EMPTY_AFTER_FILTER",
            AppError::AlreadyPresent(_) => "ALREADY_PRESENT",
            AppError::NotPresent(_) => "NOT_PRESENT",
            AppError::NoArtifactYet => "NO_ARTIFACT_YET",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Render(_) => "RENDER_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::EmptyInput => StatusCode::BAD_REQUEST,
            AppError::EmptyAfterFilter => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::AlreadyPresent(_) => StatusCode::CONFLICT,
            AppError::NotPresent(_) => StatusCode::NOT_FOUND,
            AppError::NoArtifactYet => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Render(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match &self {
            AppError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                "The word cloud could not be rendered".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
