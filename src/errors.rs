use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] anyhow::Error),

    #[error("verification session expired or not found")]
    ExpiredSession,

    #[error("verification code does not match")]
    CodeMismatch,

    #[error("too many verification attempts")]
    TooManyAttempts,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("service not found: {0}")]
    ServiceNotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("messaging error: {0}")]
    Messaging(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ExpiredSession => StatusCode::BAD_REQUEST,
            AppError::CodeMismatch => StatusCode::BAD_REQUEST,
            AppError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ServiceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InvalidTransition(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Messaging(_) => StatusCode::BAD_GATEWAY,
        };

        // Storage details stay in the logs; clients see a generic transient failure.
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
                "transient storage failure".to_string()
            }
            _ => self.to_string(),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
