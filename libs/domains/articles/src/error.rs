use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::{ErrorResponse, messages};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArticleError {
    #[error("article not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(String),
}

pub type ArticleResult<T> = Result<T, ArticleError>;

impl IntoResponse for ArticleError {
    fn into_response(self) -> Response {
        let (status, response) = match &self {
            ArticleError::NotFound(slug) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("NotFound", format!("Article '{}' not found", slug))
                    .with_code(messages::CODE_NOT_FOUND),
            ),
            ArticleError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("InternalServerError", "An internal error occurred")
                        .with_code(messages::CODE_INTERNAL),
                )
            }
        };

        (status, Json(response)).into_response()
    }
}
