use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::{ErrorResponse, messages};
use thiserror::Error;

/// The lookup axis that failed to resolve, kept for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Id(i64),
    Email(String),
    Username(String),
}

impl std::fmt::Display for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lookup::Id(id) => write!(f, "id {}", id),
            Lookup::Email(email) => write!(f, "email {}", email),
            Lookup::Username(name) => write!(f, "username {}", name),
        }
    }
}

/// Domain errors of the users slice.
///
/// The first four variants are caller errors; the transport layer maps them
/// to 4xx responses. A `NotFound` without a lookup axis means the request
/// carried no principal and maps to 401, not 404. `PasswordHash` and
/// `Database` are infrastructure failures and surface as an opaque 500.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found{}", .0.as_ref().map(|l| format!(" by {l}")).unwrap_or_default())]
    NotFound(Option<Lookup>),

    #[error("user already exists with id {0}")]
    AlreadyExists(i64),

    #[error("password not matched for user {0}")]
    PasswordNotMatched(i64),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("password hashing error: {0}")]
    PasswordHash(String),

    #[error("database error: {0}")]
    Database(String),
}

impl UserError {
    pub fn not_found_by_id(id: i64) -> Self {
        UserError::NotFound(Some(Lookup::Id(id)))
    }

    pub fn not_found_by_email(email: impl Into<String>) -> Self {
        UserError::NotFound(Some(Lookup::Email(email.into())))
    }

    pub fn not_found_by_username(username: impl Into<String>) -> Self {
        UserError::NotFound(Some(Lookup::Username(username.into())))
    }
}

pub type UserResult<T> = Result<T, UserError>;

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let (status, response) = match &self {
            // No lookup axis means no principal: the caller is
            // unauthenticated, not asking about a missing record.
            UserError::NotFound(None) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("Unauthorized", messages::UNAUTHORIZED)
                    .with_code(messages::CODE_UNAUTHORIZED),
            ),
            UserError::NotFound(Some(lookup)) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("NotFound", format!("User not found by {}", lookup))
                    .with_code(messages::CODE_NOT_FOUND),
            ),
            UserError::AlreadyExists(id) => (
                StatusCode::CONFLICT,
                ErrorResponse::new(
                    "Conflict",
                    format!("A user with that email or username already exists (id {})", id),
                )
                .with_code(messages::CODE_CONFLICT),
            ),
            // No detail here: which credential was wrong stays server-side.
            UserError::PasswordNotMatched(_) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("Unauthorized", "Invalid email or password")
                    .with_code(messages::CODE_UNAUTHORIZED),
            ),
            UserError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("ValidationError", msg.clone())
                    .with_code(messages::CODE_VALIDATION),
            ),
            UserError::PasswordHash(msg) => {
                tracing::error!("Password hash error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("InternalServerError", "An internal error occurred")
                        .with_code(messages::CODE_INTERNAL),
                )
            }
            UserError::Database(msg) => {
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
