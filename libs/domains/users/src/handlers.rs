use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_helpers::{ErrorResponse, RequestContext, ValidatedJson, messages};
use std::sync::Arc;

use crate::auth::AuthService;
use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, LoginRequest, Profile, UpdateUser, UserResponse};
use crate::repository::UserRepository;
use crate::service::UserService;

/// Shared state for the users routes.
#[derive(Clone)]
pub struct UsersState<R: UserRepository> {
    pub users: UserService<R>,
    pub auth: AuthService<R>,
}

/// Create the users router with all HTTP endpoints
pub fn router<R: UserRepository + Clone + 'static>(state: UsersState<R>) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/api/users", post(register))
        .route("/api/users/login", post(login))
        .route("/api/user", get(current_user).put(update_user))
        .route("/api/profiles/{username}", get(profile))
        .with_state(shared_state)
}

/// Register a new user
///
/// POST /api/users
async fn register<R: UserRepository>(
    State(state): State<Arc<UsersState<R>>>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let user = state.users.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Login with email/password
///
/// POST /api/users/login
///
/// Unknown email and wrong password produce the same response here so the
/// endpoint cannot be used to enumerate accounts; the audit log keeps the
/// real cause.
async fn login<R: UserRepository>(
    State(state): State<Arc<UsersState<R>>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> Response {
    match state.users.login(input).await {
        Ok(user) => Json(UserResponse::from(user)).into_response(),
        Err(err @ (UserError::NotFound(_) | UserError::PasswordNotMatched(_))) => {
            tracing::warn!(error = %err, "Login rejected");
            (
                StatusCode::UNAUTHORIZED,
                Json(
                    ErrorResponse::new("Unauthorized", "Invalid email or password")
                        .with_code(messages::CODE_UNAUTHORIZED),
                ),
            )
                .into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// Get the authenticated caller
///
/// GET /api/user
async fn current_user<R: UserRepository>(
    State(state): State<Arc<UsersState<R>>>,
    ctx: RequestContext,
) -> UserResult<Response> {
    match state.auth.current_user(&ctx).await? {
        Some(user) => Ok(Json(UserResponse::from(user)).into_response()),
        None => Ok((
            StatusCode::UNAUTHORIZED,
            Json(
                ErrorResponse::new("Unauthorized", messages::UNAUTHORIZED)
                    .with_code(messages::CODE_UNAUTHORIZED),
            ),
        )
            .into_response()),
    }
}

/// Update the authenticated caller
///
/// PUT /api/user
async fn update_user<R: UserRepository>(
    State(state): State<Arc<UsersState<R>>>,
    ctx: RequestContext,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<Json<UserResponse>> {
    let user = state.users.update_user(&ctx, input).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Public profile by username
///
/// GET /api/profiles/{username}
async fn profile<R: UserRepository>(
    State(state): State<Arc<UsersState<R>>>,
    Path(username): Path<String>,
) -> UserResult<Json<Profile>> {
    let user = state.users.user_by_username(&username).await?;
    Ok(Json(Profile::from(user)))
}
