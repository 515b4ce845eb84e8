use std::sync::Arc;

use axum_helpers::RequestContext;

use crate::error::{UserError, UserResult};
use crate::models::User;
use crate::repository::UserRepository;

/// Read-through adapter from the request principal to a domain [`User`].
///
/// Does not issue credentials or verify passwords (that is
/// [`crate::UserService::login`]); it only answers "who is calling, if
/// anyone". Absence of a principal is a legitimate state, so the operations
/// return `Option` rather than failing.
#[derive(Clone)]
pub struct AuthService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// The current caller, or `None` for anonymous requests.
    ///
    /// A principal whose user record is missing is a hard `NotFound`:
    /// disagreement between the session layer and the user table must not be
    /// silently masked.
    pub async fn current_user(&self, ctx: &RequestContext) -> UserResult<Option<User>> {
        let Some(email) = ctx.principal_email() else {
            return Ok(None);
        };

        let user = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| UserError::not_found_by_email(email))?;

        Ok(Some(user))
    }

    /// Convenience wrapper returning just the caller's id.
    pub async fn current_user_id(&self, ctx: &RequestContext) -> UserResult<Option<i64>> {
        Ok(self.current_user(ctx).await?.map(|user| user.id))
    }
}
