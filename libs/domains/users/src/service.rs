use std::sync::Arc;

use axum_helpers::RequestContext;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, LoginRequest, UpdateUser, User};
use crate::password::PasswordEncoder;
use crate::repository::UserRepository;

/// Service layer for the user-account lifecycle.
///
/// Owns the uniqueness policy (email and username, probed in a single query)
/// and the password policy (hash on write, constant-time verify on login).
/// Operations that act on behalf of the caller take a [`RequestContext`]
/// carrying the authenticated principal; nothing here reads ambient state.
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    encoder: PasswordEncoder,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            encoder: PasswordEncoder,
        }
    }

    /// Register a new user. An empty password is rejected here, not just at
    /// the transport boundary, so every caller gets the same contract.
    ///
    /// The probe and the write are not one atomic step here; the repository's
    /// unique indexes decide the winner of a race and the loser surfaces as
    /// `AlreadyExists` all the same.
    pub async fn create_user(&self, input: CreateUser) -> UserResult<User> {
        if input.password.is_empty() {
            return Err(UserError::Validation("password must not be empty".into()));
        }

        if let Some(existing) = self
            .repository
            .find_by_email_or_username(&input.email, &input.username)
            .await?
        {
            return Err(UserError::AlreadyExists(existing.id));
        }

        let password_hash = self.encoder.encode(&input.password)?;
        let user = User::new(input.email, input.username, password_hash);

        let created = self.repository.save(user).await?;
        tracing::info!(user_id = created.id, username = %created.username, "Registered user");
        Ok(created)
    }

    /// Verify credentials and return the account.
    ///
    /// Unknown email and wrong password stay distinct variants for the audit
    /// trail; the transport layer collapses them into one 401.
    pub async fn login(&self, input: LoginRequest) -> UserResult<User> {
        let user = self.user_by_email(&input.email).await?;

        if !self.encoder.matches(&input.password, &user.password_hash)? {
            return Err(UserError::PasswordNotMatched(user.id));
        }

        Ok(user)
    }

    /// Resolve the caller from the request principal.
    ///
    /// Anonymous requests fail with a bare `NotFound`; a principal whose
    /// record has vanished fails with `NotFound` on the email axis.
    pub async fn current_user(&self, ctx: &RequestContext) -> UserResult<User> {
        let email = ctx.principal_email().ok_or(UserError::NotFound(None))?;
        self.user_by_email(email).await
    }

    pub async fn user_by_id(&self, id: i64) -> UserResult<User> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserError::not_found_by_id(id))
    }

    /// Batch lookup; ids without a record are silently omitted.
    pub async fn users_by_ids(&self, ids: &[i64]) -> UserResult<Vec<User>> {
        self.repository.find_by_id_in(ids).await
    }

    pub async fn user_by_username(&self, username: &str) -> UserResult<User> {
        self.repository
            .find_by_username(username)
            .await?
            .ok_or_else(|| UserError::not_found_by_username(username))
    }

    /// Partial self-service update for the authenticated caller.
    ///
    /// The actor is whoever the context resolves to; there is no separate
    /// actor-id parameter to disagree with. A collision probe that lands on
    /// the actor's own record is fine (self-update is idempotent). An empty
    /// or absent password means "no change"; otherwise it is re-hashed.
    pub async fn update_user(&self, ctx: &RequestContext, input: UpdateUser) -> UserResult<User> {
        let mut user = self.current_user(ctx).await?;

        let probe_email = input.email.as_deref().unwrap_or(&user.email);
        let probe_username = input.username.as_deref().unwrap_or(&user.username);
        if let Some(other) = self
            .repository
            .find_by_email_or_username(probe_email, probe_username)
            .await?
        {
            if other.id != user.id {
                return Err(UserError::AlreadyExists(other.id));
            }
        }

        let new_password_hash = match input.password.as_deref() {
            Some(password) if !password.is_empty() => Some(self.encoder.encode(password)?),
            _ => None,
        };

        user.apply_update(input, new_password_hash);

        let updated = self.repository.save(user).await?;
        tracing::info!(user_id = updated.id, "Updated user");
        Ok(updated)
    }

    async fn user_by_email(&self, email: &str) -> UserResult<User> {
        self.repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| UserError::not_found_by_email(email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Lookup;
    use crate::repository::InMemoryUserRepository;

    fn service() -> (UserService<InMemoryUserRepository>, InMemoryUserRepository) {
        let repo = InMemoryUserRepository::new();
        (UserService::new(repo.clone()), repo)
    }

    fn create(email: &str, username: &str, password: &str) -> CreateUser {
        CreateUser {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let (service, _) = service();

        let user = service.create_user(create("a@x", "alice", "pw")).await.unwrap();

        assert!(user.is_persisted());
        assert_ne!(user.password_hash, "pw");
        assert!(!user.password_hash.is_empty());
        assert!(PasswordEncoder.matches("pw", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_create_user_rejects_empty_password() {
        let (service, repo) = service();

        let result = service.create_user(create("a@x", "alice", "")).await;

        assert!(matches!(result, Err(UserError::Validation(_))));
        // No account was created, so nothing to log in to.
        assert!(repo.find_by_email("a@x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email() {
        let (service, repo) = service();
        let alice = service.create_user(create("a@x", "alice", "pw")).await.unwrap();

        let result = service.create_user(create("a@x", "bob", "pw")).await;

        assert!(matches!(result, Err(UserError::AlreadyExists(id)) if id == alice.id));
        // No new row was written.
        assert!(repo.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_user_duplicate_username() {
        let (service, repo) = service();
        let alice = service.create_user(create("a@x", "alice", "pw")).await.unwrap();

        let result = service.create_user(create("b@x", "alice", "pw")).await;

        assert!(matches!(result, Err(UserError::AlreadyExists(id)) if id == alice.id));
        assert!(repo.find_by_email("b@x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_returns_created_user() {
        let (service, _) = service();
        let carol = service
            .create_user(create("c@x", "carol", "s3cret"))
            .await
            .unwrap();

        let logged_in = service.login(login_request("c@x", "s3cret")).await.unwrap();

        assert_eq!(logged_in.id, carol.id);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (service, _) = service();
        let carol = service
            .create_user(create("c@x", "carol", "s3cret"))
            .await
            .unwrap();

        let result = service.login(login_request("c@x", "nope")).await;

        assert!(matches!(result, Err(UserError::PasswordNotMatched(id)) if id == carol.id));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let (service, _) = service();

        let result = service.login(login_request("ghost@x", "pw")).await;

        assert!(
            matches!(result, Err(UserError::NotFound(Some(Lookup::Email(ref e)))) if e == "ghost@x")
        );
    }

    #[tokio::test]
    async fn test_login_after_password_change() {
        let (service, _) = service();
        service
            .create_user(create("c@x", "carol", "old-pw"))
            .await
            .unwrap();

        let ctx = RequestContext::authenticated("c@x");
        service
            .update_user(
                &ctx,
                UpdateUser {
                    password: Some("new-pw".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(service.login(login_request("c@x", "new-pw")).await.is_ok());
        assert!(matches!(
            service.login(login_request("c@x", "old-pw")).await,
            Err(UserError::PasswordNotMatched(_))
        ));
    }

    #[tokio::test]
    async fn test_current_user_anonymous() {
        let (service, _) = service();

        let result = service.current_user(&RequestContext::anonymous()).await;

        assert!(matches!(result, Err(UserError::NotFound(None))));
    }

    #[tokio::test]
    async fn test_current_user_stale_principal() {
        let (service, _) = service();

        // Principal present but the account never existed (or is gone).
        let result = service
            .current_user(&RequestContext::authenticated("gone@x"))
            .await;

        assert!(matches!(
            result,
            Err(UserError::NotFound(Some(Lookup::Email(_))))
        ));
    }

    #[tokio::test]
    async fn test_current_user_resolves_principal() {
        let (service, _) = service();
        let carol = service.create_user(create("c@x", "carol", "pw")).await.unwrap();

        let current = service
            .current_user(&RequestContext::authenticated("c@x"))
            .await
            .unwrap();

        assert_eq!(current.id, carol.id);
    }

    #[tokio::test]
    async fn test_user_by_username() {
        let (service, _) = service();
        service.create_user(create("a@x", "alice", "pw")).await.unwrap();

        assert_eq!(service.user_by_username("alice").await.unwrap().email, "a@x");
        assert!(matches!(
            service.user_by_username("nobody").await,
            Err(UserError::NotFound(Some(Lookup::Username(_))))
        ));
    }

    #[tokio::test]
    async fn test_users_by_ids_omits_missing() {
        let (service, _) = service();
        let alice = service.create_user(create("a@x", "alice", "pw")).await.unwrap();
        let bob = service.create_user(create("b@x", "bob", "pw")).await.unwrap();

        let users = service.users_by_ids(&[alice.id, 999, bob.id]).await.unwrap();

        assert_eq!(users.len(), 2);
    }

    #[tokio::test]
    async fn test_self_update_allowed() {
        let (service, _) = service();
        let carol = service.create_user(create("c@x", "carol", "pw")).await.unwrap();

        let ctx = RequestContext::authenticated("c@x");
        let updated = service
            .update_user(
                &ctx,
                UpdateUser {
                    email: Some("c@x".to_string()),
                    bio: Some("hi".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, carol.id);
        assert_eq!(updated.email, "c@x");
        assert_eq!(updated.bio.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_update_noop_with_own_identifiers() {
        let (service, _) = service();
        let carol = service.create_user(create("c@x", "carol", "pw")).await.unwrap();

        let ctx = RequestContext::authenticated("c@x");
        let updated = service
            .update_user(
                &ctx,
                UpdateUser {
                    email: Some(carol.email.clone()),
                    username: Some(carol.username.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, carol.id);
        assert_eq!(updated.email, carol.email);
        assert_eq!(updated.username, carol.username);
        assert_eq!(updated.password_hash, carol.password_hash);
    }

    #[tokio::test]
    async fn test_update_email_colliding_with_other_user() {
        let (service, _) = service();
        let alice = service.create_user(create("a@x", "alice", "pw")).await.unwrap();
        service.create_user(create("c@x", "carol", "pw")).await.unwrap();

        let ctx = RequestContext::authenticated("c@x");
        let result = service
            .update_user(
                &ctx,
                UpdateUser {
                    email: Some("a@x".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(UserError::AlreadyExists(id)) if id == alice.id));
    }

    #[tokio::test]
    async fn test_update_username_colliding_with_other_user() {
        let (service, _) = service();
        let alice = service.create_user(create("a@x", "alice", "pw")).await.unwrap();
        service.create_user(create("c@x", "carol", "pw")).await.unwrap();

        let ctx = RequestContext::authenticated("c@x");
        let result = service
            .update_user(
                &ctx,
                UpdateUser {
                    username: Some("alice".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(UserError::AlreadyExists(id)) if id == alice.id));
    }

    #[tokio::test]
    async fn test_update_partial_preserves_unspecified_fields() {
        let (service, _) = service();
        let carol = service.create_user(create("c@x", "carol", "pw")).await.unwrap();

        let ctx = RequestContext::authenticated("c@x");
        let updated = service
            .update_user(
                &ctx,
                UpdateUser {
                    image: Some("http://img".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.image.as_deref(), Some("http://img"));
        assert_eq!(updated.email, carol.email);
        assert_eq!(updated.username, carol.username);
        assert_eq!(updated.bio, carol.bio);
        assert_eq!(updated.password_hash, carol.password_hash);

        let reloaded = service.user_by_id(carol.id).await.unwrap();
        assert_eq!(reloaded.image.as_deref(), Some("http://img"));
    }

    #[tokio::test]
    async fn test_update_empty_password_keeps_hash() {
        let (service, _) = service();
        let carol = service.create_user(create("c@x", "carol", "pw")).await.unwrap();

        let ctx = RequestContext::authenticated("c@x");
        for _ in 0..2 {
            let updated = service
                .update_user(
                    &ctx,
                    UpdateUser {
                        password: Some(String::new()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
            assert_eq!(updated.password_hash, carol.password_hash);
        }

        assert!(service.login(login_request("c@x", "pw")).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_anonymous_caller() {
        let (service, _) = service();

        let result = service
            .update_user(&RequestContext::anonymous(), UpdateUser::default())
            .await;

        assert!(matches!(result, Err(UserError::NotFound(None))));
    }

    #[tokio::test]
    async fn test_unique_invariant_over_create_sequence() {
        let (service, _) = service();

        let inputs = [
            ("a@x", "alice"),
            ("b@x", "bob"),
            ("a@x", "dup-email"),
            ("dup@x", "alice"),
            ("c@x", "carol"),
        ];
        for (email, username) in inputs {
            let _ = service.create_user(create(email, username, "pw")).await;
        }

        let users = service.users_by_ids(&[1, 2, 3, 4, 5]).await.unwrap();
        assert_eq!(users.len(), 3);

        let mut emails: Vec<_> = users.iter().map(|u| u.email.clone()).collect();
        let mut usernames: Vec<_> = users.iter().map(|u| u.username.clone()).collect();
        emails.sort();
        emails.dedup();
        usernames.sort();
        usernames.dedup();
        assert_eq!(emails.len(), 3);
        assert_eq!(usernames.len(), 3);
    }
}
