use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::User;

/// Repository trait for User persistence.
///
/// Lookups compare email and username exactly as stored (case-sensitive).
/// `save` inserts when the user has no id yet and updates otherwise; both
/// paths enforce the unique email/username invariant, so a racing writer
/// loses with [`UserError::AlreadyExists`] even when its pre-write probe
/// passed.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> UserResult<Option<User>>;

    /// Batch lookup with subset semantics: missing ids are silently omitted,
    /// repeated ids yield one row, order is unspecified.
    async fn find_by_id_in(&self, ids: &[i64]) -> UserResult<Vec<User>>;

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> UserResult<Option<User>>;

    /// Collision probe: any one user matching either attribute. An email
    /// match wins over a username match, which keeps the reported conflict
    /// deterministic when both collide.
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> UserResult<Option<User>>;

    /// Insert on a fresh aggregate, update on a persisted one. Returns the
    /// stored user including its assigned id.
    async fn save(&self, user: User) -> UserResult<User>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<i64, User>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_id_in(&self, ids: &[i64]) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        // Same shape as a SQL IN clause: a repeated id still matches one row.
        let unique: HashSet<i64> = ids.iter().copied().collect();
        Ok(unique.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        let by_email = users.values().find(|u| u.email == email);
        let hit = by_email.or_else(|| users.values().find(|u| u.username == username));
        Ok(hit.cloned())
    }

    async fn save(&self, mut user: User) -> UserResult<User> {
        // The write lock makes probe-and-insert atomic, so save is the
        // single-winner point for concurrent registrations.
        let mut users = self.users.write().await;

        // Email checked before username: when both collide, the email
        // conflict is the one reported.
        if let Some(other) = users.values().find(|u| u.id != user.id && u.email == user.email) {
            return Err(UserError::AlreadyExists(other.id));
        }
        if let Some(other) = users
            .values()
            .find(|u| u.id != user.id && u.username == user.username)
        {
            return Err(UserError::AlreadyExists(other.id));
        }

        if !user.is_persisted() {
            user.id = self.next_id.fetch_add(1, Ordering::Relaxed);
            tracing::info!(user_id = user.id, email = %user.email, "Created user");
        } else if !users.contains_key(&user.id) {
            return Err(UserError::not_found_by_id(user.id));
        } else {
            tracing::info!(user_id = user.id, "Updated user");
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }
}
