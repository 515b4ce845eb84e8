use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Marker value for a `User` that has not been persisted yet. The repository
/// replaces it with the real id on first `save`.
pub const UNSAVED_ID: i64 = 0;

/// User aggregate - matches the SQL schema
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Repository-assigned identifier, immutable after creation
    pub id: i64,
    /// Login identifier, unique, stored case-sensitively
    pub email: String,
    /// Public handle, unique
    pub username: String,
    /// Argon2 hash (never exposed in API responses)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Avatar URL
    pub image: Option<String>,
    /// Free-form self description
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, not-yet-persisted user. The password must already be
    /// hashed by the service layer.
    pub fn new(email: String, username: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: UNSAVED_ID,
            email,
            username,
            password_hash,
            image: None,
            bio: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id != UNSAVED_ID
    }

    /// Apply a partial update in place. Unspecified fields are left alone;
    /// the password, if it changes, must already be hashed.
    pub fn apply_update(&mut self, update: UpdateUser, new_password_hash: Option<String>) {
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(username) = update.username {
            self.username = username;
        }
        if let Some(hash) = new_password_hash {
            self.password_hash = hash;
        }
        if let Some(image) = update.image {
            self.image = Some(image);
        }
        if let Some(bio) = update.bio {
            self.bio = Some(bio);
        }
        self.updated_at = Utc::now();
    }
}

/// User response DTO (without password_hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub image: Option<String>,
    pub bio: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            image: user.image,
            bio: user.bio,
        }
    }
}

/// Public profile view, looked up by username
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Profile {
    pub username: String,
    pub image: Option<String>,
    pub bio: Option<String>,
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            image: user.image,
            bio: user.bio,
        }
    }
}

/// DTO for registering a new user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// DTO for user login
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email, length(max = 255))]
    pub email: String,
    pub password: String,
}

/// DTO for a partial self-service update. Any subset of fields may be
/// supplied; an empty password means "no change".
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub username: Option<String>,
    pub password: Option<String>,
    pub image: Option<String>,
    pub bio: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_is_not_persisted() {
        let user = User::new("a@x".into(), "alice".into(), "hash".into());
        assert!(!user.is_persisted());
        assert_eq!(user.id, UNSAVED_ID);
        assert!(user.image.is_none());
        assert!(user.bio.is_none());
    }

    #[test]
    fn test_apply_update_partial() {
        let mut user = User::new("a@x".into(), "alice".into(), "hash".into());
        user.apply_update(
            UpdateUser {
                bio: Some("hi".into()),
                ..Default::default()
            },
            None,
        );

        assert_eq!(user.bio.as_deref(), Some("hi"));
        assert_eq!(user.email, "a@x");
        assert_eq!(user.username, "alice");
        assert_eq!(user.password_hash, "hash");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("a@x".into(), "alice".into(), "secret-hash".into());
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }
}
