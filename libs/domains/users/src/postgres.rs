use async_trait::async_trait;
use sea_orm::{DbBackend, FromQueryResult, Statement};

use crate::error::{UserError, UserResult};
use crate::models::User;
use crate::repository::UserRepository;

/// PostgreSQL implementation of UserRepository using SeaORM.
///
/// Uniqueness of email and username is backed by the `uq_users_email` /
/// `uq_users_username` indexes (see the migration crate); a violation at
/// write time is mapped back to [`UserError::AlreadyExists`] with the
/// surviving row's id.
#[derive(Clone)]
pub struct PgUserRepository {
    db: sea_orm::DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: sea_orm::DatabaseConnection) -> Self {
        Self { db }
    }

    async fn one(&self, stmt: Statement) -> UserResult<Option<User>> {
        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| UserError::Database(e.to_string()))?;

        Ok(row.map(|r| r.into()))
    }

    /// Resolve a unique-index violation to the id of the row that won.
    async fn conflict_for(&self, user: &User, err: String) -> UserError {
        let probe = if err.contains("uq_users_email") {
            self.find_by_email(&user.email).await
        } else if err.contains("uq_users_username") {
            self.find_by_username(&user.username).await
        } else {
            self.find_by_email_or_username(&user.email, &user.username)
                .await
        };

        match probe {
            Ok(Some(winner)) => UserError::AlreadyExists(winner.id),
            _ => UserError::Database(err),
        }
    }
}

fn is_unique_violation(err: &str) -> bool {
    err.contains("duplicate key") || err.contains("unique constraint")
}

/// Helper struct for deserializing user rows from the database
#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: i64,
    email: String,
    username: String,
    password_hash: String,
    image: Option<String>,
    bio: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            username: row.username,
            password_hash: row.password_hash,
            image: row.image,
            bio: row.bio,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT * FROM users WHERE id = $1",
            [id.into()],
        );
        self.one(stmt).await
    }

    async fn find_by_id_in(&self, ids: &[i64]) -> UserResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("${}", i)).collect();
        let sql = format!(
            "SELECT * FROM users WHERE id IN ({})",
            placeholders.join(", ")
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            ids.iter().map(|id| (*id).into()),
        );

        let rows = UserRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(|e| UserError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT * FROM users WHERE email = $1",
            [email.into()],
        );
        self.one(stmt).await
    }

    async fn find_by_username(&self, username: &str) -> UserResult<Option<User>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT * FROM users WHERE username = $1",
            [username.into()],
        );
        self.one(stmt).await
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> UserResult<Option<User>> {
        // The email hit sorts first so a double collision reports
        // deterministically.
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
                SELECT * FROM users
                WHERE email = $1 OR username = $2
                ORDER BY (email = $1) DESC, id ASC
                LIMIT 1
            "#,
            [email.into(), username.into()],
        );
        self.one(stmt).await
    }

    async fn save(&self, user: User) -> UserResult<User> {
        let stmt = if !user.is_persisted() {
            Statement::from_sql_and_values(
                DbBackend::Postgres,
                r#"
                    INSERT INTO users (email, username, password_hash, image, bio, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    RETURNING *
                "#,
                [
                    user.email.clone().into(),
                    user.username.clone().into(),
                    user.password_hash.clone().into(),
                    user.image.clone().into(),
                    user.bio.clone().into(),
                    user.created_at.into(),
                    user.updated_at.into(),
                ],
            )
        } else {
            Statement::from_sql_and_values(
                DbBackend::Postgres,
                r#"
                    UPDATE users
                    SET email = $2, username = $3, password_hash = $4,
                        image = $5, bio = $6, updated_at = $7
                    WHERE id = $1
                    RETURNING *
                "#,
                [
                    user.id.into(),
                    user.email.clone().into(),
                    user.username.clone().into(),
                    user.password_hash.clone().into(),
                    user.image.clone().into(),
                    user.bio.clone().into(),
                    user.updated_at.into(),
                ],
            )
        };

        let row = match UserRow::find_by_statement(stmt).one(&self.db).await {
            Ok(row) => row,
            Err(e) => {
                let err = e.to_string();
                if is_unique_violation(&err) {
                    return Err(self.conflict_for(&user, err).await);
                }
                return Err(UserError::Database(err));
            }
        };

        row.map(|r| r.into())
            .ok_or_else(|| UserError::not_found_by_id(user.id))
    }
}
