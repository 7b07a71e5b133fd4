use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::query_as;

use super::unexpected;
use crate::domain::RepositoryError;
use crate::domain::ids::UserId;
use crate::domain::repositories::UserRepository;
use crate::domain::users::{EMAIL_TAKEN, NewUser, PlainPassword, USERNAME_TAKEN, User};
use crate::infrastructure::database::DatabasePool;
use crate::infrastructure::passwords;

#[derive(Clone)]
pub struct SqlUserRepository {
    pool: DatabasePool,
}

impl SqlUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, column: &str, value: &str) -> Result<User, RepositoryError> {
        let sql = format!(
            "SELECT id, email, username, profile_image, created_at FROM users WHERE {column} = ?"
        );
        let record = query_as::<_, UserRecord>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or(RepositoryError::NotFound)?;

        Ok(record.into())
    }
}

#[derive(sqlx::FromRow)]
struct UserRecord {
    id: i64,
    email: String,
    username: String,
    profile_image: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CredentialsRecord {
    #[sqlx(flatten)]
    user: UserRecord,
    password_hash: String,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: UserId::from(record.id),
            email: record.email,
            username: record.username,
            profile_image: record.profile_image,
            created_at: record.created_at,
        }
    }
}

/// Maps a `UNIQUE constraint failed: users.<column>` error onto the message for that column.
fn conflict_message(err: &sqlx::Error) -> Option<&'static str> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    if !db_err.is_unique_violation() {
        return None;
    }
    if db_err.message().contains("users.username") {
        Some(USERNAME_TAKEN)
    } else {
        Some(EMAIL_TAKEN)
    }
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError> {
        let password_hash = passwords::hash_password(&user.password)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        let record = query_as::<_, UserRecord>(
            r"INSERT INTO users (email, username, password_hash, profile_image, created_at)
              VALUES (?, ?, ?, ?, ?)
              RETURNING id, email, username, profile_image, created_at",
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&password_hash)
        .bind(&user.profile_image)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match conflict_message(&err) {
            Some(message) => RepositoryError::conflict(message),
            None => unexpected(err),
        })?;

        Ok(record.into())
    }

    async fn get(&self, id: UserId) -> Result<User, RepositoryError> {
        let record = query_as::<_, UserRecord>(
            "SELECT id, email, username, profile_image, created_at FROM users WHERE id = ?",
        )
        .bind(i64::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(RepositoryError::NotFound)?;

        Ok(record.into())
    }

    async fn get_by_email(&self, email: &str) -> Result<User, RepositoryError> {
        self.fetch_one_where("email", email).await
    }

    async fn get_by_username(&self, username: &str) -> Result<User, RepositoryError> {
        self.fetch_one_where("username", username).await
    }

    async fn verify_credentials(
        &self,
        email: &str,
        candidate: &PlainPassword,
    ) -> Result<Option<User>, RepositoryError> {
        let record = query_as::<_, CredentialsRecord>(
            "SELECT id, email, username, profile_image, created_at, password_hash
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        let Some(record) = record else {
            passwords::verify_without_hash(candidate)
                .await
                .map_err(|err| RepositoryError::unexpected(err.to_string()))?;
            return Ok(None);
        };

        let matches = passwords::verify_password(candidate, record.password_hash)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(matches.then(|| record.user.into()))
    }
}
