use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("username already exists")]
    DuplicateUsername,
    #[error("user not found")]
    NotFound,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    /// Find a user by exact username.
    pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, username, password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by id.
    pub async fn find_by_id(db: &PgPool, id: i64) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, username, password_hash
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Every user record, ordered by id.
    pub async fn list_all(db: &PgPool) -> Result<Vec<User>, RepoError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, username, password_hash
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    /// Insert a new user. The unique index on username makes the insert
    /// itself fail on a duplicate, which maps to `DuplicateUsername`.
    pub async fn create(
        db: &PgPool,
        name: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<User, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, username, password_hash
            "#,
        )
        .bind(name)
        .bind(username)
        .bind(password_hash)
        .fetch_one(db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                RepoError::DuplicateUsername
            }
            other => RepoError::Sqlx(other),
        })?;
        Ok(user)
    }

    /// Partial update: absent fields keep their stored value.
    pub async fn update(
        db: &PgPool,
        id: i64,
        name: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<User, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                password_hash = COALESCE($3, password_hash)
            WHERE id = $1
            RETURNING id, name, username, password_hash
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(password_hash)
        .fetch_optional(db)
        .await?;
        user.ok_or(RepoError::NotFound)
    }

    /// Permanently remove a user record.
    pub async fn delete(db: &PgPool, id: i64) -> Result<(), RepoError> {
        let deleted = sqlx::query_scalar::<_, i64>(
            r#"
            DELETE FROM users
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        deleted.map(|_| ()).ok_or(RepoError::NotFound)
    }
}
