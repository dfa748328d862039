use crate::domain::user::RegisterUserRequest;
use crate::domain::{DomainError, User};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(
        &self,
        req: RegisterUserRequest,
        password_hash: String,
    ) -> Result<User, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<User, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<User, DomainError>;
    /// Removes the user together with their posts and comments.
    async fn delete(&self, id: i64) -> Result<(), DomainError>;
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<User, DomainError> {
        let sql = format!(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE {} = $1",
            column
        );

        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => user_from_row(&row),
            None => Err(DomainError::UserNotFound),
        }
    }
}

fn user_from_row(row: &PgRow) -> Result<User, DomainError> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(
        &self,
        req: RegisterUserRequest,
        password_hash: String,
    ) -> Result<User, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(&req.username)
        .bind(&req.email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create user: {}", e);
            if e.to_string().contains("duplicate key") {
                DomainError::UserAlreadyExists
            } else {
                DomainError::DatabaseError(e.to_string())
            }
        })?;

        user_from_row(&row)
    }

    async fn find_by_username(&self, username: &str) -> Result<User, DomainError> {
        self.find_one("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<User, DomainError> {
        self.find_one("email", email).await
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        // posts.author_id and comments.author_id cascade
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            Err(DomainError::UserNotFound)
        } else {
            Ok(())
        }
    }
}
