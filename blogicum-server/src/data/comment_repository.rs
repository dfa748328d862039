use crate::domain::{Comment, CommentCard, DomainError};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, post_id: i64, author_id: i64, text: &str)
        -> Result<Comment, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Comment, DomainError>;
    async fn update_text(&self, id: i64, text: &str) -> Result<Comment, DomainError>;
    async fn delete(&self, id: i64) -> Result<(), DomainError>;
    /// Oldest first.
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentCard>, DomainError>;
}

pub struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn comment_from_row(row: &PgRow) -> Result<Comment, DomainError> {
    Ok(Comment {
        id: row.try_get("id")?,
        text: row.try_get("text")?,
        post_id: row.try_get("post_id")?,
        author_id: row.try_get("author_id")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(
        &self,
        post_id: i64,
        author_id: i64,
        text: &str,
    ) -> Result<Comment, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO comments (text, post_id, author_id, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, text, post_id, author_id, created_at
            "#,
        )
        .bind(text)
        .bind(post_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create comment: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        comment_from_row(&row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Comment, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, text, post_id, author_id, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => comment_from_row(&row),
            None => Err(DomainError::CommentNotFound),
        }
    }

    async fn update_text(&self, id: i64, text: &str) -> Result<Comment, DomainError> {
        let row = sqlx::query(
            r#"
            UPDATE comments
            SET text = $1
            WHERE id = $2
            RETURNING id, text, post_id, author_id, created_at
            "#,
        )
        .bind(text)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => comment_from_row(&row),
            None => Err(DomainError::CommentNotFound),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            Err(DomainError::CommentNotFound)
        } else {
            Ok(())
        }
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentCard>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT cm.id, cm.text, cm.post_id, cm.author_id, cm.created_at,
                   u.username AS author_username
            FROM comments cm
            JOIN users u ON u.id = cm.author_id
            WHERE cm.post_id = $1
            ORDER BY cm.created_at ASC, cm.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        rows.iter()
            .map(|row| {
                Ok(CommentCard {
                    comment: comment_from_row(row)?,
                    author_username: row.try_get("author_username")?,
                })
            })
            .collect()
    }
}
