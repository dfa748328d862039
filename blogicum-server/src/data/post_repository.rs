use crate::domain::catalog::PublishedFields;
use crate::domain::post::{CategoryRef, LocationRef, PostForm};
use crate::domain::{DomainError, Post, PostCard, PostQuery};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, author_id: i64, form: &PostForm) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<PostCard, DomainError>;
    async fn update(&self, id: i64, form: &PostForm) -> Result<Post, DomainError>;
    async fn delete(&self, id: i64) -> Result<(), DomainError>;
    /// Newest publication date first; returns the page and the total match count.
    async fn list(
        &self,
        query: &PostQuery,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PostCard>, i64), DomainError>;
}

const POST_COLUMNS: &str =
    "id, title, text, pub_date, image, is_published, created_at, author_id, category_id, location_id";

const CARD_SELECT: &str = r#"
    SELECT p.id, p.title, p.text, p.pub_date, p.image, p.is_published, p.created_at,
           p.author_id, u.username AS author_username,
           p.category_id, c.title AS category_title, c.slug AS category_slug,
           c.is_published AS category_is_published,
           p.location_id, l.name AS location_name, l.is_published AS location_is_published,
           (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
"#;

pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn post_from_row(row: &PgRow) -> Result<Post, DomainError> {
    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        pub_date: row.try_get("pub_date")?,
        image: row.try_get("image")?,
        author_id: row.try_get("author_id")?,
        category_id: row.try_get("category_id")?,
        location_id: row.try_get("location_id")?,
        published: PublishedFields {
            is_published: row.try_get("is_published")?,
            created_at: row.try_get("created_at")?,
        },
    })
}

fn card_from_row(row: &PgRow) -> Result<PostCard, DomainError> {
    let post = post_from_row(row)?;

    let category = match post.category_id {
        Some(id) => Some(CategoryRef {
            id,
            title: row.try_get("category_title")?,
            slug: row.try_get("category_slug")?,
            is_published: row.try_get("category_is_published")?,
        }),
        None => None,
    };

    let location = match post.location_id {
        Some(id) => Some(LocationRef {
            id,
            name: row.try_get("location_name")?,
            is_published: row.try_get("location_is_published")?,
        }),
        None => None,
    };

    Ok(PostCard {
        author_username: row.try_get("author_username")?,
        comment_count: row.try_get("comment_count")?,
        post,
        category,
        location,
    })
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &PostQuery) {
    builder.push(" WHERE TRUE");

    if let Some(visibility) = query.visibility {
        builder
            .push(" AND p.is_published AND (p.category_id IS NULL OR c.is_published)")
            .push(" AND p.pub_date <= ")
            .push_bind(visibility.moment());
    }
    if let Some(category_id) = query.category_id {
        builder.push(" AND p.category_id = ").push_bind(category_id);
    }
    if let Some(author_id) = query.author_id {
        builder.push(" AND p.author_id = ").push_bind(author_id);
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, author_id: i64, form: &PostForm) -> Result<Post, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO posts (title, text, pub_date, image, is_published, created_at,
                               author_id, category_id, location_id)
            VALUES ($1, $2, $3, $4, $5, NOW(), $6, $7, $8)
            RETURNING {}
            "#,
            POST_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(&form.title)
            .bind(&form.text)
            .bind(form.pub_date)
            .bind(&form.image)
            .bind(form.is_published)
            .bind(author_id)
            .bind(form.category_id)
            .bind(form.location_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create post: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        post_from_row(&row)
    }

    async fn find_by_id(&self, id: i64) -> Result<PostCard, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new(CARD_SELECT);
        builder.push(" WHERE p.id = ").push_bind(id);

        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => card_from_row(&row),
            None => Err(DomainError::PostNotFound),
        }
    }

    async fn update(&self, id: i64, form: &PostForm) -> Result<Post, DomainError> {
        let sql = format!(
            r#"
            UPDATE posts
            SET
                title = $1,
                text = $2,
                pub_date = $3,
                image = $4,
                is_published = $5,
                category_id = $6,
                location_id = $7
            WHERE id = $8
            RETURNING {}
            "#,
            POST_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(&form.title)
            .bind(&form.text)
            .bind(form.pub_date)
            .bind(&form.image)
            .bind(form.is_published)
            .bind(form.category_id)
            .bind(form.location_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => post_from_row(&row),
            None => Err(DomainError::PostNotFound),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            Err(DomainError::PostNotFound)
        } else {
            Ok(())
        }
    }

    async fn list(
        &self,
        query: &PostQuery,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PostCard>, i64), DomainError> {
        // Get total count
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) AS count FROM posts p LEFT JOIN categories c ON c.id = p.category_id",
        );
        push_filters(&mut count, query);

        let total: i64 = count
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?
            .try_get("count")?;

        // Get paginated posts
        let mut builder = QueryBuilder::<Postgres>::new(CARD_SELECT);
        push_filters(&mut builder, query);
        builder
            .push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        let cards = rows
            .iter()
            .map(card_from_row)
            .collect::<Result<Vec<PostCard>, DomainError>>()?;

        Ok((cards, total))
    }
}
