use crate::domain::catalog::{NewCategory, NewLocation, PublishedFields};
use crate::domain::{Category, DomainError, Location};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, new: &NewCategory) -> Result<Category, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Category, DomainError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Category, DomainError>;
    async fn set_published(&self, id: i64, is_published: bool) -> Result<Category, DomainError>;
    /// Posts in the category stay, with their category cleared.
    async fn delete(&self, id: i64) -> Result<(), DomainError>;
    async fn list(&self) -> Result<Vec<Category>, DomainError>;
}

#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn create(&self, new: &NewLocation) -> Result<Location, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Location, DomainError>;
    /// Posts at the location stay, with their location cleared.
    async fn delete(&self, id: i64) -> Result<(), DomainError>;
    async fn list(&self) -> Result<Vec<Location>, DomainError>;
}

const CATEGORY_COLUMNS: &str = "id, title, description, slug, is_published, created_at";
const LOCATION_COLUMNS: &str = "id, name, is_published, created_at";

fn published_from_row(row: &PgRow) -> Result<PublishedFields, DomainError> {
    Ok(PublishedFields {
        is_published: row.try_get("is_published")?,
        created_at: row.try_get("created_at")?,
    })
}

fn category_from_row(row: &PgRow) -> Result<Category, DomainError> {
    Ok(Category {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        slug: row.try_get("slug")?,
        published: published_from_row(row)?,
    })
}

fn location_from_row(row: &PgRow) -> Result<Location, DomainError> {
    Ok(Location {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        published: published_from_row(row)?,
    })
}

pub struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn create(&self, new: &NewCategory) -> Result<Category, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO categories (title, description, slug, is_published, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(&new.title)
            .bind(&new.description)
            .bind(&new.slug)
            .bind(new.is_published)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create category: {}", e);
                if e.to_string().contains("duplicate key") {
                    DomainError::SlugTaken(new.slug.clone())
                } else {
                    DomainError::DatabaseError(e.to_string())
                }
            })?;

        category_from_row(&row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Category, DomainError> {
        let sql = format!("SELECT {} FROM categories WHERE id = $1", CATEGORY_COLUMNS);

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => category_from_row(&row),
            None => Err(DomainError::CategoryNotFound),
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Category, DomainError> {
        let sql = format!("SELECT {} FROM categories WHERE slug = $1", CATEGORY_COLUMNS);

        let row = sqlx::query(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => category_from_row(&row),
            None => Err(DomainError::CategoryNotFound),
        }
    }

    async fn set_published(&self, id: i64, is_published: bool) -> Result<Category, DomainError> {
        let sql = format!(
            "UPDATE categories SET is_published = $1 WHERE id = $2 RETURNING {}",
            CATEGORY_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(is_published)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => category_from_row(&row),
            None => Err(DomainError::CategoryNotFound),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        // posts.category_id is ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            Err(DomainError::CategoryNotFound)
        } else {
            Ok(())
        }
    }

    async fn list(&self) -> Result<Vec<Category>, DomainError> {
        let sql = format!(
            "SELECT {} FROM categories ORDER BY title ASC",
            CATEGORY_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        rows.iter().map(category_from_row).collect()
    }
}

pub struct PostgresLocationRepository {
    pool: PgPool,
}

impl PostgresLocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn create(&self, new: &NewLocation) -> Result<Location, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO locations (name, is_published, created_at)
            VALUES ($1, $2, NOW())
            RETURNING {}
            "#,
            LOCATION_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(&new.name)
            .bind(new.is_published)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create location: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        location_from_row(&row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Location, DomainError> {
        let sql = format!("SELECT {} FROM locations WHERE id = $1", LOCATION_COLUMNS);

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => location_from_row(&row),
            None => Err(DomainError::LocationNotFound),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        // posts.location_id is ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            Err(DomainError::LocationNotFound)
        } else {
            Ok(())
        }
    }

    async fn list(&self) -> Result<Vec<Location>, DomainError> {
        let sql = format!("SELECT {} FROM locations ORDER BY name ASC", LOCATION_COLUMNS);

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        rows.iter().map(location_from_row).collect()
    }
}
