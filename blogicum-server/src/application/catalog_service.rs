use crate::data::catalog_repository::{CategoryRepository, LocationRepository};
use crate::domain::catalog::{NewCategory, NewLocation};
use crate::domain::{Category, DomainError, Location};
use std::sync::Arc;

/// Category and location maintenance, driven from the command line.
pub struct CatalogService {
    category_repo: Arc<dyn CategoryRepository + Send + Sync>,
    location_repo: Arc<dyn LocationRepository + Send + Sync>,
}

impl CatalogService {
    pub fn new(
        category_repo: Arc<dyn CategoryRepository + Send + Sync>,
        location_repo: Arc<dyn LocationRepository + Send + Sync>,
    ) -> Self {
        Self {
            category_repo,
            location_repo,
        }
    }

    pub async fn add_category(&self, new: NewCategory) -> Result<Category, DomainError> {
        new.validate()?;

        let category = self.category_repo.create(&new).await?;
        tracing::info!(
            "Category created: id={}, slug={}, published={}",
            category.id,
            category.slug,
            category.published.is_published
        );
        Ok(category)
    }

    pub async fn set_category_published(
        &self,
        slug: &str,
        is_published: bool,
    ) -> Result<Category, DomainError> {
        let category = self.category_repo.find_by_slug(slug).await?;
        let category = self
            .category_repo
            .set_published(category.id, is_published)
            .await?;

        tracing::info!("Category {} published={}", category.slug, is_published);
        Ok(category)
    }

    pub async fn remove_category(&self, slug: &str) -> Result<(), DomainError> {
        let category = self.category_repo.find_by_slug(slug).await?;
        self.category_repo.delete(category.id).await?;

        tracing::info!("Category removed: id={}, slug={}", category.id, slug);
        Ok(())
    }

    pub async fn categories(&self) -> Result<Vec<Category>, DomainError> {
        self.category_repo.list().await
    }

    pub async fn add_location(&self, new: NewLocation) -> Result<Location, DomainError> {
        new.validate()?;

        let location = self.location_repo.create(&new).await?;
        tracing::info!("Location created: id={}, name={}", location.id, location.name);
        Ok(location)
    }

    pub async fn remove_location(&self, id: i64) -> Result<(), DomainError> {
        self.location_repo.delete(id).await?;

        tracing::info!("Location removed: id={}", id);
        Ok(())
    }

    pub async fn locations(&self) -> Result<Vec<Location>, DomainError> {
        self.location_repo.list().await
    }
}
