use super::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_TITLE_LENGTH: usize = 256;
pub const MAX_SLUG_LENGTH: usize = 50;

/// Publication flag and insertion time shared by locations, categories and posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedFields {
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl PublishedFields {
    #[cfg(test)]
    pub fn new(is_published: bool) -> Self {
        Self {
            is_published,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub published: PublishedFields,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub slug: String,
    #[serde(flatten)]
    pub published: PublishedFields,
}

impl Category {
    pub fn url(&self) -> String {
        format!("/category/{}/", self.slug)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub title: String,
    pub description: String,
    pub slug: String,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewLocation {
    pub name: String,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

pub(crate) fn default_published() -> bool {
    true
}

/// Non-empty, at most 256 characters.
pub fn validate_title(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::ValidationError(format!(
            "{} cannot be empty",
            field
        )));
    }
    if value.chars().count() > MAX_TITLE_LENGTH {
        return Err(DomainError::ValidationError(format!(
            "{} must be at most {} characters",
            field, MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}

/// Letters, digits, hyphens and underscores only, at most 50 characters.
pub fn validate_slug(slug: &str) -> Result<(), DomainError> {
    let valid = !slug.is_empty()
        && slug.len() <= MAX_SLUG_LENGTH
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(DomainError::ValidationError(format!(
            "Invalid slug: {:?}",
            slug
        )))
    }
}

impl NewCategory {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_title("Title", &self.title)?;
        validate_slug(&self.slug)
    }
}

impl NewLocation {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_title("Name", &self.name)
    }
}
