use super::catalog::{default_published, validate_title, PublishedFields};
use super::visibility::Visibility;
use super::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub image: Option<String>,
    pub author_id: i64,
    pub category_id: Option<i64>,
    pub location_id: Option<i64>,
    #[serde(flatten)]
    pub published: PublishedFields,
}

pub fn post_url(id: i64) -> String {
    format!("/posts/{}/", id)
}

/// Create and edit share one form; an edit replaces every field except the author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub text: String,
    #[serde(default = "Utc::now")]
    pub pub_date: DateTime<Utc>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub location_id: Option<i64>,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

impl PostForm {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_title("Title", &self.title)?;
        if self.text.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Text cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&Post> for PostForm {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            text: post.text.clone(),
            pub_date: post.pub_date,
            image: post.image.clone(),
            category_id: post.category_id,
            location_id: post.location_id,
            is_published: post.published.is_published,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRef {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub is_published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocationRef {
    pub id: i64,
    pub name: String,
    pub is_published: bool,
}

/// A post joined with everything a listing or detail page shows about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCard {
    #[serde(flatten)]
    pub post: Post,
    pub author_username: String,
    pub category: Option<CategoryRef>,
    pub location: Option<LocationRef>,
    pub comment_count: i64,
}

/// Listing criteria. Every storage backend applies the conjunction of the set fields.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub visibility: Option<Visibility>,
    pub category_id: Option<i64>,
    pub author_id: Option<i64>,
}

impl PostQuery {
    pub fn visible(visibility: Visibility) -> Self {
        Self {
            visibility: Some(visibility),
            ..Self::default()
        }
    }

    pub fn in_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn by_author(mut self, author_id: i64) -> Self {
        self.author_id = Some(author_id);
        self
    }

    /// In-memory twin of the SQL filter in `post_repository`.
    #[cfg(test)]
    pub fn matches(&self, card: &PostCard) -> bool {
        self.visibility.map_or(true, |v| v.admits(card))
            && self
                .category_id
                .map_or(true, |id| card.post.category_id == Some(id))
            && self
                .author_id
                .map_or(true, |id| card.post.author_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, text: &str) -> PostForm {
        serde_json::from_value(serde_json::json!({ "title": title, "text": text })).unwrap()
    }

    #[test]
    fn form_defaults_to_published_now() {
        let before = Utc::now();
        let form = form("Hello", "World");
        assert!(form.is_published);
        assert!(form.pub_date >= before);
        assert!(form.category_id.is_none());
        assert!(form.validate().is_ok());
    }

    #[test]
    fn form_rejects_blank_fields() {
        assert!(form("", "text").validate().is_err());
        assert!(form("title", "  ").validate().is_err());
    }

    #[test]
    fn post_url_follows_route_table() {
        assert_eq!(post_url(42), "/posts/42/");
    }
}
