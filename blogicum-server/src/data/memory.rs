//! In-memory implementation of every repository trait, used by the test suite.
//!
//! Reproduces the foreign-key actions of the Postgres schema: deleting a user
//! removes their posts and comments, deleting a post removes its comments,
//! deleting a category or location clears the reference on its posts.

use crate::data::catalog_repository::{CategoryRepository, LocationRepository};
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::catalog::{NewCategory, NewLocation, PublishedFields};
use crate::domain::post::{CategoryRef, LocationRef, PostForm};
use crate::domain::user::RegisterUserRequest;
use crate::domain::{
    Category, Comment, CommentCard, DomainError, Location, Post, PostCard, PostQuery, User,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    next_id: i64,
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    categories: BTreeMap<i64, Category>,
    locations: BTreeMap<i64, Location>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn card(&self, post: &Post) -> PostCard {
        PostCard {
            author_username: self
                .users
                .get(&post.author_id)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            category: post
                .category_id
                .and_then(|id| self.categories.get(&id))
                .map(|c| CategoryRef {
                    id: c.id,
                    title: c.title.clone(),
                    slug: c.slug.clone(),
                    is_published: c.published.is_published,
                }),
            location: post
                .location_id
                .and_then(|id| self.locations.get(&id))
                .map(|l| LocationRef {
                    id: l.id,
                    name: l.name.clone(),
                    is_published: l.published.is_published,
                }),
            comment_count: self
                .comments
                .values()
                .filter(|c| c.post_id == post.id)
                .count() as i64,
            post: post.clone(),
        }
    }

    fn remove_post(&mut self, id: i64) -> bool {
        let removed = self.posts.remove(&id).is_some();
        self.comments.retain(|_, c| c.post_id != id);
        removed
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(
        &self,
        req: RegisterUserRequest,
        password_hash: String,
    ) -> Result<User, DomainError> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|u| u.username == req.username || u.email == req.email)
        {
            return Err(DomainError::UserAlreadyExists);
        }

        let user = User {
            id: state.next_id(),
            username: req.username,
            email: req.email,
            password_hash,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<User, DomainError> {
        let state = self.state.read().await;
        state
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(DomainError::UserNotFound)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, DomainError> {
        let state = self.state.read().await;
        state
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(DomainError::UserNotFound)
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if state.users.remove(&id).is_none() {
            return Err(DomainError::UserNotFound);
        }

        let owned: Vec<i64> = state
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            state.remove_post(post_id);
        }
        state.comments.retain(|_, c| c.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, author_id: i64, form: &PostForm) -> Result<Post, DomainError> {
        let mut state = self.state.write().await;
        let post = Post {
            id: state.next_id(),
            title: form.title.clone(),
            text: form.text.clone(),
            pub_date: form.pub_date,
            image: form.image.clone(),
            author_id,
            category_id: form.category_id,
            location_id: form.location_id,
            published: PublishedFields::new(form.is_published),
        };
        state.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: i64) -> Result<PostCard, DomainError> {
        let state = self.state.read().await;
        state
            .posts
            .get(&id)
            .map(|post| state.card(post))
            .ok_or(DomainError::PostNotFound)
    }

    async fn update(&self, id: i64, form: &PostForm) -> Result<Post, DomainError> {
        let mut state = self.state.write().await;
        let post = state.posts.get_mut(&id).ok_or(DomainError::PostNotFound)?;
        post.title = form.title.clone();
        post.text = form.text.clone();
        post.pub_date = form.pub_date;
        post.image = form.image.clone();
        post.published.is_published = form.is_published;
        post.category_id = form.category_id;
        post.location_id = form.location_id;
        Ok(post.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if state.remove_post(id) {
            Ok(())
        } else {
            Err(DomainError::PostNotFound)
        }
    }

    async fn list(
        &self,
        query: &PostQuery,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PostCard>, i64), DomainError> {
        let state = self.state.read().await;
        let mut cards: Vec<PostCard> = state
            .posts
            .values()
            .map(|post| state.card(post))
            .filter(|card| query.matches(card))
            .collect();
        cards.sort_by(|a, b| {
            b.post
                .pub_date
                .cmp(&a.post.pub_date)
                .then(b.post.id.cmp(&a.post.id))
        });

        let total = cards.len() as i64;
        let page = cards
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect();
        Ok((page, total))
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create(
        &self,
        post_id: i64,
        author_id: i64,
        text: &str,
    ) -> Result<Comment, DomainError> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&post_id) {
            return Err(DomainError::PostNotFound);
        }
        let comment = Comment {
            id: state.next_id(),
            text: text.to_string(),
            post_id,
            author_id,
            created_at: Utc::now(),
        };
        state.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_by_id(&self, id: i64) -> Result<Comment, DomainError> {
        let state = self.state.read().await;
        state
            .comments
            .get(&id)
            .cloned()
            .ok_or(DomainError::CommentNotFound)
    }

    async fn update_text(&self, id: i64, text: &str) -> Result<Comment, DomainError> {
        let mut state = self.state.write().await;
        let comment = state
            .comments
            .get_mut(&id)
            .ok_or(DomainError::CommentNotFound)?;
        comment.text = text.to_string();
        Ok(comment.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        state
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::CommentNotFound)
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentCard>, DomainError> {
        let state = self.state.read().await;
        let mut cards: Vec<CommentCard> = state
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .map(|c| CommentCard {
                comment: c.clone(),
                author_username: state
                    .users
                    .get(&c.author_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default(),
            })
            .collect();
        cards.sort_by(|a, b| {
            a.comment
                .created_at
                .cmp(&b.comment.created_at)
                .then(a.comment.id.cmp(&b.comment.id))
        });
        Ok(cards)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn create(&self, new: &NewCategory) -> Result<Category, DomainError> {
        let mut state = self.state.write().await;
        if state.categories.values().any(|c| c.slug == new.slug) {
            return Err(DomainError::SlugTaken(new.slug.clone()));
        }
        let category = Category {
            id: state.next_id(),
            title: new.title.clone(),
            description: new.description.clone(),
            slug: new.slug.clone(),
            published: PublishedFields::new(new.is_published),
        };
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn find_by_id(&self, id: i64) -> Result<Category, DomainError> {
        let state = self.state.read().await;
        state
            .categories
            .get(&id)
            .cloned()
            .ok_or(DomainError::CategoryNotFound)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Category, DomainError> {
        let state = self.state.read().await;
        state
            .categories
            .values()
            .find(|c| c.slug == slug)
            .cloned()
            .ok_or(DomainError::CategoryNotFound)
    }

    async fn set_published(&self, id: i64, is_published: bool) -> Result<Category, DomainError> {
        let mut state = self.state.write().await;
        let category = state
            .categories
            .get_mut(&id)
            .ok_or(DomainError::CategoryNotFound)?;
        category.published.is_published = is_published;
        Ok(category.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if state.categories.remove(&id).is_none() {
            return Err(DomainError::CategoryNotFound);
        }
        for post in state.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Category>, DomainError> {
        let state = self.state.read().await;
        let mut categories: Vec<Category> = state.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(categories)
    }
}

#[async_trait]
impl LocationRepository for InMemoryStore {
    async fn create(&self, new: &NewLocation) -> Result<Location, DomainError> {
        let mut state = self.state.write().await;
        let location = Location {
            id: state.next_id(),
            name: new.name.clone(),
            published: PublishedFields::new(new.is_published),
        };
        state.locations.insert(location.id, location.clone());
        Ok(location)
    }

    async fn find_by_id(&self, id: i64) -> Result<Location, DomainError> {
        let state = self.state.read().await;
        state
            .locations
            .get(&id)
            .cloned()
            .ok_or(DomainError::LocationNotFound)
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if state.locations.remove(&id).is_none() {
            return Err(DomainError::LocationNotFound);
        }
        for post in state.posts.values_mut() {
            if post.location_id == Some(id) {
                post.location_id = None;
            }
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Location>, DomainError> {
        let state = self.state.read().await;
        let mut locations: Vec<Location> = state.locations.values().cloned().collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }
}
