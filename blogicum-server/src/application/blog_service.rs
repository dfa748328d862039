use crate::data::catalog_repository::{CategoryRepository, LocationRepository};
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::comment::CommentForm;
use crate::domain::post::PostForm;
use crate::domain::user::Profile;
use crate::domain::{
    Category, Comment, CommentCard, DomainError, Location, Page, PageRequest, Post, PostCard,
    PostQuery, Requester, Visibility,
};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of an author-only operation. A non-author is diverted, never told "forbidden".
#[derive(Debug)]
pub enum Guarded<T> {
    Allowed(T),
    NotAuthor,
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub post: PostCard,
    pub comments: Vec<CommentCard>,
}

#[derive(Debug, Serialize)]
pub struct FormChoices {
    pub categories: Vec<Category>,
    pub locations: Vec<Location>,
}

pub struct BlogService {
    post_repo: Arc<dyn PostRepository + Send + Sync>,
    comment_repo: Arc<dyn CommentRepository + Send + Sync>,
    category_repo: Arc<dyn CategoryRepository + Send + Sync>,
    location_repo: Arc<dyn LocationRepository + Send + Sync>,
    user_repo: Arc<dyn UserRepository + Send + Sync>,
}

fn is_owner(viewer: Option<&Requester>, author_id: i64) -> bool {
    viewer.map_or(false, |v| v.id == author_id)
}

impl BlogService {
    pub fn new(
        post_repo: Arc<dyn PostRepository + Send + Sync>,
        comment_repo: Arc<dyn CommentRepository + Send + Sync>,
        category_repo: Arc<dyn CategoryRepository + Send + Sync>,
        location_repo: Arc<dyn LocationRepository + Send + Sync>,
        user_repo: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            post_repo,
            comment_repo,
            category_repo,
            location_repo,
            user_repo,
        }
    }

    async fn page(
        &self,
        query: &PostQuery,
        request: PageRequest,
    ) -> Result<Page<PostCard>, DomainError> {
        let (cards, total) = self
            .post_repo
            .list(query, request.limit(), request.offset())
            .await?;
        Ok(Page::new(request, cards, total))
    }

    /// The post as `viewer` may see it; hidden posts are reported missing.
    pub async fn visible_post(
        &self,
        id: i64,
        viewer: Option<&Requester>,
    ) -> Result<PostCard, DomainError> {
        let card = self.post_repo.find_by_id(id).await?;

        if is_owner(viewer, card.post.author_id) || Visibility::now().admits(&card) {
            Ok(card)
        } else {
            tracing::debug!("Post {} is hidden from viewer {:?}", id, viewer.map(|v| v.id));
            Err(DomainError::PostNotFound)
        }
    }

    /// Unknown category or location ids are form errors, not 404s.
    async fn check_references(&self, form: &PostForm) -> Result<(), DomainError> {
        form.validate()?;

        if let Some(category_id) = form.category_id {
            match self.category_repo.find_by_id(category_id).await {
                Err(DomainError::CategoryNotFound) => {
                    return Err(DomainError::ValidationError(format!(
                        "Unknown category: {}",
                        category_id
                    )))
                }
                other => {
                    other?;
                }
            }
        }
        if let Some(location_id) = form.location_id {
            match self.location_repo.find_by_id(location_id).await {
                Err(DomainError::LocationNotFound) => {
                    return Err(DomainError::ValidationError(format!(
                        "Unknown location: {}",
                        location_id
                    )))
                }
                other => {
                    other?;
                }
            }
        }
        Ok(())
    }

    async fn comment_of_post(&self, post_id: i64, comment_id: i64) -> Result<Comment, DomainError> {
        let comment = self.comment_repo.find_by_id(comment_id).await?;
        if comment.post_id != post_id {
            return Err(DomainError::CommentNotFound);
        }
        Ok(comment)
    }

    // ============== Listings ==============

    pub async fn index(&self, request: PageRequest) -> Result<Page<PostCard>, DomainError> {
        self.page(&PostQuery::visible(Visibility::now()), request)
            .await
    }

    pub async fn category_posts(
        &self,
        slug: &str,
        request: PageRequest,
    ) -> Result<(Category, Page<PostCard>), DomainError> {
        let category = self.category_repo.find_by_slug(slug).await?;
        if !category.published.is_published {
            return Err(DomainError::CategoryNotFound);
        }

        let query = PostQuery::visible(Visibility::now()).in_category(category.id);
        let page = self.page(&query, request).await?;
        Ok((category, page))
    }

    pub async fn profile(
        &self,
        username: &str,
        viewer: Option<&Requester>,
        request: PageRequest,
    ) -> Result<(Profile, Page<PostCard>), DomainError> {
        let author = self.user_repo.find_by_username(username).await?;

        let query = if is_owner(viewer, author.id) {
            PostQuery::default().by_author(author.id)
        } else {
            PostQuery::visible(Visibility::now()).by_author(author.id)
        };
        let page = self.page(&query, request).await?;
        Ok((Profile::from(author), page))
    }

    pub async fn post_detail(
        &self,
        id: i64,
        viewer: Option<&Requester>,
    ) -> Result<PostDetail, DomainError> {
        let post = self.visible_post(id, viewer).await?;
        let comments = self.comment_repo.list_for_post(id).await?;
        Ok(PostDetail { post, comments })
    }

    pub async fn form_choices(&self) -> Result<FormChoices, DomainError> {
        Ok(FormChoices {
            categories: self.category_repo.list().await?,
            locations: self.location_repo.list().await?,
        })
    }

    // ============== Posts ==============

    pub async fn create_post(
        &self,
        requester: &Requester,
        form: PostForm,
    ) -> Result<Post, DomainError> {
        self.check_references(&form).await?;

        let post = self.post_repo.create(requester.id, &form).await?;

        tracing::info!("Post created: id={}, author_id={}", post.id, requester.id);
        Ok(post)
    }

    pub async fn post_for_edit(
        &self,
        id: i64,
        requester: &Requester,
    ) -> Result<Guarded<PostCard>, DomainError> {
        let card = self.post_repo.find_by_id(id).await?;
        if card.post.author_id != requester.id {
            return Ok(Guarded::NotAuthor);
        }
        Ok(Guarded::Allowed(card))
    }

    pub async fn update_post(
        &self,
        id: i64,
        requester: &Requester,
        form: PostForm,
    ) -> Result<Guarded<Post>, DomainError> {
        let card = self.post_repo.find_by_id(id).await?;

        if card.post.author_id != requester.id {
            tracing::warn!(
                "User {} attempted to update post {} owned by {}",
                requester.id,
                id,
                card.post.author_id
            );
            return Ok(Guarded::NotAuthor);
        }

        self.check_references(&form).await?;
        let updated = self.post_repo.update(id, &form).await?;

        tracing::info!("Post updated: id={}, author_id={}", id, requester.id);
        Ok(Guarded::Allowed(updated))
    }

    pub async fn delete_post(
        &self,
        id: i64,
        requester: &Requester,
    ) -> Result<Guarded<()>, DomainError> {
        let card = self.post_repo.find_by_id(id).await?;

        if card.post.author_id != requester.id {
            tracing::warn!(
                "User {} attempted to delete post {} owned by {}",
                requester.id,
                id,
                card.post.author_id
            );
            return Ok(Guarded::NotAuthor);
        }

        self.post_repo.delete(id).await?;

        tracing::info!("Post deleted: id={}, author_id={}", id, requester.id);
        Ok(Guarded::Allowed(()))
    }

    // ============== Comments ==============

    pub async fn add_comment(
        &self,
        post_id: i64,
        requester: &Requester,
        form: CommentForm,
    ) -> Result<Comment, DomainError> {
        self.visible_post(post_id, Some(requester)).await?;
        form.validate()?;

        let comment = self
            .comment_repo
            .create(post_id, requester.id, &form.text)
            .await?;

        tracing::info!(
            "Comment created: id={}, post_id={}, author_id={}",
            comment.id,
            post_id,
            requester.id
        );
        Ok(comment)
    }

    pub async fn comment_for_edit(
        &self,
        post_id: i64,
        comment_id: i64,
        requester: &Requester,
    ) -> Result<Guarded<Comment>, DomainError> {
        let comment = self.comment_of_post(post_id, comment_id).await?;
        if comment.author_id != requester.id {
            return Ok(Guarded::NotAuthor);
        }
        Ok(Guarded::Allowed(comment))
    }

    pub async fn update_comment(
        &self,
        post_id: i64,
        comment_id: i64,
        requester: &Requester,
        form: CommentForm,
    ) -> Result<Guarded<Comment>, DomainError> {
        let comment = self.comment_of_post(post_id, comment_id).await?;

        if comment.author_id != requester.id {
            tracing::warn!(
                "User {} attempted to edit comment {} owned by {}",
                requester.id,
                comment_id,
                comment.author_id
            );
            return Ok(Guarded::NotAuthor);
        }

        form.validate()?;
        let updated = self.comment_repo.update_text(comment_id, &form.text).await?;

        tracing::info!("Comment updated: id={}, post_id={}", comment_id, post_id);
        Ok(Guarded::Allowed(updated))
    }

    pub async fn delete_comment(
        &self,
        post_id: i64,
        comment_id: i64,
        requester: &Requester,
    ) -> Result<Guarded<()>, DomainError> {
        let comment = self.comment_of_post(post_id, comment_id).await?;

        if comment.author_id != requester.id {
            tracing::warn!(
                "User {} attempted to delete comment {} owned by {}",
                requester.id,
                comment_id,
                comment.author_id
            );
            return Ok(Guarded::NotAuthor);
        }

        self.comment_repo.delete(comment_id).await?;

        tracing::info!("Comment deleted: id={}, post_id={}", comment_id, post_id);
        Ok(Guarded::Allowed(()))
    }
}
