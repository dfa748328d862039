use crate::application::{AuthService, BlogService, CatalogService};
use crate::data::catalog_repository::{CategoryRepository, LocationRepository};
use crate::data::memory::InMemoryStore;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::catalog::{NewCategory, NewLocation};
use crate::domain::post::PostForm;
use crate::domain::user::RegisterUserRequest;
use crate::domain::{Category, Location, Post, Requester};
use crate::infrastructure::jwt::JwtService;
use chrono::{Duration, Utc};
use std::sync::Arc;

pub const TEST_SECRET: &str = "blogicum-test-secret-0123456789abcdef";

/// Services wired to one in-memory store.
pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub jwt: Arc<JwtService>,
    pub auth: Arc<AuthService>,
    pub blog: Arc<BlogService>,
    pub catalog: Arc<CatalogService>,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let jwt = Arc::new(JwtService::new(TEST_SECRET, 1).expect("jwt service"));

        Self {
            auth: Arc::new(AuthService::new(store.clone(), jwt.clone())),
            blog: Arc::new(BlogService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
            )),
            catalog: Arc::new(CatalogService::new(store.clone(), store.clone())),
            store,
            jwt,
        }
    }

    /// Inserts a user directly, skipping password hashing.
    pub async fn user(&self, username: &str) -> Requester {
        let user = UserRepository::create(
            &*self.store,
            RegisterUserRequest {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password: String::new(),
            },
            "unused".to_string(),
        )
        .await
        .expect("user");

        Requester {
            id: user.id,
            username: user.username,
        }
    }

    pub fn token(&self, requester: &Requester) -> String {
        self.jwt
            .generate_token(requester.id, requester.username.clone())
            .expect("token")
    }

    pub async fn category(&self, slug: &str, is_published: bool) -> Category {
        CategoryRepository::create(
            &*self.store,
            &NewCategory {
                title: slug.to_uppercase(),
                description: format!("About {}", slug),
                slug: slug.to_string(),
                is_published,
            },
        )
        .await
        .expect("category")
    }

    pub async fn location(&self, name: &str) -> Location {
        LocationRepository::create(
            &*self.store,
            &NewLocation {
                name: name.to_string(),
                is_published: true,
            },
        )
        .await
        .expect("location")
    }

    pub async fn post(&self, author: &Requester, form: PostForm) -> Post {
        PostRepository::create(&*self.store, author.id, &form)
            .await
            .expect("post")
    }
}

/// A published post dated an hour ago, with no category or location.
pub fn form(title: &str) -> PostForm {
    PostForm {
        title: title.to_string(),
        text: format!("{} body", title),
        pub_date: Utc::now() - Duration::hours(1),
        image: None,
        category_id: None,
        location_id: None,
        is_published: true,
    }
}
