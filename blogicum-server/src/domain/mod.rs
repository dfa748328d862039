pub mod catalog;
pub mod comment;
pub mod error;
pub mod pagination;
pub mod post;
pub mod user;
pub mod visibility;

pub use catalog::{Category, Location};
pub use comment::{Comment, CommentCard};
pub use error::DomainError;
pub use pagination::{Page, PageRequest};
pub use post::{Post, PostCard, PostQuery};
pub use user::{Requester, User};
pub use visibility::Visibility;
