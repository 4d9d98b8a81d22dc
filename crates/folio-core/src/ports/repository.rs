use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Comment, Location, Post, User};
use crate::error::RepoError;
use crate::pagination::PageWindow;
use crate::query::{CommentView, PostFilter, PostRecord};

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their public username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;
}

/// Location repository.
pub trait LocationRepository: BaseRepository<Location, Uuid> {}

/// Post repository.
///
/// Listing methods take a [`PostFilter`] and return rows in feed order
/// (`pub_date` descending, then id descending).
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Fetch one post with its author, category and location.
    async fn find_related(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError>;

    /// Fetch the posts matching `filter`, restricted to `window` when given.
    /// With `eager` set, relations are loaded in batches rather than left empty.
    async fn find_by_filter(
        &self,
        filter: &PostFilter,
        window: Option<PageWindow>,
        eager: bool,
    ) -> Result<Vec<PostRecord>, RepoError>;

    /// Count the posts matching `filter`.
    async fn count_by_filter(&self, filter: &PostFilter) -> Result<u64, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments of a post with their authors, oldest first.
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError>;

    /// Comment counts for several posts at once. Posts without comments may be absent.
    async fn count_by_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError>;

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let counts = self.count_by_posts(&[post_id]).await?;
        Ok(counts.get(&post_id).copied().unwrap_or(0))
    }
}

/// The full set of stores the blog service reads from and writes to.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
}
