//! In-memory tables behind an async RwLock, with the same referential rules
//! as the database schema: deleting a user or post cascades, deleting a
//! category or location clears the reference.
//!
//! Note: Data is lost on process restart.

use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use folio_core::domain::{Category, Comment, Location, Post, User};
use folio_core::error::RepoError;
use folio_core::pagination::PageWindow;
use folio_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostRepository,
    Repositories, UserRepository,
};
use folio_core::query::{CommentView, PostFilter, PostRecord, feed_order};

#[derive(Default)]
pub struct Tables {
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    locations: HashMap<Uuid, Location>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
}

impl Tables {
    fn category_of(&self, post: &Post) -> Option<&Category> {
        post.category_id.and_then(|id| self.categories.get(&id))
    }

    fn record(&self, post: &Post) -> PostRecord {
        PostRecord {
            post: post.clone(),
            author: self.users.get(&post.author_id).cloned(),
            category: self.category_of(post).cloned(),
            location: post.location_id.and_then(|id| self.locations.get(&id)).cloned(),
        }
    }

    fn remove_post(&mut self, post_id: Uuid) {
        self.posts.remove(&post_id);
        self.comments.retain(|_, c| c.post_id != post_id);
    }
}

/// An entity kept in one of the in-memory tables.
pub trait Stored: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
    fn table(tables: &Tables) -> &HashMap<Uuid, Self>;
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self>;

    /// Reject rows that would violate a unique or foreign key constraint.
    fn check(&self, _tables: &Tables) -> Result<(), RepoError> {
        Ok(())
    }

    /// Apply delete rules to rows referencing the removed entity.
    fn on_delete(_id: Uuid, _tables: &mut Tables) {}
}

impl Stored for User {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.users
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.users
    }

    fn check(&self, tables: &Tables) -> Result<(), RepoError> {
        if tables
            .users
            .values()
            .any(|u| u.username == self.username && u.id != self.id)
        {
            return Err(RepoError::Constraint(format!(
                "username '{}' is taken",
                self.username
            )));
        }
        Ok(())
    }

    fn on_delete(id: Uuid, tables: &mut Tables) {
        let authored: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in authored {
            tables.remove_post(post_id);
        }
        tables.comments.retain(|_, c| c.author_id != id);
    }
}

impl Stored for Category {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.categories
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.categories
    }

    fn check(&self, tables: &Tables) -> Result<(), RepoError> {
        if tables
            .categories
            .values()
            .any(|c| c.slug == self.slug && c.id != self.id)
        {
            return Err(RepoError::Constraint(format!(
                "category slug '{}' is taken",
                self.slug
            )));
        }
        Ok(())
    }

    fn on_delete(id: Uuid, tables: &mut Tables) {
        for post in tables.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
    }
}

impl Stored for Location {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.locations
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.locations
    }

    fn on_delete(id: Uuid, tables: &mut Tables) {
        for post in tables.posts.values_mut() {
            if post.location_id == Some(id) {
                post.location_id = None;
            }
        }
    }
}

impl Stored for Post {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.posts
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.posts
    }

    fn check(&self, tables: &Tables) -> Result<(), RepoError> {
        if !tables.users.contains_key(&self.author_id) {
            return Err(RepoError::Constraint("post author does not exist".to_string()));
        }
        if self
            .category_id
            .is_some_and(|id| !tables.categories.contains_key(&id))
        {
            return Err(RepoError::Constraint("post category does not exist".to_string()));
        }
        if self
            .location_id
            .is_some_and(|id| !tables.locations.contains_key(&id))
        {
            return Err(RepoError::Constraint("post location does not exist".to_string()));
        }
        Ok(())
    }

    fn on_delete(id: Uuid, tables: &mut Tables) {
        tables.comments.retain(|_, c| c.post_id != id);
    }
}

impl Stored for Comment {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.comments
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.comments
    }

    fn check(&self, tables: &Tables) -> Result<(), RepoError> {
        if !tables.posts.contains_key(&self.post_id) {
            return Err(RepoError::Constraint("comment post does not exist".to_string()));
        }
        if !tables.users.contains_key(&self.author_id) {
            return Err(RepoError::Constraint("comment author does not exist".to_string()));
        }
        Ok(())
    }
}

/// In-memory store shared by all repository handles created from it.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository handles over this store, ready for the blog service.
    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(MemoryUserRepository::new(self.clone())),
            categories: Arc::new(MemoryCategoryRepository::new(self.clone())),
            locations: Arc::new(MemoryLocationRepository::new(self.clone())),
            posts: Arc::new(MemoryPostRepository::new(self.clone())),
            comments: Arc::new(MemoryCommentRepository::new(self.clone())),
        }
    }
}

/// Generic in-memory repository over one table.
pub struct MemoryRepository<T> {
    store: InMemoryStore,
    _entity: PhantomData<T>,
}

impl<T> MemoryRepository<T> {
    pub fn new(store: InMemoryStore) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }
}

pub type MemoryUserRepository = MemoryRepository<User>;
pub type MemoryCategoryRepository = MemoryRepository<Category>;
pub type MemoryLocationRepository = MemoryRepository<Location>;
pub type MemoryPostRepository = MemoryRepository<Post>;
pub type MemoryCommentRepository = MemoryRepository<Comment>;

#[async_trait]
impl<T: Stored> BaseRepository<T, Uuid> for MemoryRepository<T> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(T::table(&tables).get(&id).cloned())
    }

    async fn save(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.store.tables.write().await;
        entity.check(&tables)?;
        T::table_mut(&mut tables).insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;
        if T::table_mut(&mut tables).remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        T::on_delete(id, &mut tables);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl CategoryRepository for MemoryCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.categories.values().find(|c| c.slug == slug).cloned())
    }
}

impl LocationRepository for MemoryLocationRepository {}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn find_related(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.posts.get(&id).map(|post| tables.record(post)))
    }

    async fn find_by_filter(
        &self,
        filter: &PostFilter,
        window: Option<PageWindow>,
        eager: bool,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let tables = self.store.tables.read().await;
        let mut matching: Vec<&Post> = tables
            .posts
            .values()
            .filter(|post| filter.matches(post, tables.category_of(post)))
            .collect();
        matching.sort_by(|a, b| feed_order(a, b));

        let (skip, take) = match window {
            Some(window) => (window.offset() as usize, window.limit() as usize),
            None => (0, usize::MAX),
        };

        Ok(matching
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|post| {
                if eager {
                    tables.record(post)
                } else {
                    PostRecord::bare(post.clone())
                }
            })
            .collect())
    }

    async fn count_by_filter(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        let tables = self.store.tables.read().await;
        let count = tables
            .posts
            .values()
            .filter(|post| filter.matches(post, tables.category_of(post)))
            .count();
        Ok(count as u64)
    }
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
        let tables = self.store.tables.read().await;
        let mut comments: Vec<&Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        Ok(comments
            .into_iter()
            .map(|comment| CommentView {
                comment: comment.clone(),
                author: tables.users.get(&comment.author_id).cloned(),
            })
            .collect())
    }

    async fn count_by_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError> {
        let wanted: HashSet<&Uuid> = post_ids.iter().collect();
        let tables = self.store.tables.read().await;
        let mut counts = HashMap::new();
        for comment in tables.comments.values() {
            if wanted.contains(&comment.post_id) {
                *counts.entry(comment.post_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}
