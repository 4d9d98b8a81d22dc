//! PostgreSQL repository implementations.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DbConn, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};
use uuid::Uuid;

use folio_core::domain::{Category, Location, Post, User};
use folio_core::error::RepoError;
use folio_core::pagination::PageWindow;
use folio_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, Repositories,
    UserRepository,
};
use folio_core::query::{CommentView, PostFilter, PostRecord, VisibilityScope};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::location::{self, Entity as LocationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL location repository.
pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// All PostgreSQL repositories over one connection pool.
#[derive(Clone)]
pub struct PostgresStore {
    db: DbConn,
}

impl PostgresStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(PostgresUserRepository::new(self.db.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(self.db.clone())),
            locations: Arc::new(PostgresLocationRepository::new(self.db.clone())),
            posts: Arc::new(PostgresPostRepository::new(self.db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(self.db.clone())),
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

impl LocationRepository for PostgresLocationRepository {}

/// Translate a [`PostFilter`] into a SELECT over posts. Visibility needs the
/// category's publication flag, so those queries LEFT JOIN categories.
fn filtered(filter: &PostFilter) -> Select<PostEntity> {
    let mut select = PostEntity::find();

    if let Some(category_id) = filter.category_id {
        select = select.filter(post::Column::CategoryId.eq(category_id));
    }
    if let Some(author_id) = filter.author_id {
        select = select.filter(post::Column::AuthorId.eq(author_id));
    }

    if let VisibilityScope::VisibleTo { viewer, now } = filter.scope {
        let live = Condition::all()
            .add(post::Column::IsPublished.eq(true))
            .add(post::Column::PubDate.lte(now))
            .add(
                Condition::any()
                    .add(post::Column::CategoryId.is_null())
                    .add(category::Column::IsPublished.eq(true)),
            );
        let visible = match viewer.user_id() {
            Some(user_id) => Condition::any()
                .add(live)
                .add(post::Column::AuthorId.eq(user_id)),
            None => live,
        };

        select = select
            .join(JoinType::LeftJoin, post::Relation::Category.def())
            .filter(visible);
    }

    select
}

/// Load authors, categories and locations for a batch of posts with one
/// query per relation.
async fn load_relations(
    db: &DbConn,
    models: Vec<post::Model>,
) -> Result<Vec<PostRecord>, RepoError> {
    let author_ids: BTreeSet<Uuid> = models.iter().map(|m| m.author_id).collect();
    let category_ids: BTreeSet<Uuid> = models.iter().filter_map(|m| m.category_id).collect();
    let location_ids: BTreeSet<Uuid> = models.iter().filter_map(|m| m.location_id).collect();

    let authors: HashMap<Uuid, User> = if author_ids.is_empty() {
        HashMap::new()
    } else {
        UserEntity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|m| (m.id, m.into()))
            .collect()
    };

    let categories: HashMap<Uuid, Category> = if category_ids.is_empty() {
        HashMap::new()
    } else {
        CategoryEntity::find()
            .filter(category::Column::Id.is_in(category_ids))
            .all(db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|m| (m.id, m.into()))
            .collect()
    };

    let locations: HashMap<Uuid, Location> = if location_ids.is_empty() {
        HashMap::new()
    } else {
        LocationEntity::find()
            .filter(location::Column::Id.is_in(location_ids))
            .all(db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|m| (m.id, m.into()))
            .collect()
    };

    Ok(models
        .into_iter()
        .map(|model| {
            let post: Post = model.into();
            PostRecord {
                author: authors.get(&post.author_id).cloned(),
                category: post.category_id.and_then(|id| categories.get(&id).cloned()),
                location: post.location_id.and_then(|id| locations.get(&id).cloned()),
                post,
            }
        })
        .collect())
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_related(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        Ok(load_relations(&self.db, vec![model]).await?.pop())
    }

    async fn find_by_filter(
        &self,
        filter: &PostFilter,
        window: Option<PageWindow>,
        eager: bool,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let mut select = filtered(filter)
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::Id);
        if let Some(window) = window {
            select = select.offset(window.offset()).limit(window.limit());
        }

        let models = select.all(&self.db).await.map_err(map_db_err)?;
        tracing::debug!(rows = models.len(), eager, "Fetched posts");

        if eager {
            load_relations(&self.db, models).await
        } else {
            Ok(models
                .into_iter()
                .map(|m| PostRecord::bare(m.into()))
                .collect())
        }
    }

    async fn count_by_filter(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        filtered(filter).count(&self.db).await.map_err(map_db_err)
    }
}

#[derive(Debug, FromQueryResult)]
struct CommentTally {
    post_id: Uuid,
    total: i64,
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .find_also_related(UserEntity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|(comment, author)| CommentView {
                comment: comment.into(),
                author: author.map(Into::into),
            })
            .collect())
    }

    async fn count_by_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let tallies = CommentEntity::find()
            .select_only()
            .column(comment::Column::PostId)
            .column_as(Expr::col(comment::Column::Id).count(), "total")
            .filter(comment::Column::PostId.is_in(post_ids.iter().copied()))
            .group_by(comment::Column::PostId)
            .into_model::<CommentTally>()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(tallies
            .into_iter()
            .map(|t| (t.post_id, t.total.max(0) as u64))
            .collect())
    }
}
