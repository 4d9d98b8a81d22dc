use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DbConn, DbErr, EntityTrait, IntoActiveModel,
    PrimaryKeyTrait, SqlErr,
};
use uuid::Uuid;

use folio_core::domain::{Category, Comment, Location, Post, User};
use folio_core::error::RepoError;
use folio_core::ports::BaseRepository;

/// Domain types that know their own primary key.
pub trait Identified<ID> {
    fn identity(&self) -> ID;
}

impl Identified<Uuid> for User {
    fn identity(&self) -> Uuid {
        self.id
    }
}

impl Identified<Uuid> for Category {
    fn identity(&self) -> Uuid {
        self.id
    }
}

impl Identified<Uuid> for Location {
    fn identity(&self) -> Uuid {
        self.id
    }
}

impl Identified<Uuid> for Post {
    fn identity(&self) -> Uuid {
        self.id
    }
}

impl Identified<Uuid> for Comment {
    fn identity(&self) -> Uuid {
        self.id
    }
}

/// Map a SeaORM error onto the repository error taxonomy.
pub(crate) fn map_db_err(err: DbErr) -> RepoError {
    if let Some(sql_err) = err.sql_err() {
        return match sql_err {
            SqlErr::UniqueConstraintViolation(msg) => RepoError::Constraint(msg),
            SqlErr::ForeignKeyConstraintViolation(msg) => RepoError::Constraint(msg),
            _ => RepoError::Query(err.to_string()),
        };
    }
    match err {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => RepoError::Connection(err.to_string()),
        DbErr::RecordNotFound(_) => RepoError::NotFound,
        _ => RepoError::Query(err.to_string()),
    }
}

/// Generic PostgreSQL repository implementation.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E, T, ID> BaseRepository<T, ID> for PostgresBaseRepository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync + Send,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = ID>,
    ID: Send + Sync + Into<sea_orm::Value> + Clone + Copy + 'static,
    T: From<E::Model> + Into<E::ActiveModel> + Identified<ID> + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError> {
        let result = E::find_by_id(id).one(&self.db).await.map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn save(&self, entity: T) -> Result<T, RepoError> {
        // Ids are assigned by the domain, so an existing row decides between
        // INSERT and UPDATE.
        let exists = E::find_by_id(entity.identity())
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .is_some();

        let active_model: E::ActiveModel = entity.into();
        let model = if exists {
            active_model.update(&self.db).await
        } else {
            active_model.insert(&self.db).await
        }
        .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn delete(&self, id: ID) -> Result<(), RepoError> {
        let result = E::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
