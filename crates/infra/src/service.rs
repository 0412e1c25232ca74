//! Transactional entry points over [`Repository`].

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use supplydesk_core::Entity;
use supplydesk_query::{Filter, KeyRegistry, ListRequest, Page};

use crate::error::{PersistenceError, RepoError};
use crate::record::Record;
use crate::repository::Repository;

/// Read access to one record type.
///
/// `scope` filters are trusted, already-authorized narrowing (row scoping);
/// they are applied alongside the id lookup in `get`.
#[async_trait]
pub trait RecordService<E: Entity>: Send + Sync {
    async fn list(&self, request: ListRequest) -> Result<Page<E>, RepoError>;

    async fn get(&self, id: E::Id, scope: Vec<Filter>) -> Result<E, RepoError>;

    async fn all(&self) -> Result<Vec<E>, RepoError>;
}

/// Runs each call in its own transaction.
pub struct PgRecordService<E> {
    pool: PgPool,
    repo: Repository<E>,
}

impl<E: Record> PgRecordService<E> {
    pub fn new(pool: PgPool, registry: KeyRegistry) -> Self {
        Self {
            pool,
            repo: Repository::new(Arc::new(registry)),
        }
    }
}

#[async_trait]
impl<E: Record> RecordService<E> for PgRecordService<E> {
    async fn list(&self, request: ListRequest) -> Result<Page<E>, RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PersistenceError::new("begin", e))?;
        let (rows, total) = self.repo.list(&mut *tx, &request).await?;
        tx.commit()
            .await
            .map_err(|e| PersistenceError::new("commit", e))?;

        Ok(Page::new(request.offset, request.limit, request.sort, total, rows))
    }

    async fn get(&self, id: E::Id, scope: Vec<Filter>) -> Result<E, RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PersistenceError::new("begin", e))?;
        let record = self.repo.get(&mut *tx, id, &scope).await?;
        tx.commit()
            .await
            .map_err(|e| PersistenceError::new("commit", e))?;
        Ok(record)
    }

    async fn all(&self) -> Result<Vec<E>, RepoError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| PersistenceError::new("acquire", e))?;
        Ok(self.repo.all(&mut *conn).await?)
    }
}
