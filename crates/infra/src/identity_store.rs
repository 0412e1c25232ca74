//! Identity hydration for authenticated requests.
//!
//! Identities are loaded fresh on every request; nothing is cached, so a
//! role or permission change applies from the caller's next request.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use supplydesk_auth::Identity;
use supplydesk_core::{OrgId, UserId};

use crate::error::{IdentityError, PersistenceError};
use crate::records::user_roles;

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// The active user `id` with its active roles (ordered by role id) and
    /// their permissions.
    async fn fetch_identity(&self, id: UserId) -> Result<Identity, IdentityError>;
}

#[async_trait]
impl<S> IdentityStore for Arc<S>
where
    S: IdentityStore + ?Sized,
{
    async fn fetch_identity(&self, id: UserId) -> Result<Identity, IdentityError> {
        (**self).fetch_identity(id).await
    }
}

#[derive(Debug, Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn fetch_identity(&self, id: UserId) -> Result<Identity, IdentityError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| PersistenceError::new("identity.acquire", e))?;

        let row = sqlx::query(
            r#"
            SELECT "id", "full_name", "email", "is_admin", "org_id"
            FROM "users"
            WHERE "id" = $1 AND "status" = TRUE
            "#,
        )
        .bind(id.get())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| PersistenceError::new("identity.user", e))?
        .ok_or(IdentityError::NotFound)?;

        let decode = |e| PersistenceError::new("identity.decode", e);
        let mut identity = Identity::new(
            UserId::new(row.try_get("id").map_err(decode)?),
            OrgId::new(row.try_get("org_id").map_err(decode)?),
            Vec::new(),
        );
        identity.full_name = row.try_get("full_name").map_err(decode)?;
        identity.email = row.try_get("email").map_err(decode)?;
        identity.is_admin = row.try_get("is_admin").map_err(decode)?;

        identity.roles = user_roles(&mut *conn, [id.get()])
            .await?
            .remove(&id.get())
            .unwrap_or_default();
        Ok(identity)
    }
}

/// In-memory identity store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    inner: RwLock<HashMap<UserId, Identity>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; the next fetch sees the new roles.
    pub fn upsert(&self, identity: Identity) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(identity.id, identity);
    }

    /// Deactivate a user.
    pub fn remove(&self, id: UserId) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.remove(&id);
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn fetch_identity(&self, id: UserId) -> Result<Identity, IdentityError> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(&id).cloned().ok_or(IdentityError::NotFound)
    }
}
