//! Administrative writes on users: role assignment and activation.
//!
//! Both writes take effect on the affected user's next request, since
//! identities are hydrated per request.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};

use supplydesk_core::{RoleId, UserId};

use crate::error::{PersistenceError, RepoError};
use crate::record::distinct_ids;

#[async_trait]
pub trait UserAdmin: Send + Sync {
    /// Make `roles` the user's active role set; `full_name` renames as well.
    /// An empty `roles` leaves assignments untouched.
    async fn assign_roles(&self, user: UserId, roles: Vec<RoleId>, full_name: Option<String>) -> Result<(), RepoError>;

    /// Activate or deactivate a user account.
    async fn set_active(&self, user: UserId, active: bool) -> Result<(), RepoError>;
}

/// Assignment rows to touch so that exactly `wanted` ends up active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleChanges {
    pub insert: Vec<i64>,
    pub activate: Vec<i64>,
    pub deactivate: Vec<i64>,
}

impl RoleChanges {
    /// `existing` holds every assigned role id, active or not.
    pub fn between(existing: &[i64], wanted: &[i64]) -> Self {
        let existing = distinct_ids(existing.iter().copied());
        let wanted = distinct_ids(wanted.iter().copied());

        let (activate, insert): (Vec<i64>, Vec<i64>) = wanted.into_iter().partition(|id| existing.contains(id));
        let deactivate = existing
            .into_iter()
            .filter(|id| !activate.contains(id))
            .collect();
        Self {
            insert,
            activate,
            deactivate,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.insert.is_empty() && self.activate.is_empty() && self.deactivate.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct PgUserAdmin {
    pool: PgPool,
}

impl PgUserAdmin {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserAdmin for PgUserAdmin {
    #[instrument(skip(self, full_name), fields(user_id = %user), err)]
    async fn assign_roles(&self, user: UserId, roles: Vec<RoleId>, full_name: Option<String>) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PersistenceError::new("begin", e))?;

        let found: Option<i64> = sqlx::query_scalar(r#"SELECT "id" FROM "users" WHERE "id" = $1 FOR UPDATE"#)
            .bind(user.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| PersistenceError::new("users.lock", e))?;
        if found.is_none() {
            return Err(RepoError::NotFound);
        }

        let wanted = distinct_ids(roles.into_iter().map(i64::from));
        if !wanted.is_empty() {
            let known: Vec<i64> = sqlx::query_scalar(r#"SELECT "id" FROM "roles" WHERE "id" = ANY($1)"#)
                .bind(&wanted[..])
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| PersistenceError::new("roles.exist", e))?;
            if let Some(missing) = wanted.iter().find(|id| !known.contains(id)) {
                return Err(RepoError::Rejected(format!("role_ids: role {missing} does not exist")));
            }

            let existing: Vec<i64> = sqlx::query_scalar(r#"SELECT "role_id" FROM "user_role" WHERE "user_id" = $1"#)
                .bind(user.get())
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| PersistenceError::new("user_role.load", e))?;

            let changes = RoleChanges::between(&existing, &wanted);
            if !changes.insert.is_empty() {
                sqlx::query(
                    r#"
                    INSERT INTO "user_role" ("user_id", "role_id", "status")
                    SELECT $1, UNNEST($2::BIGINT[]), TRUE
                    "#,
                )
                .bind(user.get())
                .bind(&changes.insert[..])
                .execute(&mut *tx)
                .await
                .map_err(|e| PersistenceError::new("user_role.insert", e))?;
            }
            set_assignment_status(&mut *tx, user, &changes.activate, true).await?;
            set_assignment_status(&mut *tx, user, &changes.deactivate, false).await?;
            info!(
                inserted = changes.insert.len(),
                activated = changes.activate.len(),
                deactivated = changes.deactivate.len(),
                "roles assigned"
            );
        }

        if let Some(full_name) = full_name {
            sqlx::query(r#"UPDATE "users" SET "full_name" = $2, "updated_at" = NOW() WHERE "id" = $1"#)
                .bind(user.get())
                .bind(full_name)
                .execute(&mut *tx)
                .await
                .map_err(|e| PersistenceError::new("users.rename", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| PersistenceError::new("commit", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %user), err)]
    async fn set_active(&self, user: UserId, active: bool) -> Result<(), RepoError> {
        let done = sqlx::query(r#"UPDATE "users" SET "status" = $2, "updated_at" = NOW() WHERE "id" = $1"#)
            .bind(user.get())
            .bind(active)
            .execute(&self.pool)
            .await
            .map_err(|e| PersistenceError::new("users.status", e))?;
        if done.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        info!(active, "user status changed");
        Ok(())
    }
}

async fn set_assignment_status(
    conn: &mut PgConnection,
    user: UserId,
    role_ids: &[i64],
    active: bool,
) -> Result<(), PersistenceError> {
    if role_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(r#"UPDATE "user_role" SET "status" = $3 WHERE "user_id" = $1 AND "role_id" = ANY($2)"#)
        .bind(user.get())
        .bind(role_ids)
        .bind(active)
        .execute(&mut *conn)
        .await
        .map_err(|e| PersistenceError::new("user_role.status", e))?;
    Ok(())
}
