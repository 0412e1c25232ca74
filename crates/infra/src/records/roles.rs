use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgConnection, Row};

use supplydesk_core::{Entity, RoleId};
use supplydesk_query::{KeyRegistry, ValueKind};

use crate::error::PersistenceError;
use crate::record::{distinct_ids, Record};

use super::PermissionRecord;

pub const ACCEPTED_FILTER_KEYS: &[&str] = &["name", "status"];

/// A role with its permission catalog and the count of active holders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleRecord {
    pub id: RoleId,
    pub name: String,
    pub status: bool,
    pub permissions: Vec<PermissionRecord>,
    pub total_users: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<'r> FromRow<'r, PgRow> for RoleRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: RoleId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            status: row.try_get("status")?,
            permissions: Vec::new(),
            total_users: 0,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl Entity for RoleRecord {
    type Id = RoleId;

    fn id(&self) -> RoleId {
        self.id
    }
}

#[async_trait]
impl Record for RoleRecord {
    const TABLE: &'static str = "roles";

    async fn preload(conn: &mut PgConnection, rows: &mut [Self]) -> Result<(), PersistenceError> {
        let ids = distinct_ids(rows.iter().map(|r| r.id.get()));
        if ids.is_empty() {
            return Ok(());
        }
        let mut permissions = super::role_permissions(&mut *conn, ids.iter().copied()).await?;
        let counts: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT "role_id", COUNT(*)
            FROM "user_role"
            WHERE "role_id" = ANY($1) AND "status" = TRUE
            GROUP BY "role_id"
            "#,
        )
        .bind(ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| PersistenceError::new("roles.total_users", e))?;

        for role in rows.iter_mut() {
            role.permissions = permissions.remove(&role.id.get()).unwrap_or_default();
            role.total_users = counts
                .iter()
                .find(|(id, _)| *id == role.id.get())
                .map(|(_, n)| *n)
                .unwrap_or(0);
        }
        Ok(())
    }
}

pub fn registry() -> KeyRegistry {
    KeyRegistry::builder(RoleRecord::TABLE)
        .typed("id", ValueKind::Integer)
        .typed("status", ValueKind::Boolean)
        .build()
}
