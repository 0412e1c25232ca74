//! User accounts as listed by the user directory.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgConnection, Row};

use supplydesk_auth::Role;
use supplydesk_core::{Entity, OrgId, UserId};
use supplydesk_query::{JoinSpec, KeyRegistry, ValueKind};

use crate::error::PersistenceError;
use crate::record::Record;

pub const ACCEPTED_FILTER_KEYS: &[&str] = &["full_name", "email", "org_name", "role_name", "role_id"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrgRef {
    pub id: OrgId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub is_admin: bool,
    pub status: bool,
    #[serde(skip)]
    pub org_id: OrgId,
    #[serde(rename = "orgs")]
    pub org: Option<OrgRef>,
    pub roles: Vec<Role>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: UserId::new(row.try_get("id")?),
            full_name: row.try_get("full_name")?,
            email: row.try_get("email")?,
            is_admin: row.try_get("is_admin")?,
            status: row.try_get("status")?,
            org_id: OrgId::new(row.try_get("org_id")?),
            org: None,
            roles: Vec::new(),
            last_login: row.try_get("last_login")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

#[async_trait]
impl Record for User {
    const TABLE: &'static str = "users";

    async fn preload(conn: &mut PgConnection, rows: &mut [Self]) -> Result<(), PersistenceError> {
        let orgs = super::org_names(&mut *conn, rows.iter().map(|u| u.org_id.get())).await?;
        let mut roles = super::user_roles(&mut *conn, rows.iter().map(|u| u.id.get())).await?;
        for user in rows.iter_mut() {
            user.org = orgs.get(&user.org_id.get()).map(|name| OrgRef {
                id: user.org_id,
                name: name.clone(),
            });
            user.roles = roles.remove(&user.id.get()).unwrap_or_default();
        }
        Ok(())
    }
}

/// `org_name` and `role_name` share one orgs join; filtering on both joins
/// `orgs` once.
pub fn registry() -> KeyRegistry {
    let orgs = JoinSpec::new(r#"INNER JOIN "orgs" ON "users"."org_id" = "orgs"."id""#);
    let roles = JoinSpec::new(r#"INNER JOIN "roles" ON "orgs"."type" = "roles"."id""#);
    let assignments = JoinSpec::one_to_many(
        r#"INNER JOIN "user_role" ON "user_role"."user_id" = "users"."id" AND "user_role"."status" = TRUE"#,
    );
    KeyRegistry::builder(User::TABLE)
        .map_key("org_name", "orgs.name")
        .require_joins("org_name", &[Arc::clone(&orgs)])
        .map_key("role_name", "roles.name")
        .require_joins("role_name", &[orgs, roles])
        .map_key("role_id", "user_role.role_id")
        .require_joins("role_id", &[assignments])
        .typed("role_id", ValueKind::Integer)
        .typed("id", ValueKind::Integer)
        .typed("status", ValueKind::Boolean)
        .build()
}
