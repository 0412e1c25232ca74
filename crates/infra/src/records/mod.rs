//! Row types, their key registries and association loaders.

pub mod contracts;
pub mod permissions;
pub mod roles;
pub mod users;

use std::collections::HashMap;

use sqlx::PgConnection;

use supplydesk_auth::{Permission, Role};
use supplydesk_core::{PermissionId, RoleId};

use crate::error::PersistenceError;
use crate::record::distinct_ids;

pub use contracts::Contract;
pub use permissions::PermissionRecord;
pub use roles::RoleRecord;
pub use users::{OrgRef, User};

pub(crate) async fn org_names(
    conn: &mut PgConnection,
    ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, String>, PersistenceError> {
    let ids = distinct_ids(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i64, String)> = sqlx::query_as(r#"SELECT "id", "name" FROM "orgs" WHERE "id" = ANY($1)"#)
        .bind(ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| PersistenceError::new("orgs.names", e))?;
    Ok(rows.into_iter().collect())
}

/// Permissions granted to each role, ordered by permission id.
pub(crate) async fn role_permissions(
    conn: &mut PgConnection,
    role_ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, Vec<PermissionRecord>>, PersistenceError> {
    let role_ids = distinct_ids(role_ids);
    let mut out: HashMap<i64, Vec<PermissionRecord>> = HashMap::new();
    if role_ids.is_empty() {
        return Ok(out);
    }
    let rows: Vec<(i64, i64, String)> = sqlx::query_as(
        r#"
        SELECT pr."role_id", p."id", p."name"
        FROM "permissions" p
        INNER JOIN "permission_role" pr ON pr."permission_id" = p."id"
        WHERE pr."role_id" = ANY($1)
        ORDER BY pr."role_id", p."id"
        "#,
    )
    .bind(role_ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| PersistenceError::new("roles.permissions", e))?;

    for (role_id, id, name) in rows {
        out.entry(role_id).or_default().push(PermissionRecord { id: PermissionId::new(id), name });
    }
    Ok(out)
}

/// Active role assignments of each user, ordered by role id, with their
/// permissions loaded. Inactive roles grant nothing and are left out.
pub(crate) async fn user_roles(
    conn: &mut PgConnection,
    user_ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, Vec<Role>>, PersistenceError> {
    let user_ids = distinct_ids(user_ids);
    let mut out: HashMap<i64, Vec<Role>> = HashMap::new();
    if user_ids.is_empty() {
        return Ok(out);
    }
    let rows: Vec<(i64, i64, String)> = sqlx::query_as(
        r#"
        SELECT ur."user_id", r."id", r."name"
        FROM "roles" r
        INNER JOIN "user_role" ur ON ur."role_id" = r."id"
        WHERE ur."user_id" = ANY($1) AND ur."status" = TRUE AND r."status" = TRUE
        ORDER BY ur."user_id", r."id"
        "#,
    )
    .bind(user_ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| PersistenceError::new("users.roles", e))?;

    let permissions = role_permissions(conn, rows.iter().map(|(_, role_id, _)| *role_id)).await?;
    for (user_id, role_id, name) in rows {
        let granted = permissions
            .get(&role_id)
            .map(|ps| {
                ps.iter()
                    .map(|p| Permission::with_id(p.id, p.name.clone()))
                    .collect()
            })
            .unwrap_or_default();
        out.entry(user_id)
            .or_default()
            .push(Role::new(RoleId::new(role_id), name, granted));
    }
    Ok(out)
}
