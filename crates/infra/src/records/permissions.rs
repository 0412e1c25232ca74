use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use supplydesk_core::{Entity, PermissionId};

use crate::record::Record;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionRecord {
    pub id: PermissionId,
    pub name: String,
}

impl<'r> FromRow<'r, PgRow> for PermissionRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: PermissionId::new(row.try_get("id")?),
            name: row.try_get("name")?,
        })
    }
}

impl Entity for PermissionRecord {
    type Id = PermissionId;

    fn id(&self) -> PermissionId {
        self.id
    }
}

impl Record for PermissionRecord {
    const TABLE: &'static str = "permissions";
}
