//! Supply contracts.
//!
//! Each contract belongs to a supply vendor organization
//! (`supply_vendor_id`), which is also the column row scoping narrows on.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgConnection, Row};

use supplydesk_core::{ContractId, Entity, OrgId};
use supplydesk_query::{JoinSpec, KeyRegistry, ValueKind};

use crate::error::PersistenceError;
use crate::record::Record;

/// Filter keys clients may send on the contract list.
pub const ACCEPTED_FILTER_KEYS: &[&str] = &["code", "start_date", "end_date", "supply_vendor_name"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contract {
    pub id: ContractId,
    #[serde(skip)]
    pub supply_vendor_id: OrgId,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub base_amount: i32,
    pub actual_amount: i32,
    pub code: String,
    /// Filled by [`Record::preload`].
    pub supply_vendor_name: String,
}

impl<'r> FromRow<'r, PgRow> for Contract {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: ContractId::new(row.try_get("id")?),
            supply_vendor_id: OrgId::new(row.try_get("supply_vendor_id")?),
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            base_amount: row.try_get("base_amount")?,
            actual_amount: row.try_get("actual_amount")?,
            code: row.try_get("code")?,
            supply_vendor_name: String::new(),
        })
    }
}

impl Entity for Contract {
    type Id = ContractId;

    fn id(&self) -> ContractId {
        self.id
    }
}

#[async_trait]
impl Record for Contract {
    const TABLE: &'static str = "contracts";

    async fn preload(conn: &mut PgConnection, rows: &mut [Self]) -> Result<(), PersistenceError> {
        let names = super::org_names(conn, rows.iter().map(|c| c.supply_vendor_id.get())).await?;
        for contract in rows.iter_mut() {
            if let Some(name) = names.get(&contract.supply_vendor_id.get()) {
                contract.supply_vendor_name = name.clone();
            }
        }
        Ok(())
    }
}

pub fn registry() -> KeyRegistry {
    let vendor = JoinSpec::new(r#"INNER JOIN "orgs" ON "contracts"."supply_vendor_id" = "orgs"."id""#);
    KeyRegistry::builder(Contract::TABLE)
        .map_key("supply_vendor_name", "orgs.name")
        .require_joins("supply_vendor_name", &[vendor])
        .typed("id", ValueKind::Integer)
        .typed("supply_vendor_id", ValueKind::Integer)
        .typed("base_amount", ValueKind::Integer)
        .typed("actual_amount", ValueKind::Integer)
        .typed("start_date", ValueKind::Date)
        .typed("end_date", ValueKind::Date)
        .build()
}
