//! Binding between a table and its row type.

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{Arguments, FromRow, PgConnection};

use supplydesk_core::Entity;
use supplydesk_query::BindValue;

use crate::error::PersistenceError;

/// A row type backed by one table.
///
/// `preload` runs after a page of rows has been fetched, on the same
/// connection, to fill associations that are not columns of `TABLE`.
#[async_trait]
pub trait Record: Entity + for<'r> FromRow<'r, PgRow> + Send + Sync + Unpin + Sized + 'static {
    const TABLE: &'static str;

    async fn preload(_conn: &mut PgConnection, _rows: &mut [Self]) -> Result<(), PersistenceError> {
        Ok(())
    }
}

/// Encode plan binds in `$n` order.
pub(crate) fn arguments(binds: &[BindValue]) -> Result<PgArguments, PersistenceError> {
    let mut args = PgArguments::default();
    for bind in binds {
        let added = match bind {
            BindValue::Text(s) => args.add(s.clone()),
            BindValue::Integer(i) => args.add(*i),
            BindValue::Boolean(b) => args.add(*b),
            BindValue::Date(d) => args.add(*d),
        };
        added.map_err(|e| PersistenceError::new("bind", sqlx::Error::Encode(e)))?;
    }
    Ok(args)
}

/// Distinct ids in first-seen order, for `= ANY($1)` lookups.
pub(crate) fn distinct_ids(ids: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let mut out: Vec<i64> = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
