//! Generic list/get over one [`Record`] table.
//!
//! The repository never opens or ends transactions; callers pass the
//! connection (usually a transaction) to run on.

use std::marker::PhantomData;
use std::sync::Arc;

use sqlx::PgConnection;
use tracing::{debug, instrument};

use supplydesk_query::plan::{OrderBy, Predicate};
use supplydesk_query::{
    build_scope, paginate, BindValue, Filter, FilterScope, KeyRegistry, ListRequest, Operator,
    Paginate, SelectPlan,
};

use crate::error::{PersistenceError, RepoError};
use crate::record::{arguments, Record};

pub struct Repository<E> {
    registry: Arc<KeyRegistry>,
    _record: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            _record: PhantomData,
        }
    }
}

impl<E: Record> Repository<E> {
    pub fn new(registry: Arc<KeyRegistry>) -> Self {
        Self {
            registry,
            _record: PhantomData,
        }
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    pub fn filter(&self, filters: &[Filter]) -> FilterScope {
        build_scope(filters, &self.registry)
    }

    pub fn paginate(&self, request: &ListRequest) -> Paginate {
        paginate(request.limit, request.row_offset(), &request.sort)
    }

    /// Filtered and paged plan for `request`. Its count rendering ignores
    /// paging, so both statements see the same rows.
    pub fn list_plan(&self, request: &ListRequest) -> SelectPlan {
        let mut plan = SelectPlan::new(E::TABLE);
        plan.apply(&self.filter(&request.filters))
            .apply(&self.paginate(request));
        plan
    }

    /// Plan for one row by id, narrowed by `filters`.
    pub fn get_plan(&self, id: i64, filters: &[Filter]) -> SelectPlan {
        let mut plan = SelectPlan::new(E::TABLE);
        plan.apply(&self.filter(filters));
        plan.push_predicate(Predicate {
            column: "id".to_string(),
            operator: Operator::Eq,
            value: BindValue::Integer(id),
        });
        plan.set_limit(1);
        plan
    }

    #[instrument(skip_all, fields(table = E::TABLE, limit = request.limit, offset = request.offset), err)]
    pub async fn list(
        &self,
        conn: &mut PgConnection,
        request: &ListRequest,
    ) -> Result<(Vec<E>, i64), PersistenceError> {
        let plan = self.list_plan(request);

        let (count_sql, binds) = plan.to_count_sql();
        debug!(sql = %count_sql, binds = binds.len(), "count");
        let total: i64 = sqlx::query_scalar_with(&count_sql, arguments(&binds)?)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| PersistenceError::new("list.count", e))?;

        let (select_sql, binds) = plan.to_select_sql();
        debug!(sql = %select_sql, binds = binds.len(), "select");
        let mut rows: Vec<E> = sqlx::query_as_with(&select_sql, arguments(&binds)?)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| PersistenceError::new("list.select", e))?;

        E::preload(conn, &mut rows).await?;
        Ok((rows, total))
    }

    #[instrument(skip_all, fields(table = E::TABLE, id = ?id), err)]
    pub async fn get(&self, conn: &mut PgConnection, id: E::Id, filters: &[Filter]) -> Result<E, RepoError> {
        let (sql, binds) = self.get_plan(id.into(), filters).to_select_sql();
        let row: Option<E> = sqlx::query_as_with(&sql, arguments(&binds)?)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| PersistenceError::new("get", e))?;

        let mut rows: Vec<E> = row.into_iter().collect();
        E::preload(conn, &mut rows).await?;
        rows.pop().ok_or(RepoError::NotFound)
    }

    /// Every row ordered by id, unpaged. For small catalogs only.
    #[instrument(skip_all, fields(table = E::TABLE), err)]
    pub async fn all(&self, conn: &mut PgConnection) -> Result<Vec<E>, PersistenceError> {
        let mut plan = SelectPlan::new(E::TABLE);
        plan.set_order(OrderBy {
            column: "id".to_string(),
            descending: false,
        });
        let (sql, _) = plan.to_select_sql();
        let mut rows: Vec<E> = sqlx::query_as(&sql)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| PersistenceError::new("all", e))?;
        E::preload(conn, &mut rows).await?;
        Ok(rows)
    }
}
