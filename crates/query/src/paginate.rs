//! Offset/limit/order scope and the paginated response envelope.

use serde::Serialize;

use crate::plan::{OrderBy, SelectPlan};
use crate::scope::Scope;

/// Paging scope; independent of any filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginate {
    limit: i64,
    offset: i64,
    order: OrderBy,
}

impl Paginate {
    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn order(&self) -> &OrderBy {
        &self.order
    }
}

/// Build a paging scope. `offset` is a row offset: callers holding a page
/// index multiply by `limit` first (see `ListRequest::row_offset`).
///
/// A sort expression that is not `column [asc|desc]` falls back to `id desc`.
pub fn paginate(limit: i64, offset: i64, sort: &str) -> Paginate {
    let order = OrderBy::parse(sort).unwrap_or_else(|| OrderBy {
        column: "id".to_string(),
        descending: true,
    });
    Paginate {
        limit,
        offset,
        order,
    }
}

impl Scope for Paginate {
    fn apply(&self, plan: &mut SelectPlan) {
        plan.set_offset(self.offset);
        plan.set_limit(self.limit);
        plan.set_order(self.order.clone());
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub offset: i64,
    pub limit: i64,
    pub sort: String,
    pub total: i64,
    #[serde(rename = "total_page")]
    pub total_pages: i64,
    pub list: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(offset: i64, limit: i64, sort: impl Into<String>, total: i64, list: Vec<T>) -> Self {
        Self {
            offset,
            limit,
            sort: sort.into(),
            total,
            total_pages: total_pages(total, limit),
            list,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            offset: self.offset,
            limit: self.limit,
            sort: self.sort,
            total: self.total,
            total_pages: self.total_pages,
            list: self.list.into_iter().map(f).collect(),
        }
    }
}

/// `ceil(total / limit)`; zero when there is nothing to page.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    total / limit + i64::from(total % limit != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ListRequest;
    use proptest::prelude::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(21, 10), 3);
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(0, 10), 0);
    }

    #[test]
    fn total_pages_survives_the_largest_limit() {
        let mut req = ListRequest { limit: i64::MAX, ..ListRequest::default() };
        req.ensure_default();
        let page = Page::new(req.offset, req.limit, req.sort, 5, vec![1, 2, 3, 4, 5]);
        assert_eq!(page.total_pages, 1);
        assert_eq!(total_pages(i64::MAX, i64::MAX), 1);
        assert_eq!(total_pages(i64::MAX, 2), i64::MAX / 2 + 1);
    }

    #[test]
    fn paginate_applies_offset_limit_and_order() {
        let mut plan = SelectPlan::new("roles");
        plan.apply(&paginate(10, 30, "id desc"));
        assert_eq!(
            plan.to_select_sql().0,
            r#"SELECT "roles".* FROM "roles" ORDER BY "roles"."id" DESC LIMIT 10 OFFSET 30"#
        );
    }

    #[test]
    fn unsafe_sort_falls_back_to_default() {
        let scope = paginate(10, 0, "id; DELETE FROM roles");
        assert_eq!(scope.order().column, "id");
        assert!(scope.order().descending);
    }

    #[test]
    fn page_serializes_total_page() {
        let page = Page::new(0, 10, "id desc", 21, vec![1, 2, 3]);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["total_page"], 3);
        assert_eq!(json["list"].as_array().unwrap().len(), 3);
    }

    proptest! {
        #[test]
        fn row_offset_is_page_times_limit(limit in 1i64..500, page in 0i64..10_000) {
            let req = ListRequest { limit, offset: page, ..ListRequest::default() };
            let scope = paginate(req.limit, req.row_offset(), &req.sort);
            prop_assert_eq!(scope.offset(), page * limit);
        }

        #[test]
        fn total_pages_matches_ceiling(total in 0i64..1_000_000, limit in 1i64..1_000) {
            let expected = (total as f64 / limit as f64).ceil() as i64;
            prop_assert_eq!(total_pages(total, limit), expected);
        }
    }
}
