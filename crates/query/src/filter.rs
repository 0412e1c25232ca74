//! Caller-supplied list parameters.

use serde::{Deserialize, Serialize};

use supplydesk_core::DomainError;

use crate::operator::Operator;

/// Page size used when the caller sends none (or a non-positive one).
pub const DEFAULT_LIMIT: i64 = 10;

/// Ordering applied to every list request.
pub const DEFAULT_SORT: &str = "id desc";

/// A single `(key, operator, value)` filter descriptor.
///
/// The operator is kept as the raw wire token: unknown operators must reach
/// the scope builder, which drops the filter instead of failing the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub key: String,
    pub operator: String,
    pub value: String,
}

impl Filter {
    pub fn new(key: impl Into<String>, operator: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// Equality filter, the shape used by row scoping.
    pub fn eq(key: impl Into<String>, value: impl ToString) -> Self {
        Self::new(key, Operator::Eq.token(), value.to_string())
    }

    pub fn operator(&self) -> Option<Operator> {
        Operator::parse(&self.operator)
    }
}

/// Generic list request: paging, ordering and filters.
///
/// `offset` is a page index; the row offset is `offset * limit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListRequest {
    pub limit: i64,
    pub offset: i64,
    pub sort: String,
    pub filters: Vec<Filter>,
}

impl Default for ListRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            sort: DEFAULT_SORT.to_string(),
            filters: Vec::new(),
        }
    }
}

impl ListRequest {
    pub fn with_filters(filters: Vec<Filter>) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    /// Normalize paging in place.
    ///
    /// The sort is always reset to [`DEFAULT_SORT`], whatever the client sent.
    pub fn ensure_default(&mut self) {
        if self.limit <= 0 {
            self.limit = DEFAULT_LIMIT;
        }
        if self.offset < 0 {
            self.offset = 0;
        }
        self.sort = DEFAULT_SORT.to_string();
    }

    /// Row offset for the page index carried in `offset`.
    pub fn row_offset(&self) -> i64 {
        self.offset.saturating_mul(self.limit)
    }

    /// Reject filters on keys the endpoint does not expose.
    ///
    /// Only keys are checked; operators and values stay lenient.
    pub fn check_keys(&self, accepted: &[&str]) -> Result<(), DomainError> {
        if accepted.is_empty() {
            return Ok(());
        }
        for (idx, filter) in self.filters.iter().enumerate() {
            if !accepted.contains(&filter.key.as_str()) {
                return Err(DomainError::validation(format!(
                    "filters.{idx}.key: not support for value '{}'",
                    filter.key
                )));
            }
        }
        Ok(())
    }
}
