//! Filter descriptors → joins + conjunctive predicates.
//!
//! Malformed filters are dropped, never reported: a list endpoint keeps
//! answering when one filter out of several is unusable. Dropped filters are
//! logged at `debug`.

use std::sync::Arc;

use tracing::debug;

use crate::filter::Filter;
use crate::plan::{is_safe_path, Predicate, SelectPlan};
use crate::registry::{JoinSpec, KeyRegistry};

/// A composable transformation of a [`SelectPlan`].
///
/// Scopes append to the plan; applying one twice to the same plan appends
/// twice. Build a fresh plan per query.
pub trait Scope {
    fn apply(&self, plan: &mut SelectPlan);
}

/// Result of [`build_scope`]: deduplicated joins followed by predicates.
#[derive(Debug, Clone, Default)]
pub struct FilterScope {
    joins: Vec<Arc<JoinSpec>>,
    predicates: Vec<Predicate>,
}

impl FilterScope {
    /// The scope that changes nothing.
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn is_identity(&self) -> bool {
        self.joins.is_empty() && self.predicates.is_empty()
    }

    pub fn joins(&self) -> &[Arc<JoinSpec>] {
        &self.joins
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }
}

impl Scope for FilterScope {
    fn apply(&self, plan: &mut SelectPlan) {
        for join in &self.joins {
            plan.push_join(join.clause());
            if join.fans_out() {
                plan.set_distinct();
            }
        }
        for predicate in &self.predicates {
            plan.push_predicate(predicate.clone());
        }
    }
}

/// Resolve `filters` against `registry`.
///
/// Joins from every surviving filter are collected before any predicate is
/// emitted, so predicate order never matters. A join shared (same `Arc`) by
/// several keys is applied once.
pub fn build_scope(filters: &[Filter], registry: &KeyRegistry) -> FilterScope {
    let mut scope = FilterScope::identity();

    for filter in filters {
        let Some(operator) = filter.operator() else {
            debug!(entity = registry.entity(), key = %filter.key, operator = %filter.operator, "dropping filter: unknown operator");
            continue;
        };
        if filter.key.is_empty() {
            debug!(entity = registry.entity(), "dropping filter: empty key");
            continue;
        }

        let column = registry.actual_key(&filter.key);
        if !is_safe_path(column) {
            debug!(entity = registry.entity(), key = %filter.key, "dropping filter: key is not a column path");
            continue;
        }

        let Some(value) = registry
            .value_kind(&filter.key)
            .bind(operator.bind_value(&filter.value))
        else {
            debug!(entity = registry.entity(), key = %filter.key, "dropping filter: value does not fit column type");
            continue;
        };

        for join in registry.joins_for(&filter.key) {
            if !scope.joins.iter().any(|seen| Arc::ptr_eq(seen, join)) {
                scope.joins.push(Arc::clone(join));
            }
        }

        scope.predicates.push(Predicate {
            column: column.to_string(),
            operator,
            value,
        });
    }

    scope
}
