//! Per-entity mapping from public filter keys to queryable columns.
//!
//! A registry is assembled once at startup through [`KeyRegistryBuilder`] and
//! is immutable afterwards; share it behind an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::plan::BindValue;

/// A join clause needed to make some column reachable.
///
/// Identity matters: two filters requiring the *same* `Arc<JoinSpec>` get one
/// join; two separately allocated specs with identical text get two.
#[derive(Debug, PartialEq, Eq)]
pub struct JoinSpec {
    clause: String,
    fans_out: bool,
}

impl JoinSpec {
    /// A join matching at most one row per base row.
    pub fn new(clause: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            clause: clause.into(),
            fans_out: false,
        })
    }

    /// A join that can match several rows per base row. Plans using it
    /// select and count distinct base rows.
    pub fn one_to_many(clause: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            clause: clause.into(),
            fans_out: true,
        })
    }

    pub fn clause(&self) -> &str {
        &self.clause
    }

    pub fn fans_out(&self) -> bool {
        self.fans_out
    }
}

/// SQL type a filter value is bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueKind {
    #[default]
    Text,
    Integer,
    Boolean,
    /// `YYYY-MM-DD`
    Date,
}

impl ValueKind {
    /// Convert an (already operator-transformed) value; `None` if it does not parse.
    pub fn bind(&self, value: String) -> Option<BindValue> {
        match self {
            ValueKind::Text => Some(BindValue::Text(value)),
            ValueKind::Integer => value.trim().parse::<i64>().ok().map(BindValue::Integer),
            ValueKind::Boolean => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(BindValue::Boolean(true)),
                "false" | "0" => Some(BindValue::Boolean(false)),
                _ => None,
            },
            ValueKind::Date => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                .ok()
                .map(BindValue::Date),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct KeyEntry {
    actual: Option<String>,
    joins: Vec<Arc<JoinSpec>>,
    kind: ValueKind,
}

/// Frozen key registry for one entity.
#[derive(Debug, Clone)]
pub struct KeyRegistry {
    entity: String,
    entries: HashMap<String, KeyEntry>,
}

impl KeyRegistry {
    pub fn builder(entity: impl Into<String>) -> KeyRegistryBuilder {
        KeyRegistryBuilder {
            entity: entity.into(),
            entries: HashMap::new(),
        }
    }

    /// Registry with no mappings: every key filters its own column as text.
    pub fn empty(entity: impl Into<String>) -> Self {
        Self::builder(entity).build()
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Column path for a public key, defaulting to the key itself.
    pub fn actual_key<'a>(&'a self, public: &'a str) -> &'a str {
        self.entries
            .get(public)
            .and_then(|e| e.actual.as_deref())
            .unwrap_or(public)
    }

    /// Joins required before `public` can be filtered on, in registration order.
    pub fn joins_for(&self, public: &str) -> &[Arc<JoinSpec>] {
        self.entries
            .get(public)
            .map(|e| e.joins.as_slice())
            .unwrap_or(&[])
    }

    pub fn value_kind(&self, public: &str) -> ValueKind {
        self.entries.get(public).map(|e| e.kind).unwrap_or_default()
    }
}

/// Startup-time builder for a [`KeyRegistry`].
#[derive(Debug)]
pub struct KeyRegistryBuilder {
    entity: String,
    entries: HashMap<String, KeyEntry>,
}

impl KeyRegistryBuilder {
    /// Map a public key onto a (possibly joined) column path, e.g. `orgs.name`.
    pub fn map_key(mut self, public: &str, actual: &str) -> Self {
        self.entries.entry(public.to_string()).or_default().actual = Some(actual.to_string());
        self
    }

    /// Joins to apply whenever `public` is filtered on. Replaces earlier joins for the key.
    pub fn require_joins(mut self, public: &str, joins: &[Arc<JoinSpec>]) -> Self {
        self.entries.entry(public.to_string()).or_default().joins = joins.to_vec();
        self
    }

    /// Bind values for `public` with the given SQL type.
    pub fn typed(mut self, public: &str, kind: ValueKind) -> Self {
        self.entries.entry(public.to_string()).or_default().kind = kind;
        self
    }

    pub fn build(self) -> KeyRegistry {
        KeyRegistry {
            entity: self.entity,
            entries: self.entries,
        }
    }
}
