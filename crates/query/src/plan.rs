//! A minimal select plan that renders parameterized Postgres SQL.
//!
//! Scopes mutate a plan; the plan renders a count statement and a select
//! statement sharing the same `FROM ... WHERE ...` section and binds.
//! Client values only ever appear as `$n` parameters.

use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::operator::Operator;
use crate::scope::Scope;

/// A value bound to a `$n` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Date(NaiveDate),
}

/// `column operator $n`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: String,
    pub operator: Operator,
    pub value: BindValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

impl OrderBy {
    /// Parse `column [asc|desc]`; anything else is rejected.
    pub fn parse(sort: &str) -> Option<Self> {
        let mut parts = sort.split_whitespace();
        let column = parts.next()?;
        let descending = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => false,
            Some("desc") => true,
            Some(_) => return None,
        };
        if parts.next().is_some() || !is_safe_path(column) {
            return None;
        }
        Some(Self {
            column: column.to_string(),
            descending,
        })
    }
}

/// `ident` or `table.ident`, ASCII identifiers only.
pub fn is_safe_path(path: &str) -> bool {
    let mut segments = 0;
    for segment in path.split('.') {
        segments += 1;
        if segments > 2 || !is_ident(segment) {
            return false;
        }
    }
    segments > 0
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectPlan {
    table: String,
    joins: Vec<String>,
    distinct: bool,
    predicates: Vec<Predicate>,
    order: Option<OrderBy>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl SelectPlan {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            joins: Vec::new(),
            distinct: false,
            predicates: Vec::new(),
            order: None,
            limit: None,
            offset: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn joins(&self) -> &[String] {
        &self.joins
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn order(&self) -> Option<&OrderBy> {
        self.order.as_ref()
    }

    pub fn limit(&self) -> Option<i64> {
        self.limit
    }

    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// Apply a scope; chainable.
    pub fn apply(&mut self, scope: &dyn Scope) -> &mut Self {
        scope.apply(self);
        self
    }

    pub fn push_join(&mut self, clause: impl Into<String>) {
        self.joins.push(clause.into());
    }

    /// Each base row appears once however many joined rows match it.
    pub fn set_distinct(&mut self) {
        self.distinct = true;
    }

    pub fn push_predicate(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    pub fn set_order(&mut self, order: OrderBy) {
        self.order = Some(order);
    }

    pub fn set_limit(&mut self, limit: i64) {
        self.limit = Some(limit);
    }

    pub fn set_offset(&mut self, offset: i64) {
        self.offset = Some(offset);
    }

    /// `SELECT COUNT(*)` under the plan's joins and predicates; paging is ignored.
    /// Distinct plans count distinct base ids.
    pub fn to_count_sql(&self) -> (String, Vec<BindValue>) {
        let (from_where, binds) = self.from_where();
        let counted = if self.distinct {
            format!("DISTINCT {}", self.quote_column("id"))
        } else {
            "*".to_string()
        };
        (format!("SELECT COUNT({counted}) {from_where}"), binds)
    }

    /// `SELECT "table".*` with ordering and paging applied.
    pub fn to_select_sql(&self) -> (String, Vec<BindValue>) {
        let (from_where, binds) = self.from_where();
        let mut sql = format!(
            "SELECT {}{}.* {from_where}",
            if self.distinct { "DISTINCT " } else { "" },
            quote_ident(&self.table)
        );
        if let Some(order) = &self.order {
            let _ = write!(
                sql,
                " ORDER BY {} {}",
                self.quote_column(&order.column),
                if order.descending { "DESC" } else { "ASC" }
            );
        }
        if let Some(limit) = self.limit {
            let _ = write!(sql, " LIMIT {limit}");
        }
        if let Some(offset) = self.offset {
            let _ = write!(sql, " OFFSET {offset}");
        }
        (sql, binds)
    }

    fn from_where(&self) -> (String, Vec<BindValue>) {
        let mut sql = format!("FROM {}", quote_ident(&self.table));
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        let mut binds = Vec::with_capacity(self.predicates.len());
        for (idx, predicate) in self.predicates.iter().enumerate() {
            sql.push_str(if idx == 0 { " WHERE " } else { " AND " });
            let _ = write!(
                sql,
                "{} {} ${}",
                self.quote_column(&predicate.column),
                predicate.operator.sql(),
                idx + 1
            );
            binds.push(predicate.value.clone());
        }
        (sql, binds)
    }

    /// Quote a column path, qualifying bare columns with the base table.
    fn quote_column(&self, path: &str) -> String {
        match path.split_once('.') {
            Some((table, column)) => format!("{}.{}", quote_ident(table), quote_ident(column)),
            None => format!("{}.{}", quote_ident(&self.table), quote_ident(path)),
        }
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
