use serde::{Deserialize, Serialize};

/// Comparison operators a client may use in a filter.
///
/// The set is closed: anything else on the wire is not an operator and the
/// filter carrying it is dropped by the scope builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
}

impl Operator {
    pub const ALL: [Operator; 7] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Lt,
        Operator::Le,
        Operator::Gt,
        Operator::Ge,
        Operator::Like,
    ];

    /// Look up an operator by its wire token (`eq`, `ne`, ...).
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.token() == token)
    }

    pub fn token(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Lt => "lt",
            Operator::Le => "le",
            Operator::Gt => "gt",
            Operator::Ge => "ge",
            Operator::Like => "like",
        }
    }

    /// SQL fragment placed between the column and the bound parameter.
    ///
    /// `ne` is null-safe: rows whose column is NULL count as "not equal".
    pub fn sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "IS DISTINCT FROM",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Like => "LIKE",
        }
    }

    /// Transform the raw client value before binding.
    pub fn bind_value(&self, raw: &str) -> String {
        match self {
            Operator::Like => format!("%{raw}%"),
            _ => raw.to_string(),
        }
    }
}

impl core::fmt::Display for Operator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.token())
    }
}
