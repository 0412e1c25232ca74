//! `supplydesk-query`: translation of client list requests into
//! parameterized SQL.
//!
//! A [`ListRequest`] carries caller-supplied [`Filter`]s plus paging. The
//! [`scope::build_scope`] function resolves each filter against an entity's
//! [`KeyRegistry`] and produces a [`FilterScope`]; [`paginate::paginate`]
//! produces the paging scope. Both apply to a [`SelectPlan`], which renders
//! count and select statements with bound values only.
//!
//! This crate is intentionally decoupled from the database driver.

pub mod filter;
pub mod operator;
pub mod paginate;
pub mod plan;
pub mod registry;
pub mod scope;

pub use filter::{Filter, ListRequest, DEFAULT_LIMIT, DEFAULT_SORT};
pub use operator::Operator;
pub use paginate::{paginate, Page, Paginate};
pub use plan::{BindValue, SelectPlan};
pub use registry::{JoinSpec, KeyRegistry, KeyRegistryBuilder, ValueKind};
pub use scope::{build_scope, FilterScope, Scope};
