//! `supplydesk-auth`: identity, permission checks and row scoping.
//!
//! This crate is intentionally decoupled from HTTP and storage: identities
//! arrive fully hydrated and every check is a pure read over them.

pub mod authorize;
pub mod claims;
pub mod identity;
pub mod permissions;
pub mod roles;
pub mod row_scope;

pub use authorize::{authorize, effective_permissions, has_any, AuthzError, PermissionSet};
pub use claims::{validate_claims, Hs256TokenValidator, JwtClaims, TokenError, TokenValidator};
pub use identity::Identity;
pub use permissions::Permission;
pub use roles::Role;
pub use row_scope::{OwnerKey, RowScope};
