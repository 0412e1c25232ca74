use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::Identity;

/// Effective capabilities of an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionSet {
    /// Administrators hold every capability.
    All,
    Named(HashSet<String>),
}

impl PermissionSet {
    pub fn contains(&self, permission: &str) -> bool {
        match self {
            PermissionSet::All => true,
            PermissionSet::Named(names) => names.contains(permission),
        }
    }

    pub fn contains_any<S: AsRef<str>>(&self, required: &[S]) -> bool {
        match self {
            PermissionSet::All => true,
            PermissionSet::Named(names) => required.iter().any(|r| names.contains(r.as_ref())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("unauthorized: no authenticated identity")]
    Unauthorized,

    #[error("forbidden: none of {0:?} granted")]
    Forbidden(Vec<String>),
}

/// Compute the capabilities of `identity`.
///
/// Only the first assigned role is consulted, even when the identity holds
/// several. An identity without roles holds nothing (unless admin).
pub fn effective_permissions(identity: &Identity) -> PermissionSet {
    if identity.is_admin {
        return PermissionSet::All;
    }

    let names = identity
        .primary_role()
        .map(|role| role.permissions.iter().map(|p| p.as_str().to_string()).collect())
        .unwrap_or_default();
    PermissionSet::Named(names)
}

/// Does `identity` hold any of `required`?
///
/// - No IO
/// - No panics
/// - Absent identity never passes; admins always pass
pub fn has_any<S: AsRef<str>>(identity: Option<&Identity>, required: &[S]) -> bool {
    match identity {
        None => false,
        Some(identity) => effective_permissions(identity).contains_any(required),
    }
}

/// [`has_any`] as a `Result`, distinguishing a missing identity from a denied one.
pub fn authorize<S: AsRef<str>>(identity: Option<&Identity>, required: &[S]) -> Result<(), AuthzError> {
    let Some(identity) = identity else {
        return Err(AuthzError::Unauthorized);
    };
    if has_any(Some(identity), required) {
        return Ok(());
    }

    let required: Vec<String> = required.iter().map(|r| r.as_ref().to_string()).collect();
    debug!(user_id = %identity.id, ?required, "permission denied");
    Err(AuthzError::Forbidden(required))
}
