use serde::Serialize;

use supplydesk_core::RoleId;

use crate::Permission;

/// A named bundle of permissions.
///
/// The permission list is loaded together with the role and is not
/// refreshed while a request is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub permissions: Vec<Permission>,
    pub status: bool,
}

impl Role {
    pub fn new(id: RoleId, name: impl Into<String>, permissions: Vec<Permission>) -> Self {
        Self {
            id,
            name: name.into(),
            permissions,
            status: true,
        }
    }

    pub fn grants(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p.as_str() == permission)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}
