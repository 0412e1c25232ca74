use serde::Serialize;

use supplydesk_core::{OrgId, UserId};

use crate::Role;

/// An authenticated caller, hydrated from storage for one request.
///
/// Role order is significant: permission checks read the first role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub is_admin: bool,
    pub org_id: OrgId,
    pub roles: Vec<Role>,
}

impl Identity {
    pub fn new(id: UserId, org_id: OrgId, roles: Vec<Role>) -> Self {
        Self {
            id,
            full_name: String::new(),
            email: String::new(),
            is_admin: false,
            org_id,
            roles,
        }
    }

    pub fn admin(id: UserId, org_id: OrgId) -> Self {
        Self {
            is_admin: true,
            ..Self::new(id, org_id, Vec::new())
        }
    }

    /// The role whose permissions are consulted by [`crate::has_any`].
    pub fn primary_role(&self) -> Option<&Role> {
        self.roles.first()
    }
}
