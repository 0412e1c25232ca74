use std::borrow::Cow;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

use supplydesk_core::PermissionId;

/// Permission identifier.
///
/// Permissions are opaque capability tokens (e.g. "VIEW_LIST_USER"). Two
/// permissions are the same capability when their names match; the storage
/// id is informational.
#[derive(Debug, Clone)]
pub struct Permission {
    id: Option<PermissionId>,
    name: Cow<'static, str>,
}

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self { id: None, name: name.into() }
    }

    pub fn with_id(id: PermissionId, name: impl Into<Cow<'static, str>>) -> Self {
        Self { id: Some(id), name: name.into() }
    }

    pub fn id(&self) -> Option<PermissionId> {
        self.id
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Permission {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Permission {}

impl Hash for Permission {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Permissions serialize as their bare name.
impl Serialize for Permission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Capability names checked by routes and row scoping.
pub mod names {
    pub const VIEW_LIST_USER: &str = "VIEW_LIST_USER";
    pub const VIEW_CURRENT_USER: &str = "VIEW_CURRENT_USER";
    /// Contracts of the caller's own organization only.
    pub const VIEW_CONTRACT_LIST: &str = "VIEW_CONTRACT_LIST";
    pub const VIEW_ALL_CONTRACT_LIST: &str = "VIEW_ALL_CONTRACT_LIST";
}
