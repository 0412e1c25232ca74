use std::sync::Arc;

use supplydesk_auth::Identity;

/// The authenticated caller of the current request.
///
/// Inserted by the auth middleware after the identity is hydrated and only
/// lives as long as the request.
#[derive(Debug, Clone)]
pub struct CurrentIdentity {
    identity: Arc<Identity>,
}

impl CurrentIdentity {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity: Arc::new(identity),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

/// Correlation id echoed in the `request-id` response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
