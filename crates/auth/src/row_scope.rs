//! Row-level narrowing for list and detail queries.
//!
//! A route first checks that the caller may use the endpoint at all; the
//! row scope then narrows *which rows* come back. It never grants access on
//! its own.

use supplydesk_query::Filter;

use crate::permissions::names;
use crate::{effective_permissions, Identity};

/// Which identity attribute the restricted column is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerKey {
    Org,
    User,
}

/// Policy: holders of `narrow` without `broad` only see rows where
/// `column = <owner key of the caller>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowScope {
    pub narrow: &'static str,
    pub broad: &'static str,
    pub column: &'static str,
    pub owner: OwnerKey,
}

impl RowScope {
    /// Supply vendors see the contracts they are the vendor of.
    pub const CONTRACTS: RowScope = RowScope {
        narrow: names::VIEW_CONTRACT_LIST,
        broad: names::VIEW_ALL_CONTRACT_LIST,
        column: "supply_vendor_id",
        owner: OwnerKey::Org,
    };

    pub fn applies_to(&self, identity: &Identity) -> bool {
        let perms = effective_permissions(identity);
        perms.contains(self.narrow) && !perms.contains(self.broad)
    }

    /// Append the owner filter when the policy applies; otherwise return `filters` as is.
    pub fn scope_filters(&self, identity: &Identity, mut filters: Vec<Filter>) -> Vec<Filter> {
        if self.applies_to(identity) {
            let owner = match self.owner {
                OwnerKey::Org => identity.org_id.get(),
                OwnerKey::User => identity.id.get(),
            };
            filters.push(Filter::eq(self.column, owner));
        }
        filters
    }
}
