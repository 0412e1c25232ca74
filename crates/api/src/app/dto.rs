//! Request decoding: list query strings and JSON bodies of admin writes.
//!
//! List endpoints take `limit`, `offset`, `sort` and indexed filters:
//! `?filters.0.key=code&filters.0.operator=like&filters.0.value=C-1`.

use std::collections::BTreeMap;

use serde::Deserialize;

use supplydesk_core::{RoleId, UserId};
use supplydesk_query::{Filter, ListRequest};

use crate::app::errors::ApiError;

/// Build a [`ListRequest`] from decoded query pairs.
///
/// Filters are ordered by index; a missing field is left empty. Unknown
/// parameters are ignored. Paging is not normalized here.
pub fn list_request(pairs: Vec<(String, String)>) -> Result<ListRequest, ApiError> {
    let mut request = ListRequest::default();
    let mut filters: BTreeMap<usize, Filter> = BTreeMap::new();

    for (name, value) in pairs {
        match name.as_str() {
            "limit" => request.limit = parse_int("limit", &value)?,
            "offset" => request.offset = parse_int("offset", &value)?,
            "sort" => request.sort = value,
            _ => {
                let Some(rest) = name.strip_prefix("filters.") else {
                    continue;
                };
                let Some((idx, field)) = rest.split_once('.') else {
                    continue;
                };
                let idx: usize = idx
                    .parse()
                    .map_err(|_| ApiError::Validation(format!("{name}: filter index must be a number")))?;
                let filter = filters
                    .entry(idx)
                    .or_insert_with(|| Filter::new("", "", ""));
                match field {
                    "key" => filter.key = value,
                    "operator" => filter.operator = value,
                    "value" => filter.value = value,
                    _ => {}
                }
            }
        }
    }

    request.filters = filters.into_values().collect();
    Ok(request)
}

/// `PUT /users/assign-role`
#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub id: i64,
    #[serde(default)]
    pub role_ids: Vec<i64>,
    #[serde(default)]
    pub user_name: Option<String>,
}

impl AssignRoleRequest {
    /// Validated `(user, roles, new name)`; a blank name means no rename.
    pub fn into_parts(self) -> Result<(UserId, Vec<RoleId>, Option<String>), ApiError> {
        let user = positive_id("id", self.id)?;
        let roles = self
            .role_ids
            .into_iter()
            .map(|id| positive_id("role_ids", id))
            .collect::<Result<Vec<RoleId>, _>>()?;
        let name = self
            .user_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        if roles.is_empty() && name.is_none() {
            return Err(ApiError::Validation("nothing to change".to_string()));
        }
        Ok((user, roles, name))
    }
}

/// `PUT /users/is-active`
#[derive(Debug, Deserialize)]
pub struct UpdateActiveRequest {
    pub id: i64,
    pub is_active: bool,
}

impl UpdateActiveRequest {
    pub fn user(&self) -> Result<UserId, ApiError> {
        positive_id("id", self.id)
    }
}

fn positive_id<T: From<i64>>(name: &str, value: i64) -> Result<T, ApiError> {
    if value <= 0 {
        return Err(ApiError::Validation(format!("{name}: must be a positive integer")));
    }
    Ok(T::from(value))
}

fn parse_int(name: &str, value: &str) -> Result<i64, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::Validation(format!("{name}: must be an integer")))
}
