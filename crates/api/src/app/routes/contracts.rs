//! Contract list and detail.
//!
//! Both endpoints admit holders of either contract permission; the row scope
//! then limits narrow holders to their own organization's contracts, for the
//! detail endpoint as well.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};

use supplydesk_auth::permissions::names;
use supplydesk_auth::RowScope;
use supplydesk_core::ContractId;
use supplydesk_infra::records::{contracts::ACCEPTED_FILTER_KEYS, Contract};
use supplydesk_query::Page;

use crate::app::{dto, errors::ApiError, services::AppServices};
use crate::authz::{self, Permit};
use crate::context::CurrentIdentity;

const READERS: Permit = Permit::any_of(&[names::VIEW_ALL_CONTRACT_LIST, names::VIEW_CONTRACT_LIST]);

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).route_layer(from_fn_with_state(READERS, authz::permit)))
        .route("/:id", get(get_one).route_layer(from_fn_with_state(READERS, authz::permit)))
}

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentIdentity>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Page<Contract>>, ApiError> {
    let mut request = dto::list_request(params)?;
    request.ensure_default();
    request.check_keys(ACCEPTED_FILTER_KEYS)?;

    let filters = std::mem::take(&mut request.filters);
    request.filters = RowScope::CONTRACTS.scope_filters(current.identity(), filters);

    Ok(Json(services.contracts.list(request).await?))
}

pub async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentIdentity>,
    Path(id): Path<String>,
) -> Result<Json<Contract>, ApiError> {
    let id: ContractId = id.parse()?;
    let scope = RowScope::CONTRACTS.scope_filters(current.identity(), Vec::new());
    Ok(Json(services.contracts.get(id, scope).await?))
}
