//! Role and permission catalogs.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};

use supplydesk_auth::permissions::names;
use supplydesk_core::RoleId;
use supplydesk_infra::records::{roles::ACCEPTED_FILTER_KEYS, PermissionRecord, RoleRecord};
use supplydesk_query::Page;

use crate::app::{dto, errors::ApiError, services::AppServices};
use crate::authz::{self, Permit};

const ROLE_READERS: Permit = Permit::any_of(&[names::VIEW_LIST_USER]);

pub fn router() -> Router {
    Router::new()
        .route("/roles", get(list_roles).route_layer(from_fn_with_state(ROLE_READERS, authz::permit)))
        .route("/roles/:id", get(get_role).route_layer(from_fn_with_state(ROLE_READERS, authz::permit)))
        .route(
            "/permissions",
            get(list_permissions).route_layer(from_fn_with_state(Permit::admin_only(), authz::permit)),
        )
}

pub async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Page<RoleRecord>>, ApiError> {
    let mut request = dto::list_request(params)?;
    request.ensure_default();
    request.check_keys(ACCEPTED_FILTER_KEYS)?;
    Ok(Json(services.roles.list(request).await?))
}

pub async fn get_role(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<RoleRecord>, ApiError> {
    let id: RoleId = id.parse()?;
    Ok(Json(services.roles.get(id, Vec::new()).await?))
}

pub async fn list_permissions(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<PermissionRecord>>, ApiError> {
    Ok(Json(services.permissions.all().await?))
}
