use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    middleware::from_fn_with_state,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};

use supplydesk_auth::permissions::names;
use supplydesk_core::UserId;
use supplydesk_infra::records::{users::ACCEPTED_FILTER_KEYS, User};
use supplydesk_query::Page;

use crate::app::dto::{self, AssignRoleRequest, UpdateActiveRequest};
use crate::app::{errors::ApiError, services::AppServices};
use crate::authz::{self, Permit};

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list).route_layer(from_fn_with_state(Permit::any_of(&[names::VIEW_LIST_USER]), authz::permit)),
        )
        .route(
            "/:id",
            get(get_one).route_layer(from_fn_with_state(
                Permit::any_of(&[names::VIEW_CURRENT_USER]),
                authz::permit,
            )),
        )
        .route(
            "/assign-role",
            put(assign_role).route_layer(from_fn_with_state(Permit::admin_only(), authz::permit)),
        )
        .route(
            "/is-active",
            put(update_active).route_layer(from_fn_with_state(Permit::admin_only(), authz::permit)),
        )
}

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Page<User>>, ApiError> {
    let mut request = dto::list_request(params)?;
    request.ensure_default();
    request.check_keys(ACCEPTED_FILTER_KEYS)?;
    Ok(Json(services.users.list(request).await?))
}

pub async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id: UserId = id.parse()?;
    Ok(Json(services.users.get(id, Vec::new()).await?))
}

/// Replace the user's active roles and optionally rename them.
pub async fn assign_role(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<AssignRoleRequest>,
) -> Result<Json<Value>, ApiError> {
    let (user, roles, full_name) = body.into_parts()?;
    services.user_admin.assign_roles(user, roles, full_name).await?;
    Ok(Json(json!({ "message": "Successfully" })))
}

pub async fn update_active(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<UpdateActiveRequest>,
) -> Result<Json<Value>, ApiError> {
    services.user_admin.set_active(body.user()?, body.is_active).await?;
    Ok(Json(json!({ "message": "active is changed" })))
}
