use axum::{extract::Extension, http::StatusCode, Json};

use supplydesk_auth::Identity;

use crate::context::CurrentIdentity;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// The caller as hydrated for this request.
pub async fn me(Extension(current): Extension<CurrentIdentity>) -> Json<Identity> {
    Json(current.identity().clone())
}
