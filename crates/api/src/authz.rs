//! Route-level permission guard.
//!
//! Attach with
//! `route_layer(from_fn_with_state(Permit::any_of(&[...]), authz::permit))`
//! behind the auth middleware.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use supplydesk_auth::authorize;

use crate::app::errors::ApiError;
use crate::context::CurrentIdentity;

/// Permissions any one of which admits the caller. Empty admits admins only.
#[derive(Debug, Clone, Copy)]
pub struct Permit(&'static [&'static str]);

impl Permit {
    pub const fn any_of(required: &'static [&'static str]) -> Self {
        Self(required)
    }

    pub const fn admin_only() -> Self {
        Self(&[])
    }

    pub fn required(&self) -> &'static [&'static str] {
        self.0
    }
}

pub async fn permit(State(permit): State<Permit>, req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let identity = req.extensions().get::<CurrentIdentity>().map(CurrentIdentity::identity);
    authorize(identity, permit.required())?;
    Ok(next.run(req).await)
}
