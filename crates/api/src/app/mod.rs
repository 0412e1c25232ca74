//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: record services, identity store and token validator
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: query-string decoding
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{middleware::from_fn, middleware::from_fn_with_state, routing::get, Extension, Router};
use tower::ServiceBuilder;

use supplydesk_infra::config::AuthConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(auth: &AuthConfig, services: AppServices) -> Router {
    let auth_state = middleware::AuthState::new(auth, Arc::clone(&services.tokens), Arc::clone(&services.identities));

    // Protected routes: identity is hydrated before any route guard runs.
    let protected = routes::router()
        .layer(Extension(Arc::new(services)))
        .layer(from_fn_with_state(auth_state, middleware::auth_middleware));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(from_fn(middleware::request_id_middleware)))
}
