use axum::{routing::get, Router};

pub mod auth;
pub mod contracts;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/me", get(system::me))
        .nest("/users", users::router())
        .nest("/contracts", contracts::router())
        .nest("/auth", auth::router())
}
