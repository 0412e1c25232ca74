//! Request-scoped middleware: correlation ids and authentication.
//!
//! Authentication runs as a short state machine:
//! header present (`TokenPresented`), token verified (`TokenValidated`),
//! identity loaded (`IdentityHydrated`), identity attached to the request
//! (`Attached`). Any failure ends the request with 401.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{debug, error, field, info_span, Instrument, Span};
use uuid::Uuid;

use supplydesk_auth::TokenValidator;
use supplydesk_infra::config::AuthConfig;
use supplydesk_infra::{IdentityError, IdentityStore};

use crate::app::errors::ApiError;
use crate::context::{CurrentIdentity, RequestId};

pub const REQUEST_ID_HEADER: &str = "request-id";

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenValidator>,
    pub identities: Arc<dyn IdentityStore>,
    pub header: String,
    pub scheme: String,
}

impl AuthState {
    pub fn new(cfg: &AuthConfig, tokens: Arc<dyn TokenValidator>, identities: Arc<dyn IdentityStore>) -> Self {
        Self {
            tokens,
            identities,
            header: cfg.header.clone(),
            scheme: cfg.token_scheme.clone(),
        }
    }
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(req.headers(), &state.header, &state.scheme).ok_or_else(|| {
        debug!(header = %state.header, "missing or malformed credentials");
        ApiError::Unauthorized
    })?;

    let user_id = state.tokens.validate(token, Utc::now()).map_err(|e| {
        debug!(error = %e, "token rejected");
        ApiError::Unauthorized
    })?;

    let identity = state
        .identities
        .fetch_identity(user_id)
        .await
        .map_err(|e| {
            match e {
                IdentityError::NotFound => debug!(user_id = %user_id, "no active user for token"),
                IdentityError::Persistence(e) => error!(user_id = %user_id, error = %e, "identity lookup failed"),
            }
            ApiError::Unauthorized
        })?;

    Span::current().record("user_id", identity.id.get());
    req.extensions_mut().insert(CurrentIdentity::new(identity));

    Ok(next.run(req).await)
}

/// `<scheme> <token>`, scheme matched case-insensitively. With an empty
/// scheme the whole header value is the token.
fn extract_token<'h>(headers: &'h HeaderMap, header: &str, scheme: &str) -> Option<&'h str> {
    let value = headers.get(header)?.to_str().ok()?.trim();

    let token = if scheme.is_empty() {
        value
    } else {
        let (presented, rest) = value.split_once(char::is_whitespace)?;
        if !presented.eq_ignore_ascii_case(scheme) {
            return None;
        }
        rest.trim()
    };

    if token.is_empty() {
        return None;
    }
    Some(token)
}

/// Tag each request with an id (the client's, if it sent a usable one) and
/// run it inside a span carrying that id.
pub async fn request_id_middleware(mut req: Request<Body>, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= 128)
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::now_v7().to_string());

    let span = info_span!(
        "request",
        request_id = %id,
        method = %req.method(),
        path = %req.uri().path(),
        user_id = field::Empty,
    );
    req.extensions_mut().insert(RequestId::new(id.clone()));

    let mut res = next.run(req).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}
