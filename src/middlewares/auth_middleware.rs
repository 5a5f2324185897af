use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use axum::http::header::AUTHORIZATION;
use std::sync::Arc;
use tracing::debug;

use crate::util::error::HandlerError;
use crate::util::jwt::JwtTokenUtils;

/// Bearer-token guard for the artisan's routes. The validated claims are
/// attached to the request for handlers to pick up with `Extension<Claims>`.
pub struct AuthState {
    pub jwt_utils: Arc<dyn JwtTokenUtils>,
}

impl AuthState {
    pub fn new(jwt_utils: Arc<dyn JwtTokenUtils>) -> Self {
        AuthState { jwt_utils }
    }
}

pub async fn require_user(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| HandlerError::unauthorized("Missing authorization header"))?;

    let token = state
        .jwt_utils
        .extract_token_from_header(auth_header)
        .map_err(|e| HandlerError::unauthorized(e.to_string()))?;
    let claims = state.jwt_utils.validate_access_token(&token).map_err(|e| {
        debug!("Rejected access token: {}", e);
        HandlerError::unauthorized("Invalid or expired token")
    })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
