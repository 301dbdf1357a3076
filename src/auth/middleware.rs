//! Authentication Middleware
//! Mission: Protect note endpoints with JWT validation and the revocation list

use crate::auth::{blacklist::BlacklistStore, jwt::JwtHandler, models::Claims};
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// State the auth gate needs: the signer and the revocation list
#[derive(Clone)]
pub struct GateState {
    pub jwt_handler: Arc<JwtHandler>,
    pub blacklist: Arc<BlacklistStore>,
}

/// Pull the token out of `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(ApiError::Unauthorized("Missing authorization token"))?;

    value
        .to_str()
        .ok()
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::Unauthorized(
            "Invalid authorization format. Use: Bearer {token}",
        ))
}

/// Auth middleware that validates JWT tokens
pub async fn auth_middleware(
    State(gate): State<GateState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?.to_string();

    let claims = gate
        .jwt_handler
        .validate_token(&token)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token"))?;

    if gate.blacklist.is_revoked(&token)? {
        warn!("Rejected revoked token for user {}", claims.username);
        return Err(ApiError::Unauthorized("Token has been revoked"));
    }

    debug!("Authenticated request for {}", claims.username);

    // Add claims to request extensions so handlers can access them
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Extract claims from request (use after auth middleware)
pub fn extract_claims(req: &Request) -> Option<&Claims> {
    req.extensions().get::<Claims>()
}
