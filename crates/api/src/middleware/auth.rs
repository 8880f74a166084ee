//! Auth middleware for JWT verification. Authentication itself (issuing tokens, login flows)
//! is out of scope; this module only verifies a bearer token presented by an upstream caller
//! and exposes the claims it carries.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use jsonwebtoken::{DecodingKey, Validation, decode};

use examcal_domain::{Claims, DomainError};

use crate::AppState;

/// Decode and verify the bearer token carried in `Authorization`.
pub fn verify_bearer_token(headers: &HeaderMap, jwt_secret: &str) -> Result<Claims, StatusCode> {
    let auth_header = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::warn!("JWT verification failed: {}", e);
        StatusCode::UNAUTHORIZED
    })?;

    Ok(token_data.claims)
}

/// Axum extractor that validates the bearer token and provides the caller's claims.
///
/// Use this as a handler parameter instead of manually calling `verify_bearer_token`.
/// Handlers that declare `AuthUser` as a parameter are automatically protected.
pub struct AuthUser(pub Claims);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = DomainError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = verify_bearer_token(&parts.headers, &state.config.jwt_secret)
            .map_err(|_| DomainError::Unauthorized("Invalid or missing token".to_string()))?;
        Ok(AuthUser(claims))
    }
}
