//! Request authorization guard.
//!
//! An explicit extractor rather than implicit call wrapping: handlers that
//! require authentication take [`AuthUser`] as an argument, and the router
//! composes it per-route. Rejection is a typed [`AppError::Unauthorized`].

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::auth::tokens::{validate_token, Claims, TOKEN_TYPE_ACCESS};
use crate::errors::AppError;
use crate::state::AppState;

/// The authenticated caller's user id, extracted from a Bearer access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = validate_token(token, &state.config.jwt_secret)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        if claims.token_type != TOKEN_TYPE_ACCESS {
            return Err(AppError::Unauthorized(
                "Access token required".to_string(),
            ));
        }

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))?;

        Ok(AuthUser(user_id))
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
/// Shared with the refresh endpoint, which validates a refresh-type token.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".to_string()))
}

/// Validates a refresh-type bearer token and returns its claims.
pub fn refresh_claims(headers: &HeaderMap, secret: &str) -> Result<Claims, AppError> {
    let token = bearer_token(headers)?;
    let claims = validate_token(token, secret)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    if claims.token_type != crate::auth::tokens::TOKEN_TYPE_REFRESH {
        return Err(AppError::Unauthorized("Refresh token required".to_string()));
    }

    Ok(claims)
}
