//! Password hashing (argon2id) and JWT issuance/validation.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// JWT claims. `token_type` distinguishes access tokens from refresh tokens
/// so one can never be presented in place of the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

/// Hash a password using argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Create a short-lived access token.
pub fn create_access_token(
    user_id: Uuid,
    email: &str,
    secret: &str,
    ttl_secs: i64,
) -> Result<String> {
    create_token(user_id, email, TOKEN_TYPE_ACCESS, secret, ttl_secs)
}

/// Create a long-lived refresh token.
pub fn create_refresh_token(
    user_id: Uuid,
    email: &str,
    secret: &str,
    ttl_secs: i64,
) -> Result<String> {
    create_token(user_id, email, TOKEN_TYPE_REFRESH, secret, ttl_secs)
}

fn create_token(
    user_id: Uuid,
    email: &str,
    token_type: &str,
    secret: &str,
    ttl_secs: i64,
) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        token_type: token_type.to_string(),
        iat: now,
        exp: now + ttl_secs,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to create token")
}

/// Validate a token's signature and expiry and return its claims.
/// Callers must still check `token_type` for the endpoint at hand.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims> {
    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Invalid token")?;
    Ok(token_data.claims)
}
