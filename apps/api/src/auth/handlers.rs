//! Auth endpoints: signup, login, refresh, me, logout.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::guard::{refresh_claims, AuthUser};
use crate::auth::tokens::{
    create_access_token, create_refresh_token, hash_password, verify_password,
};
use crate::errors::AppError;
use crate::models::user::{User, UserResponse};
use crate::state::AppState;

const USER_COLUMNS: &str = "id, email, name, password_hash, created_at, updated_at";

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password required".to_string(),
        ));
    }

    let name = req.name.filter(|n| !n.trim().is_empty());
    let password_hash = hash_password(&req.password)?;

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (email, name, password_hash)
        VALUES ($1, $2, $3)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&req.email)
    .bind(name.as_deref().unwrap_or("User"))
    .bind(&password_hash)
    .fetch_one(&state.db)
    .await
    .map_err(|e| match &e {
        // Unique index on email; the insert itself is the existence check.
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("Email already registered".to_string())
        }
        _ => AppError::Database(e),
    })?;

    tracing::info!(user_id = %user.id, "user registered");

    let (access_token, refresh_token) = issue_tokens(&state, &user)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Signup successful".to_string(),
            user: UserResponse::from(&user),
            access_token,
            refresh_token,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password required".to_string(),
        ));
    }

    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(&req.email)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let (access_token, refresh_token) = issue_tokens(&state, &user)?;
    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: UserResponse::from(&user),
        access_token,
        refresh_token,
    }))
}

/// POST /api/auth/refresh — bearer refresh token in, new access token out.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let claims = refresh_claims(&headers, &state.config.jwt_secret)?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))?;

    let access_token = create_access_token(
        user_id,
        &claims.email,
        &state.config.jwt_secret,
        state.config.access_token_ttl_secs,
    )?;

    Ok(Json(json!({ "access_token": access_token })))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(&user)))
}

/// POST /api/auth/logout — stateless; the client discards its tokens.
pub async fn logout(AuthUser(_user_id): AuthUser) -> Json<Value> {
    Json(json!({ "message": "Logout successful" }))
}

fn issue_tokens(state: &AppState, user: &User) -> Result<(String, String), AppError> {
    let access = create_access_token(
        user.id,
        &user.email,
        &state.config.jwt_secret,
        state.config.access_token_ttl_secs,
    )?;
    let refresh = create_refresh_token(
        user.id,
        &user.email,
        &state.config.jwt_secret,
        state.config.refresh_token_ttl_secs,
    )?;
    Ok((access, refresh))
}
