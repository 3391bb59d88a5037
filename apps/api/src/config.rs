use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails with context if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_pool_max_connections: u32,
    pub jwt_secret: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            database_pool_max_connections: parse_env("DATABASE_POOL_MAX_CONNECTIONS", 10)?,
            jwt_secret: require_env("JWT_SECRET")?,
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "uploads")),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 16 * 1024 * 1024)?,
            allowed_extensions: parse_extensions(&env_or("ALLOWED_EXTENSIONS", "pdf,docx,txt")),
            access_token_ttl_secs: parse_env("ACCESS_TOKEN_TTL_SECS", 3600)?,
            refresh_token_ttl_secs: parse_env("REFRESH_TOKEN_TTL_SECS", 30 * 24 * 3600)?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("'{key}' must be a valid number")),
        Err(_) => Ok(default),
    }
}

/// Parses the comma-separated extension allow-list, normalizing to lowercase.
fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}
