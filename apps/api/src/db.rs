use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;

// Uploads are scored synchronously on the request path, so a slow acquire
// surfaces quickly instead of queueing requests.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Creates the PostgreSQL connection pool, sized from configuration.
pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let pool = pool_options(config).connect(&config.database_url).await?;
    info!(
        max_connections = config.database_pool_max_connections,
        "PostgreSQL pool ready"
    );
    Ok(pool)
}

fn pool_options(config: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.database_pool_max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
}
