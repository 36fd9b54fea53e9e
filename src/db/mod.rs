//! Database initialization and migration runner.
//!
//! SYSTEM CONTEXT
//! ==============
//! Startup uses this module to make sure the target database exists, create
//! the shared SQLx pool, and apply schema migrations before accepting API
//! traffic.

use sqlx::postgres::{PgConnection, PgPoolOptions};
use sqlx::{Connection, PgPool};
use tracing::info;

use crate::config::AppConfig;

/// Create the configured database through the admin database if it does not exist yet.
///
/// No-op when the config carries a full `DATABASE_URL` (no admin URL).
///
/// # Errors
///
/// Returns an error if the admin connection or the `CREATE DATABASE` fails.
pub async fn ensure_database_exists(config: &AppConfig) -> Result<(), sqlx::Error> {
    let (Some(admin_url), Some(name)) = (config.admin_database_url.as_deref(), config.database_name.as_deref()) else {
        return Ok(());
    };

    let mut conn = PgConnection::connect(admin_url).await?;

    let exists = sqlx::query_scalar::<_, i32>("SELECT 1 FROM pg_database WHERE datname = $1")
        .bind(name)
        .fetch_optional(&mut conn)
        .await?
        .is_some();

    if exists {
        info!(database = name, "database already exists");
    } else {
        // CREATE DATABASE takes an identifier, not a bind parameter.
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(name)))
            .execute(&mut conn)
            .await?;
        info!(database = name, "created database");
    }

    conn.close().await?;
    Ok(())
}

/// Initialize the `PostgreSQL` connection pool and run migrations.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(config: &AppConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
