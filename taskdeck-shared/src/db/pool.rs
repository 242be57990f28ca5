/// PostgreSQL connection pooling
///
/// The server configures only the connection URL and the pool size;
/// acquire and recycling behavior is fixed here instead of being threaded
/// through the environment.
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::db::pool::create_pool;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let url = std::env::var("DATABASE_URL")?;
///     let pool = create_pool(&url, 10).await?;
///
///     let row: (i64,) = sqlx::query_as("SELECT $1")
///         .bind(42i64)
///         .fetch_one(&pool)
///         .await?;
///
///     Ok(())
/// }
/// ```

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};

/// How long an acquire may wait before failing
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Idle connections are dropped after this long
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Connections are recycled once they reach this age
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

/// Opens a connection pool and verifies the database answers
///
/// # Errors
///
/// Returns an error if the URL is invalid, the database is unreachable,
/// or the startup ping fails.
pub async fn create_pool(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    info!(max_connections, "Opening database connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
        .connect(url)
        .await?;

    ping(&pool).await?;

    Ok(pool)
}

/// Round-trips a trivial query to confirm the database is reachable
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    debug!("Database ping succeeded");
    Ok(())
}

/// Drains and closes the pool during shutdown
pub async fn close_pool(pool: PgPool) {
    info!("Closing database connection pool");
    pool.close().await;
}
