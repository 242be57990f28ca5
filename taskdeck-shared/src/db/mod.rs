/// Database layer for Taskdeck
///
/// This module provides database connection pooling and migrations.
/// Models are in the `models` module at crate root level.
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::db::pool::create_pool;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(&std::env::var("DATABASE_URL")?, 10).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
