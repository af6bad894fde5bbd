//! Database migration command.
//!
//! Migrations live in `crates/core/migrations/` and are embedded at build
//! time. Servers never migrate on start-up; run this before deploying.

use super::{CliError, connect};

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../core/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
