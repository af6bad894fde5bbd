//! `PostgreSQL` repositories.
//!
//! Queries are built at runtime (`query_as` with `FromRow` rows) so the crate
//! builds without a live database. Line items, the customer snapshot, the
//! status history and addresses are stored as `JSONB`.

mod admins;
mod customers;
mod menu;
mod orders;

pub use admins::PgAdminStore;
pub use customers::PgCustomerStore;
pub use menu::PgMenuStore;
pub use orders::PgOrderStore;

use super::RepositoryError;

/// Maps a unique violation to `Conflict(message)`, anything else to `Database`.
fn conflict_on_unique(e: sqlx::Error, message: impl FnOnce(Option<&str>) -> String) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message(db_err.constraint()));
    }
    RepositoryError::Database(e)
}

/// Converts a stored `INTEGER` that must be non-negative.
fn non_negative(column: &str, value: i32) -> Result<u32, RepositoryError> {
    u32::try_from(value)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative {column} in database: {value}")))
}

/// Converts a count or quantity for binding as `INTEGER`.
fn to_i32(column: &str, value: u32) -> Result<i32, RepositoryError> {
    i32::try_from(value)
        .map_err(|_| RepositoryError::DataCorruption(format!("{column} out of range: {value}")))
}
