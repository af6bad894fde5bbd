//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! delivery-cli admin create -e admin@example.com -n "Admin Name" -p 's3cret!'
//! ADMIN_PASSWORD='s3cret!' delivery-cli admin create -e admin@example.com -n "Admin Name"
//! ```

use delivery_admin::services::AdminAuthService;
use delivery_core::store::Stores;

use super::{CliError, connect};

/// Create a new admin user.
///
/// # Errors
///
/// Returns an error if no password is given, the input is invalid, the
/// email is taken or the database is unreachable.
pub async fn create_user(email: &str, name: &str, password: Option<String>) -> Result<(), CliError> {
    let pool = connect().await?;

    let password = match password {
        Some(password) => password,
        None => std::env::var("ADMIN_PASSWORD").map_err(|_| CliError::MissingEnvVar("ADMIN_PASSWORD"))?,
    };

    let stores = Stores::postgres(pool);
    let admin = AdminAuthService::new(stores.admins.as_ref())
        .create_admin(name, email, &password)
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        admin.id,
        admin.email
    );
    Ok(())
}
