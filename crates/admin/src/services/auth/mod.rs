//! Admin authentication service.
//!
//! Email and password, hashed with argon2. Admins are created from the CLI;
//! the HTTP registration endpoint only works while no admin exists.

mod error;

pub use error::AdminAuthError;

use delivery_core::admin::{AdminUser, NewAdmin};
use delivery_core::password::{hash_password, validate_password, verify_password};
use delivery_core::store::{AdminStore, RepositoryError};
use delivery_core::Email;

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    admins: &'a dyn AdminStore,
}

impl<'a> AdminAuthService<'a> {
    #[must_use]
    pub const fn new(admins: &'a dyn AdminStore) -> Self {
        Self { admins }
    }

    /// Create an admin.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::Validation` for a bad name or email,
    /// `AdminAuthError::WeakPassword` for a short password and
    /// `AdminAuthError::UserAlreadyExists` if the email is taken.
    pub async fn create_admin(&self, name: &str, email: &str, password: &str) -> Result<AdminUser, AdminAuthError> {
        let admin = NewAdmin::parse(name, email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let admin = self
            .admins
            .create(admin, password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AdminAuthError::UserAlreadyExists,
                other => AdminAuthError::Repository(other),
            })?;

        tracing::info!(admin_id = %admin.id, email = %admin.email, "Admin user created");
        Ok(admin)
    }

    /// Create the very first admin. Closed once any admin exists.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::RegistrationClosed` if an admin already
    /// exists, otherwise the errors of [`Self::create_admin`].
    pub async fn register_first(&self, name: &str, email: &str, password: &str) -> Result<AdminUser, AdminAuthError> {
        if self.admins.count().await? > 0 {
            return Err(AdminAuthError::RegistrationClosed);
        }
        self.create_admin(name, email, password).await
    }

    /// Login with email and password, recording the login time.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AdminAuthError::AccountDisabled` for a deactivated admin.
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminUser, AdminAuthError> {
        let email = Email::parse(email).map_err(|_| AdminAuthError::InvalidCredentials)?;

        let (admin, password_hash) = self
            .admins
            .credentials(&email)
            .await?
            .ok_or(AdminAuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !admin.active {
            return Err(AdminAuthError::AccountDisabled);
        }

        self.admins.record_login(admin.id).await?;
        Ok(admin)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use delivery_core::store::Stores;

    use super::*;

    #[tokio::test]
    async fn test_register_first_only_once() {
        let stores = Stores::in_memory();
        let auth = AdminAuthService::new(stores.admins.as_ref());

        auth.register_first("Ana", "ana@loja.com", "segredo1").await.unwrap();
        let err = auth
            .register_first("Bia", "bia@loja.com", "segredo2")
            .await
            .unwrap_err();
        assert!(matches!(err, AdminAuthError::RegistrationClosed));
    }

    #[tokio::test]
    async fn test_create_duplicate_email() {
        let stores = Stores::in_memory();
        let auth = AdminAuthService::new(stores.admins.as_ref());
        auth.create_admin("Ana", "ana@loja.com", "segredo1").await.unwrap();

        let err = auth.create_admin("Ana B", "ANA@loja.com", "segredo2").await.unwrap_err();
        assert!(matches!(err, AdminAuthError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn test_login_records_last_login() {
        let stores = Stores::in_memory();
        let auth = AdminAuthService::new(stores.admins.as_ref());
        let created = auth.create_admin("Ana", "ana@loja.com", "segredo1").await.unwrap();
        assert!(created.last_login_at.is_none());

        auth.login("ana@loja.com", "segredo1").await.unwrap();
        let stored = stores.admins.get(created.id).await.unwrap().unwrap();
        assert!(stored.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let stores = Stores::in_memory();
        let auth = AdminAuthService::new(stores.admins.as_ref());
        auth.create_admin("Ana", "ana@loja.com", "segredo1").await.unwrap();

        assert!(matches!(
            auth.login("ana@loja.com", "errada").await.unwrap_err(),
            AdminAuthError::InvalidCredentials
        ));
        assert!(matches!(
            auth.login("ninguem@loja.com", "segredo1").await.unwrap_err(),
            AdminAuthError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let stores = Stores::in_memory();
        let auth = AdminAuthService::new(stores.admins.as_ref());

        let err = auth.create_admin("Ana", "ana@loja.com", "123").await.unwrap_err();
        assert!(matches!(err, AdminAuthError::WeakPassword(_)));
    }
}
