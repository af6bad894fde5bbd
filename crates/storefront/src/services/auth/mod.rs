//! Authentication service.
//!
//! Customers may exist without a password (created at checkout); those
//! cannot log in until they register one.

mod error;

pub use error::AuthError;

use delivery_core::customer::{Customer, CustomerProfileInput};
use delivery_core::password::{hash_password, validate_password, verify_password};
use delivery_core::store::{CustomerStore, RepositoryError};
use delivery_core::Email;

/// Authentication service.
///
/// Handles customer registration and password login.
pub struct AuthService<'a> {
    customers: &'a dyn CustomerStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(customers: &'a dyn CustomerStore) -> Self {
        Self { customers }
    }

    /// Register a new customer with a password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the profile is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::AlreadyRegistered` if the email or phone is taken.
    pub async fn register_with_password(
        &self,
        profile: &CustomerProfileInput,
        password: &str,
    ) -> Result<Customer, AuthError> {
        let profile = profile.validate()?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let customer = self
            .customers
            .create(profile, Some(password_hash))
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(message) => AuthError::AlreadyRegistered(message),
                other => AuthError::Repository(other),
            })?;

        tracing::info!(customer_id = %customer.id, "Customer registered");
        Ok(customer)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AuthError::AccountDisabled` if the store deactivated the account.
    pub async fn login_with_password(&self, email: &str, password: &str) -> Result<Customer, AuthError> {
        // A malformed email can't match any account
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (customer, password_hash) = self
            .customers
            .credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !customer.active {
            return Err(AuthError::AccountDisabled);
        }

        Ok(customer)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use delivery_core::customer::AddressInput;
    use delivery_core::store::Stores;

    use super::*;

    fn profile() -> CustomerProfileInput {
        CustomerProfileInput {
            name: "Maria Souza".to_string(),
            email: "maria@example.com".to_string(),
            phone: "(31) 98765-4321".to_string(),
            address: AddressInput {
                street: "Rua dos Timbiras".to_string(),
                number: "455".to_string(),
                complement: None,
                neighborhood: "Funcionários".to_string(),
                city: "Belo Horizonte".to_string(),
                postal_code: "30140-060".to_string(),
                reference: None,
            },
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let stores = Stores::in_memory();
        let auth = AuthService::new(stores.customers.as_ref());

        let registered = auth.register_with_password(&profile(), "segredo1").await.unwrap();
        let logged_in = auth
            .login_with_password(" MARIA@example.com ", "segredo1")
            .await
            .unwrap();

        assert_eq!(registered.id, logged_in.id);
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let stores = Stores::in_memory();
        let auth = AuthService::new(stores.customers.as_ref());

        let err = auth.register_with_password(&profile(), "123").await.unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(_)));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let stores = Stores::in_memory();
        let auth = AuthService::new(stores.customers.as_ref());
        auth.register_with_password(&profile(), "segredo1").await.unwrap();

        let err = auth.register_with_password(&profile(), "segredo2").await.unwrap_err();
        assert!(matches!(err, AuthError::AlreadyRegistered(_)));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let stores = Stores::in_memory();
        let auth = AuthService::new(stores.customers.as_ref());
        auth.register_with_password(&profile(), "segredo1").await.unwrap();

        let err = auth.login_with_password("maria@example.com", "errado").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let err = auth.login_with_password("not-an-email", "segredo1").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_without_password_set() {
        let stores = Stores::in_memory();
        let profile = profile().validate().unwrap();
        stores.customers.create(profile, None).await.unwrap();

        let auth = AuthService::new(stores.customers.as_ref());
        let err = auth.login_with_password("maria@example.com", "segredo1").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_disabled_account() {
        let stores = Stores::in_memory();
        let auth = AuthService::new(stores.customers.as_ref());
        let customer = auth.register_with_password(&profile(), "segredo1").await.unwrap();
        stores.customers.set_active(customer.id, false).await.unwrap();

        let err = auth.login_with_password("maria@example.com", "segredo1").await.unwrap_err();
        assert!(matches!(err, AuthError::AccountDisabled));
    }
}
