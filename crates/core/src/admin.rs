//! Back-office staff accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AdminUserId, Email};
use crate::validation::ValidationErrors;

pub const NAME_MAX: usize = 100;

/// A staff member allowed into the admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: AdminUserId,
    pub name: String,
    pub email: Email,
    pub active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Validated fields for a new admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAdmin {
    pub name: String,
    pub email: Email,
}

impl NewAdmin {
    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn parse(name: &str, email: &str) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.text("name", name, NAME_MAX);
        let email = errors.parsed("email", Email::parse(email));
        match email {
            Some(email) => errors.finish(Self { name, email }),
            None => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collects_all_errors() {
        let errors = NewAdmin::parse(" ", "nope").unwrap_err();
        assert!(errors.contains("name"));
        assert!(errors.contains("email"));
    }

    #[test]
    fn test_parse_normalizes_email() {
        let admin = NewAdmin::parse("Ana", " Ana@Loja.com ").unwrap();
        assert_eq!(admin.email.as_str(), "ana@loja.com");
    }
}
