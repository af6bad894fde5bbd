//! Customers and their delivery profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Address, CustomerId, Email, Phone, PostalCode};
use crate::validation::ValidationErrors;

pub const NAME_MAX: usize = 100;
pub const NOTES_MAX: usize = 300;

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    pub address: Address,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated contact and delivery data, used to create or update a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerProfile {
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    pub address: Address,
    pub notes: Option<String>,
}

/// Address as submitted by a form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddressInput {
    pub street: String,
    pub number: String,
    #[serde(default)]
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub postal_code: String,
    #[serde(default)]
    pub reference: Option<String>,
}

impl AddressInput {
    /// Validate into an [`Address`].
    ///
    /// # Errors
    ///
    /// Returns every invalid field, named relative to the address.
    pub fn validate(&self) -> Result<Address, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let street = errors.text("street", &self.street, 200);
        let number = errors.text("number", &self.number, 10);
        let complement = errors.optional_text("complement", self.complement.as_deref(), 100);
        let neighborhood = errors.text("neighborhood", &self.neighborhood, 100);
        let city = errors.text("city", &self.city, 100);
        let postal_code = errors.parsed("postalCode", PostalCode::parse(&self.postal_code));
        let reference = errors.optional_text("reference", self.reference.as_deref(), 200);

        match postal_code {
            Some(postal_code) => errors.finish(Address {
                street,
                number,
                complement,
                neighborhood,
                city,
                postal_code,
                reference,
            }),
            None => Err(errors),
        }
    }
}

/// Customer profile as submitted by a form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomerProfileInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: AddressInput,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CustomerProfileInput {
    /// Validate into a [`CustomerProfile`].
    ///
    /// # Errors
    ///
    /// Returns every invalid field; address fields are prefixed `address.`.
    pub fn validate(&self) -> Result<CustomerProfile, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.text("name", &self.name, NAME_MAX);
        let email = errors.parsed("email", Email::parse(&self.email));
        let phone = errors.parsed("phone", Phone::parse(&self.phone));
        let address = self
            .address
            .validate()
            .map_err(|e| errors.merge_nested("address", e))
            .ok();
        let notes = errors.optional_text("notes", self.notes.as_deref(), NOTES_MAX);

        match (email, phone, address) {
            (Some(email), Some(phone), Some(address)) => errors.finish(CustomerProfile {
                name,
                email,
                phone,
                address,
                notes,
            }),
            _ => Err(errors),
        }
    }
}

/// Admin customer listing filters.
#[derive(Debug, Clone, Default)]
pub struct CustomerQuery {
    /// Case-insensitive match on name, email or phone digits.
    pub search: Option<String>,
    pub city: Option<String>,
    pub active: Option<bool>,
    pub page: u32,
    pub limit: u32,
}

impl CustomerQuery {
    /// Page 1 when unset; limit defaults to 20 and is capped at 100.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.limit = match self.limit {
            0 => crate::order::query::DEFAULT_LIMIT,
            n => n.min(crate::order::query::MAX_LIMIT),
        };
        self
    }

    /// Rows to skip for the requested page.
    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// One page of customers plus the unpaginated total.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerPage {
    pub customers: Vec<Customer>,
    pub total: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures::profile_input as sample_input;

    #[test]
    fn test_validate_normalizes_fields() {
        let profile = sample_input().validate().unwrap();
        assert_eq!(profile.email.as_str(), "maria@example.com");
        assert_eq!(profile.phone.digits(), "31987654321");
        assert_eq!(profile.address.postal_code.as_str(), "30140-060");
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut input = sample_input();
        input.name = String::new();
        input.email = "nope".to_string();
        input.address.postal_code = "123".to_string();
        input.address.city = "  ".to_string();

        let errors = input.validate().unwrap_err();
        assert!(errors.contains("name"));
        assert!(errors.contains("email"));
        assert!(errors.contains("address.postalCode"));
        assert!(errors.contains("address.city"));
        assert!(!errors.contains("phone"));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let json = r#"{"name":"A","email":"a@b.co","phone":"31987654321","senha":"x",
            "address":{"street":"R","number":"1","neighborhood":"B","city":"C","postalCode":"30140060"}}"#;
        assert!(serde_json::from_str::<CustomerProfileInput>(json).is_err());
    }

    #[test]
    fn test_query_offset() {
        let query = CustomerQuery {
            page: 3,
            limit: 20,
            ..CustomerQuery::default()
        };
        assert_eq!(query.offset(), 40);
    }
}
