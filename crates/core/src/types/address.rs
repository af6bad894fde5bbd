//! Delivery addresses and postal codes (CEP).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PostalCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PostalCodeError {
    /// The input is not `12345-678` or `12345678`.
    #[error("postal code must look like 12345-678")]
    Malformed,
}

/// A Brazilian postal code, normalized to `12345-678`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostalCode(String);

impl PostalCode {
    /// Parse a CEP with or without the hyphen.
    ///
    /// # Errors
    ///
    /// Returns [`PostalCodeError::Malformed`] for anything but eight digits
    /// with an optional hyphen after the fifth.
    pub fn parse(s: &str) -> Result<Self, PostalCodeError> {
        let s = s.trim();
        let digits: String = match s.split_once('-') {
            Some((head, tail)) if head.len() == 5 && tail.len() == 3 => format!("{head}{tail}"),
            Some(_) => return Err(PostalCodeError::Malformed),
            None => s.to_owned(),
        };
        if digits.len() != 8 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PostalCodeError::Malformed);
        }
        let (head, tail) = digits.split_at(5);
        Ok(Self(format!("{head}-{tail}")))
    }

    /// Returns the formatted CEP.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PostalCode {
    type Error = PostalCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PostalCode> for String {
    fn from(code: PostalCode) -> Self {
        code.0
    }
}

/// Where an order is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub postal_code: PostalCode,
    /// Landmark to help the courier ("next to the bakery").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Address {
    /// One-line rendering used in notifications: `Rua A, 12 - Apto 3`.
    #[must_use]
    pub fn street_line(&self) -> String {
        match &self.complement {
            Some(complement) => format!("{}, {} - {complement}", self.street, self.number),
            None => format!("{}, {}", self.street, self.number),
        }
    }

    /// The address without street details, safe to show on public pages.
    #[must_use]
    pub fn partial(&self) -> PartialAddress {
        PartialAddress {
            street: self.street.clone(),
            number: self.number.clone(),
            neighborhood: self.neighborhood.clone(),
            city: self.city.clone(),
        }
    }
}

/// Public view of an [`Address`], without complement, CEP or reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialAddress {
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub city: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_postal_code_formats() {
        assert_eq!(PostalCode::parse("30130-010").unwrap().as_str(), "30130-010");
        assert_eq!(PostalCode::parse("30130010").unwrap().as_str(), "30130-010");
        assert_eq!(PostalCode::parse(" 30130010 ").unwrap().as_str(), "30130-010");
    }

    #[test]
    fn test_postal_code_rejects_garbage() {
        for input in ["", "3013-0010", "3013001", "301300100", "abcde-fgh"] {
            assert_eq!(PostalCode::parse(input), Err(PostalCodeError::Malformed), "{input}");
        }
    }

    #[test]
    fn test_street_line() {
        let mut address = Address {
            street: "Rua da Bahia".to_string(),
            number: "1200".to_string(),
            complement: None,
            neighborhood: "Centro".to_string(),
            city: "Belo Horizonte".to_string(),
            postal_code: PostalCode::parse("30160-011").unwrap(),
            reference: None,
        };
        assert_eq!(address.street_line(), "Rua da Bahia, 1200");
        address.complement = Some("Loja 2".to_string());
        assert_eq!(address.street_line(), "Rua da Bahia, 1200 - Loja 2");
    }
}
