//! Brazilian phone numbers.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Accepts `+55 (31) 98321-8662`, `31983218662`, `55 31 3321-8662` and friends.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+55|55)?[\s-]?(\(?\d{2}\)?[\s-]?)?[\s-]?9?\d{4}[\s-]?\d{4}$")
        .expect("Invalid regex")
});

/// Country calling code for Brazil.
pub const COUNTRY_CODE: &str = "55";

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input is empty after trimming.
    #[error("phone cannot be empty")]
    Empty,
    /// The input does not look like a Brazilian phone number.
    #[error("phone number is not valid")]
    Malformed,
    /// The number has no area code, so it cannot be reached on WhatsApp.
    #[error("phone number must include the area code")]
    MissingAreaCode,
}

/// A Brazilian phone number, stored as national digits (area code + subscriber).
///
/// ```
/// use delivery_core::Phone;
///
/// let phone = Phone::parse("+55 (31) 98321-8662").unwrap();
/// assert_eq!(phone.digits(), "31983218662");
/// assert_eq!(phone.whatsapp_number(), "5531983218662");
/// assert_eq!(phone.to_string(), "(31) 98321-8662");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    /// Parse a phone number, stripping punctuation and the country code.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError::Malformed`] when the text does not match the
    /// Brazilian format and [`PhoneError::MissingAreaCode`] when it has
    /// fewer than ten national digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }
        if !PHONE_RE.is_match(s) {
            return Err(PhoneError::Malformed);
        }

        let digits: String = s.chars().filter(char::is_ascii_digit).collect();
        let national = match digits.strip_prefix(COUNTRY_CODE) {
            Some(rest) if digits.len() >= 12 => rest.to_owned(),
            _ => digits,
        };

        if national.len() < 10 {
            return Err(PhoneError::MissingAreaCode);
        }

        Ok(Self(national))
    }

    /// National digits, e.g. `31983218662`.
    #[must_use]
    pub fn digits(&self) -> &str {
        &self.0
    }

    /// Digits with the country code, as WhatsApp links expect.
    #[must_use]
    pub fn whatsapp_number(&self) -> String {
        format!("{COUNTRY_CODE}{}", self.0)
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (area, subscriber) = self.0.split_at(2);
        let split = subscriber.len() - 4;
        let (prefix, line) = subscriber.split_at(split);
        write!(f, "({area}) {prefix}-{line}")
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Phone {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Phone {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Phone {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Phone {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
