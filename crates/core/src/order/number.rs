use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OrderNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("order number must be a positive number")]
pub struct OrderNumberError;

/// Human-facing order number, shown zero-padded to six digits (`000042`).
///
/// Backed by the sequence value, so ordering and uniqueness follow the
/// sequence. Parsing accepts padded and unpadded forms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(i64);

impl OrderNumber {
    #[must_use]
    pub const fn new(sequence: i64) -> Self {
        Self(sequence)
    }

    /// The raw sequence value.
    #[must_use]
    pub const fn sequence(&self) -> i64 {
        self.0
    }

    /// The number that follows this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0)
    }
}

impl FromStr for OrderNumber {
    type Err = OrderNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('#');
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(OrderNumberError);
        }
        match s.parse::<i64>() {
            Ok(n) if n > 0 => Ok(Self(n)),
            _ => Err(OrderNumberError),
        }
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = OrderNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrderNumber> for String {
    fn from(number: OrderNumber) -> Self {
        number.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_zero_padded() {
        assert_eq!(OrderNumber::new(1).to_string(), "000001");
        assert_eq!(OrderNumber::new(1_234_567).to_string(), "1234567");
    }

    #[test]
    fn test_parse_accepts_padded_and_plain() {
        assert_eq!("000042".parse::<OrderNumber>().unwrap(), OrderNumber::new(42));
        assert_eq!("42".parse::<OrderNumber>().unwrap(), OrderNumber::new(42));
        assert_eq!("#000042".parse::<OrderNumber>().unwrap(), OrderNumber::new(42));
    }

    #[test]
    fn test_parse_rejects_invalid() {
        for input in ["", "0", "000000", "-1", "12a", "abc"] {
            assert!(input.parse::<OrderNumber>().is_err(), "{input}");
        }
    }

    #[test]
    fn test_serializes_as_padded_string() {
        assert_eq!(serde_json::to_string(&OrderNumber::new(7)).unwrap(), "\"000007\"");
    }
}
