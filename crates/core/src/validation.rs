//! Field-level validation errors.
//!
//! Input types collect every problem instead of stopping at the first one, so
//! a form can highlight all offending fields in a single round trip.

use core::fmt;

use serde::Serialize;

/// One invalid field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Dotted path of the field, e.g. `items[1].quantity`.
    pub field: String,
    pub message: String,
}

/// A non-empty list of [`FieldError`]s once returned as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Shorthand for a single failing field.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    /// `true` if `field` has at least one error.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Returns `value` when nothing was collected.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field failed.
    pub fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    /// Trims `value` and checks its length in characters.
    ///
    /// Returns the trimmed text even when it is invalid so callers can keep
    /// validating the remaining fields.
    pub fn text(&mut self, field: &str, value: &str, max: usize) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(field, "is required");
        } else if trimmed.chars().count() > max {
            self.push(field, format!("must be at most {max} characters"));
        }
        trimmed.to_owned()
    }

    /// Like [`text`](Self::text) for optional fields; blank becomes `None`.
    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max: usize) -> Option<String> {
        let trimmed = value.map(str::trim).filter(|v| !v.is_empty())?;
        if trimmed.chars().count() > max {
            self.push(field, format!("must be at most {max} characters"));
        }
        Some(trimmed.to_owned())
    }

    /// Records a parse failure and converts the result to an `Option`.
    pub fn parsed<T, E: fmt::Display>(&mut self, field: &str, result: Result<T, E>) -> Option<T> {
        result.map_err(|e| self.push(field, e.to_string())).ok()
    }

    /// Moves every error from `other` under the `prefix.` namespace.
    pub fn merge_nested(&mut self, prefix: &str, other: Self) {
        for error in other.0 {
            self.push(format!("{prefix}.{}", error.field), error.message);
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}
