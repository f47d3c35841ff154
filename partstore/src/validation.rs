//! Validation Support
//!
//! Create/update payloads and import rows implement [`Validatable`], which
//! collects every field problem at once instead of stopping at the first one.
//!
//! ```rust,ignore
//! impl Validatable for CategoryCreate {
//!     fn validate(&self) -> Result<(), ValidationErrors> {
//!         let mut errors = ValidationErrors::new();
//!         errors.check(validators::validate_required("name", &self.name));
//!         errors.result()
//!     }
//! }
//! ```

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Validation error with field name and message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Record the error of a single-field check, if it failed
    pub fn check(&mut self, outcome: Result<(), ValidationError>) {
        if let Err(error) = outcome {
            self.errors.push(error);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// All messages joined into one line, the format used by the import ledger
    #[must_use]
    pub fn joined(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Convert to Result
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one error was recorded.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Types that can check their own field constraints before touching storage
pub trait Validatable {
    /// # Errors
    ///
    /// Returns every field constraint that does not hold.
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Helper validators for common patterns
pub mod validators {
    use super::{Decimal, ValidationError};

    /// Value must contain something other than whitespace
    ///
    /// # Errors
    ///
    /// Fails for empty or blank strings.
    pub fn validate_required(field: &str, value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new(field, "This field is required"));
        }
        Ok(())
    }

    /// Character count must not exceed `max`
    ///
    /// # Errors
    ///
    /// Fails when the value is longer than `max` characters.
    pub fn validate_max_length(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
        if value.chars().count() > max {
            return Err(ValidationError::new(
                field,
                format!("Must be at most {max} characters"),
            ));
        }
        Ok(())
    }

    /// Integer must lie within `[min, max]`
    ///
    /// # Errors
    ///
    /// Fails when the value is out of range.
    pub fn validate_range(field: &str, value: i64, min: i64, max: i64) -> Result<(), ValidationError> {
        if value < min || value > max {
            return Err(ValidationError::new(
                field,
                format!("Must be between {min} and {max}"),
            ));
        }
        Ok(())
    }

    /// Integer quantities such as stock levels cannot go below zero
    ///
    /// # Errors
    ///
    /// Fails for negative values.
    pub fn validate_non_negative(field: &str, value: i64) -> Result<(), ValidationError> {
        if value < 0 {
            return Err(ValidationError::new(field, "must not be negative"));
        }
        Ok(())
    }

    /// Monetary amounts cannot go below zero
    ///
    /// # Errors
    ///
    /// Fails for negative amounts.
    pub fn validate_price(field: &str, value: Decimal) -> Result<(), ValidationError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ValidationError::new(field, "must not be negative"));
        }
        Ok(())
    }

    /// Feed prices arrive as floats; they must be finite and non-negative
    ///
    /// # Errors
    ///
    /// Fails for a missing, non-finite or negative value.
    pub fn validate_feed_price(field: &str, value: Option<f64>) -> Result<Decimal, ValidationError> {
        let Some(value) = value else {
            return Err(ValidationError::new(field, "is required"));
        };
        if !value.is_finite() {
            return Err(ValidationError::new(field, "must be a finite number"));
        }
        if value < 0.0 {
            return Err(ValidationError::new(field, "must not be negative"));
        }
        Decimal::try_from(value)
            .map(|price| price.round_dp(2))
            .map_err(|_| ValidationError::new(field, "is outside the supported range"))
    }
}
