//! Option-level validation support.
//!
//! Parsers only check syntax. Whether a syntactically valid value is acceptable
//! for a particular option (a sample rate above 1, a negative timeout) is
//! decided here.

use crate::error::ValidationError;
use crate::options::OptionValue;
use serde::Serialize;

/// Trait for validation of a whole structure.
///
/// Implemented by the option catalogue so that a defective table is caught
/// at startup.
pub trait Validate {
    /// Validate the structure.
    ///
    /// # Errors
    ///
    /// Should return a `ValidationError` describing what validation failed.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Range restriction applied to an option's parsed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Constraint {
    /// Any value the parser accepts.
    None,
    /// Integer and duration values must be `>= 0`.
    NonNegative,
    /// Integer and duration values must be `>= n`.
    AtLeast(i64),
    /// Rates must be within `[0, 1]`.
    UnitInterval,
}

impl Constraint {
    /// Check `value` of the option `name` against this constraint.
    ///
    /// Values of a kind the constraint does not talk about pass.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidField` naming the option when the value
    /// is out of range.
    pub fn check(&self, name: &str, value: &OptionValue) -> Result<(), ValidationError> {
        match (*self, value) {
            (Constraint::None, _) => Ok(()),
            (Constraint::NonNegative, OptionValue::Int(n) | OptionValue::Duration(n)) if *n < 0 => {
                Err(ValidationError::invalid_field(name, "must not be negative"))
            }
            (Constraint::AtLeast(min), OptionValue::Int(n) | OptionValue::Duration(n))
                if *n < min =>
            {
                Err(ValidationError::invalid_field(
                    name,
                    format!("must be at least {}", min),
                ))
            }
            (Constraint::UnitInterval, OptionValue::Rate(rate))
                if !(0.0..=1.0).contains(rate) =>
            {
                Err(ValidationError::invalid_field(name, "must be within [0, 1]"))
            }
            _ => Ok(()),
        }
    }
}
