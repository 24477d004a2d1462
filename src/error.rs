//! Error types for apm-agent-config.

use std::fmt;

/// Result type alias for apm-agent-config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when setting up or reading configuration.
///
/// Nothing on the resolve path (`ConfigManager::ensure_has_latest_config`)
/// surfaces one of these to the caller: source failures degrade to "absent"
/// and parse failures degrade to the option's default.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The compiled-in option catalogue is inconsistent (duplicate or missing entry).
    #[error("Invalid option metadata: {0}")]
    Metadata(String),

    /// Failed to load raw values from a source.
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    /// Generic error for other cases.
    #[error("Configuration error: {0}")]
    Other(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// Failure to convert raw option text into a typed value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Text is not one of the accepted boolean spellings.
    #[error("`{0}` is not a boolean (expected one of true/false/yes/no/on/off/1/0)")]
    InvalidBool(String),

    /// Text is not a decimal integer.
    #[error("`{0}` is not a decimal integer")]
    InvalidInteger(String),

    /// Integer does not fit the destination width.
    #[error("`{0}` is out of range for the destination type")]
    IntegerOverflow(String),

    /// Negative magnitude where the destination is unsigned.
    #[error("`{0}` must not be negative")]
    Negative(String),

    /// Unit suffix is not recognized.
    #[error("unknown unit `{unit}` (expected one of: {expected})")]
    UnknownUnits {
        /// The suffix found in the text
        unit: String,
        /// Comma separated list of accepted suffixes
        expected: String,
    },

    /// Text is not a finite decimal number.
    #[error("`{0}` is not a decimal number")]
    InvalidNumber(String),

    /// Text matches none of the level names.
    #[error("`{value}` is not a valid level (expected one of: {expected})")]
    UnknownLevel {
        /// Offending text
        value: String,
        /// Comma separated list of accepted names
        expected: String,
    },

    /// Text is a prefix of more than one level name.
    #[error("`{value}` is ambiguous: matches both `{first}` and `{second}`")]
    AmbiguousLevel {
        /// Offending text
        value: String,
        /// First matching level name
        first: String,
        /// Second matching level name
        second: String,
    },

    /// A key/value map record has no `=` or an empty key.
    #[error("`{0}` is not a key=value pair")]
    InvalidMapEntry(String),
}

/// Why an option's raw value was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RejectedValue {
    /// The text does not parse as the option's type.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The parsed value is outside the option's allowed range.
    #[error(transparent)]
    Constraint(#[from] ValidationError),
}

/// Validation error for option-level constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Custom validation error with a message.
    Custom(String),

    /// A specific option has an invalid value.
    InvalidField {
        /// The option name
        field: String,
        /// The reason why it's invalid
        reason: String,
    },

    /// Multiple validation errors occurred.
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// Create a custom validation error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(msg) => write!(f, "{}", msg),
            Self::InvalidField { field, reason } => {
                write!(f, "Option '{}' is invalid: {}", field, reason)
            }
            Self::Multiple(errors) => {
                writeln!(f, "Multiple validation errors:")?;
                for (i, err) in errors.iter().enumerate() {
                    writeln!(f, "  {}. {}", i + 1, err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}
