//! Configuration source trait and the fixed source precedence.

use super::RawValues;
use crate::error::Result;
use serde::Serialize;
use std::fmt;

/// Identifies a configuration source. Declaration order is precedence order:
/// a value from an earlier source wins over a value from a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RawConfigSourceId {
    /// The directive file (INI style `elastic_apm.<name> = ...` entries).
    DirectiveFile,
    /// Process environment variables (`ELASTIC_APM_<NAME>`).
    EnvVars,
}

impl RawConfigSourceId {
    /// Number of configuration sources.
    pub const COUNT: usize = 2;

    /// All sources, highest precedence first.
    pub const ALL: [RawConfigSourceId; Self::COUNT] =
        [RawConfigSourceId::DirectiveFile, RawConfigSourceId::EnvVars];

    /// Position in the precedence order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Human-readable description, as shown in diagnostics.
    pub fn description(self) -> &'static str {
        match self {
            Self::DirectiveFile => "INI file",
            Self::EnvVars => "Environment variables",
        }
    }
}

impl fmt::Display for RawConfigSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Trait for configuration sources.
///
/// A source hands out a point-in-time [`RawValues`] view keyed by its own key
/// spelling (e.g. `elastic_apm.log_level` or `ELASTIC_APM_LOG_LEVEL`). Absence of
/// a key is a normal result, not an error.
///
/// Implement this trait to plug in a custom source (tests use an in-memory one).
pub trait ConfigSource: Send + Sync {
    /// Load every raw value this source currently provides.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read at all. Callers treat a
    /// failed source as empty.
    fn load(&self) -> Result<RawValues>;

    /// Get a human-readable name for this source (for logging/debugging).
    fn name(&self) -> String;

    /// Whether an empty value is given a type-specific meaning (`false` for
    /// booleans, `off` for levels), as INI style directive files do.
    fn interprets_empty_values(&self) -> bool {
        false
    }
}
