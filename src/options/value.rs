//! Typed option values and the value-type descriptors used by the parsers.

use serde::Serialize;
use std::fmt;
use tracing::level_filters::LevelFilter;

/// Text shown wherever an option has no value at all.
pub const NO_VALUE: &str = "no value";

/// Text shown for a level or optional bool that was left unset.
pub const NOT_SET: &str = "not set";

/// Units accepted as a duration suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DurationUnits {
    /// `ms`
    Milliseconds,
    /// `s`
    Seconds,
    /// `m`
    Minutes,
}

impl DurationUnits {
    /// All duration units, in suffix-matching order.
    pub const ALL: [DurationUnits; 3] = [
        DurationUnits::Milliseconds,
        DurationUnits::Seconds,
        DurationUnits::Minutes,
    ];

    /// Suffix spelling of the unit.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
            Self::Minutes => "m",
        }
    }

    /// Number of milliseconds in one unit.
    pub fn millis(self) -> i64 {
        match self {
            Self::Milliseconds => 1,
            Self::Seconds => 1_000,
            Self::Minutes => 60 * 1_000,
        }
    }
}

/// Units accepted as a size suffix. Multiples are binary (1024-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SizeUnits {
    /// `b`
    Bytes,
    /// `kb`
    Kibibytes,
    /// `mb`
    Mebibytes,
    /// `gb`
    Gibibytes,
}

impl SizeUnits {
    /// All size units, in suffix-matching order.
    pub const ALL: [SizeUnits; 4] = [
        SizeUnits::Bytes,
        SizeUnits::Kibibytes,
        SizeUnits::Mebibytes,
        SizeUnits::Gibibytes,
    ];

    /// Suffix spelling of the unit.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Bytes => "b",
            Self::Kibibytes => "kb",
            Self::Mebibytes => "mb",
            Self::Gibibytes => "gb",
        }
    }

    /// Number of bytes in one unit.
    pub fn bytes(self) -> u64 {
        match self {
            Self::Bytes => 1,
            Self::Kibibytes => 1 << 10,
            Self::Mebibytes => 1 << 20,
            Self::Gibibytes => 1 << 30,
        }
    }
}

/// A fixed, ordered list of level names an enumerated option is parsed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LevelScale {
    /// Log verbosity, see [`LogLevel`].
    Log,
    /// Allocation tracking depth.
    MemoryTracking,
    /// Depth of internal consistency checks (also used for assertions).
    InternalChecks,
}

const LOG_LEVEL_NAMES: [&str; 7] = [
    "OFF", "CRITICAL", "ERROR", "WARNING", "INFO", "DEBUG", "TRACE",
];

const MEMORY_TRACKING_LEVEL_NAMES: [&str; 5] = [
    "OFF",
    "total_count_only",
    "each_allocation",
    "each_allocation_with_stack_trace",
    "ALL",
];

const INTERNAL_CHECKS_LEVEL_NAMES: [&str; 5] = ["OFF", "LOW", "MEDIUM", "HIGH", "ALL"];

impl LevelScale {
    /// Level names in ordinal order.
    pub fn names(self) -> &'static [&'static str] {
        match self {
            Self::Log => &LOG_LEVEL_NAMES,
            Self::MemoryTracking => &MEMORY_TRACKING_LEVEL_NAMES,
            Self::InternalChecks => &INTERNAL_CHECKS_LEVEL_NAMES,
        }
    }

    /// Name of the level with the given ordinal, if in range.
    pub fn name(self, ordinal: usize) -> Option<&'static str> {
        self.names().get(ordinal).copied()
    }
}

/// Log verbosity, ordered from least to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum LogLevel {
    /// Nothing is logged.
    Off = 0,
    /// Only critical failures.
    Critical,
    /// Errors.
    Error,
    /// Warnings.
    Warning,
    /// Informational messages.
    Info,
    /// Debug messages.
    Debug,
    /// Everything.
    Trace,
}

impl LogLevel {
    /// Convert a [`LevelScale::Log`] ordinal into a level.
    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        match ordinal {
            0 => Some(Self::Off),
            1 => Some(Self::Critical),
            2 => Some(Self::Error),
            3 => Some(Self::Warning),
            4 => Some(Self::Info),
            5 => Some(Self::Debug),
            6 => Some(Self::Trace),
            _ => None,
        }
    }

    /// Canonical upper-case name.
    pub fn name(self) -> &'static str {
        LOG_LEVEL_NAMES[self as usize]
    }

    /// Equivalent `tracing` filter. `Critical` has no direct counterpart and maps to `ERROR`.
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::OFF,
            Self::Critical | Self::Error => LevelFilter::ERROR,
            Self::Warning => LevelFilter::WARN,
            Self::Info => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Describes how an option's raw text is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueType {
    /// `true/false/yes/no/on/off/1/0`
    Bool,
    /// Same vocabulary as `Bool`, but the default may be "not set".
    OptionalBool,
    /// Signed 64-bit decimal integer.
    Int,
    /// Unsigned 64-bit decimal integer.
    UInt,
    /// Integer plus optional `ms`/`s`/`m` suffix; normalized to milliseconds.
    Duration {
        /// Units assumed when the text has no suffix
        default_units: DurationUnits,
    },
    /// Integer plus optional `b`/`kb`/`mb`/`gb` suffix; normalized to bytes.
    Size {
        /// Units assumed when the text has no suffix
        default_units: SizeUnits,
    },
    /// Decimal fraction. Range is enforced by the option's constraint, not the parser.
    Rate,
    /// One name out of a fixed ordered list.
    Level {
        /// The list of names
        scale: LevelScale,
        /// Accept an unambiguous prefix of a name
        unique_prefix_enough: bool,
    },
    /// Verbatim text.
    String,
    /// Comma separated list.
    List,
    /// Comma separated `key=value` pairs.
    Map,
}

impl ValueType {
    /// Short human-readable type name.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::OptionalBool => "optional bool",
            Self::Int => "int",
            Self::UInt => "unsigned int",
            Self::Duration { .. } => "duration",
            Self::Size { .. } => "size",
            Self::Rate => "rate",
            Self::Level { .. } => "level",
            Self::String => "string",
            Self::List => "list",
            Self::Map => "map",
        }
    }
}

/// A parsed, typed option value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum OptionValue {
    /// Boolean.
    Bool(bool),
    /// Boolean that may be unset.
    OptionalBool(Option<bool>),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Duration in milliseconds. May be negative where the option allows it.
    Duration(i64),
    /// Size in bytes.
    Size(u64),
    /// Fraction.
    Rate(f64),
    /// Ordinal into the scale's name list; `None` when not set.
    Level {
        /// Name list the ordinal refers to
        scale: LevelScale,
        /// Position in the list
        ordinal: Option<usize>,
    },
    /// Text; `None` when the option has no value.
    String(Option<String>),
    /// Trimmed, non-empty elements.
    List(Vec<String>),
    /// Ordered pairs, keys unique.
    Map(Vec<(String, String)>),
}

impl OptionValue {
    /// Whether this value is of the shape produced by parsers of `value_type`.
    pub fn matches(&self, value_type: &ValueType) -> bool {
        match (self, value_type) {
            (Self::Level { scale, .. }, ValueType::Level { scale: expected, .. }) => {
                scale == expected
            }
            (Self::Bool(_), ValueType::Bool)
            | (Self::OptionalBool(_), ValueType::OptionalBool)
            | (Self::Int(_), ValueType::Int)
            | (Self::UInt(_), ValueType::UInt)
            | (Self::Duration(_), ValueType::Duration { .. })
            | (Self::Size(_), ValueType::Size { .. })
            | (Self::Rate(_), ValueType::Rate)
            | (Self::String(_), ValueType::String)
            | (Self::List(_), ValueType::List)
            | (Self::Map(_), ValueType::Map) => true,
            _ => false,
        }
    }

    /// The boolean, for `Bool` and a set `OptionalBool`.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(value) => Some(value),
            Self::OptionalBool(value) => value,
            _ => None,
        }
    }

    /// The number, for `Int` and `Duration` (milliseconds).
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int(value) | Self::Duration(value) => Some(value),
            _ => None,
        }
    }

    /// The number, for `UInt` and `Size` (bytes).
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::UInt(value) | Self::Size(value) => Some(value),
            _ => None,
        }
    }

    /// The fraction, for `Rate`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Rate(value) => Some(value),
            _ => None,
        }
    }

    /// The text, for a `String` that has a value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => value.as_deref(),
            _ => None,
        }
    }

    /// The elements, for `List`.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The pairs, for `Map`.
    pub fn as_map(&self) -> Option<&[(String, String)]> {
        match self {
            Self::Map(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// The ordinal, for a `Level` that is set.
    pub fn level_ordinal(&self) -> Option<usize> {
        match *self {
            Self::Level { ordinal, .. } => ordinal,
            _ => None,
        }
    }

    /// Whether the value carries nothing (unset level or optional bool, or string without value).
    pub fn is_unset(&self) -> bool {
        matches!(
            self,
            Self::OptionalBool(None) | Self::Level { ordinal: None, .. } | Self::String(None)
        )
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{}", value),
            Self::OptionalBool(Some(value)) => write!(f, "{}", value),
            Self::OptionalBool(None) => f.write_str(NOT_SET),
            Self::Int(value) => write!(f, "{}", value),
            Self::UInt(value) => write!(f, "{}", value),
            Self::Duration(millis) => write!(f, "{}ms", millis),
            Self::Size(bytes) => write!(f, "{}B", bytes),
            Self::Rate(rate) => write!(f, "{}", rate),
            Self::Level { scale, ordinal } => {
                match ordinal.and_then(|ordinal| scale.name(ordinal)) {
                    Some(name) => f.write_str(name),
                    None => f.write_str(NOT_SET),
                }
            }
            Self::String(Some(text)) => f.write_str(text),
            Self::String(None) => f.write_str(NO_VALUE),
            Self::List(items) => f.write_str(&items.join(",")),
            Self::Map(pairs) => {
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                Ok(())
            }
        }
    }
}
