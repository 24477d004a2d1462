//! Raw text to typed value parsers.
//!
//! Every parser is a pure function: no I/O, no panics, and every input that is
//! not accepted yields a [`ParseError`]. Range checks that depend on the option
//! (e.g. a sample rate being within `[0, 1]`) are not done here; see
//! [`crate::core::Constraint`].

use super::value::{DurationUnits, LevelScale, OptionValue, SizeUnits, ValueType};
use crate::error::ParseError;
use std::num::IntErrorKind;

const TRUE_VALUES: [&str; 4] = ["true", "1", "yes", "on"];
const FALSE_VALUES: [&str; 4] = ["false", "0", "no", "off"];

/// Delimiter between list elements and between map records.
pub const LIST_DELIMITER: char = ',';

/// Delimiter between a map record's key and value.
pub const MAP_KEY_VALUE_DELIMITER: char = '=';

/// Parse `text` according to `value_type`.
pub fn parse_value(value_type: &ValueType, text: &str) -> Result<OptionValue, ParseError> {
    Ok(match *value_type {
        ValueType::Bool => OptionValue::Bool(parse_bool(text)?),
        ValueType::OptionalBool => OptionValue::OptionalBool(Some(parse_bool(text)?)),
        ValueType::Int => OptionValue::Int(parse_int(text)?),
        ValueType::UInt => OptionValue::UInt(parse_uint(text)?),
        ValueType::Duration { default_units } => {
            OptionValue::Duration(parse_duration(text, default_units)?)
        }
        ValueType::Size { default_units } => OptionValue::Size(parse_size(text, default_units)?),
        ValueType::Rate => OptionValue::Rate(parse_rate(text)?),
        ValueType::Level {
            scale,
            unique_prefix_enough,
        } => OptionValue::Level {
            scale,
            ordinal: Some(parse_level(text, scale, unique_prefix_enough)?),
        },
        ValueType::String => OptionValue::String(Some(parse_string(text))),
        ValueType::List => OptionValue::List(parse_list(text)),
        ValueType::Map => OptionValue::Map(parse_map(text)?),
    })
}

/// Parse a boolean.
///
/// Accepted (case-insensitive): `true`, `1`, `yes`, `on` and `false`, `0`,
/// `no`, `off`. Surrounding whitespace is ignored. Anything else is an error,
/// including the empty string.
pub fn parse_bool(text: &str) -> Result<bool, ParseError> {
    let trimmed = text.trim();
    if TRUE_VALUES.iter().any(|v| v.eq_ignore_ascii_case(trimmed)) {
        return Ok(true);
    }
    if FALSE_VALUES.iter().any(|v| v.eq_ignore_ascii_case(trimmed)) {
        return Ok(false);
    }
    Err(ParseError::InvalidBool(text.to_string()))
}

/// Parse a signed decimal integer with optional sign and surrounding whitespace.
pub fn parse_int(text: &str) -> Result<i64, ParseError> {
    let trimmed = text.trim();
    check_decimal_digits(trimmed, text)?;
    trimmed.parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            ParseError::IntegerOverflow(text.to_string())
        }
        _ => ParseError::InvalidInteger(text.to_string()),
    })
}

/// Parse an unsigned decimal integer. A leading `-` is rejected.
pub fn parse_uint(text: &str) -> Result<u64, ParseError> {
    let trimmed = text.trim();
    check_decimal_digits(trimmed, text)?;
    if trimmed.starts_with('-') {
        return Err(ParseError::Negative(text.to_string()));
    }
    trimmed.parse::<u64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => ParseError::IntegerOverflow(text.to_string()),
        _ => ParseError::InvalidInteger(text.to_string()),
    })
}

/// Reject anything but an optional single sign followed by at least one digit.
fn check_decimal_digits(trimmed: &str, original: &str) -> Result<(), ParseError> {
    let digits = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('+'))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidInteger(original.to_string()));
    }
    Ok(())
}

/// Split `<int><suffix>` into the integer part and the (possibly empty) suffix.
///
/// The integer part ends at the first character that is neither a digit nor a
/// sign. Both parts are trimmed, so `"5 s"` is accepted.
fn split_units(text: &str) -> (&str, &str) {
    let trimmed = text.trim();
    let boundary = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '-' || c == '+'))
        .unwrap_or(trimmed.len());
    let (number, suffix) = trimmed.split_at(boundary);
    (number.trim(), suffix.trim())
}

fn unknown_units(suffix: &str, expected: impl Iterator<Item = &'static str>) -> ParseError {
    ParseError::UnknownUnits {
        unit: suffix.to_string(),
        expected: expected.collect::<Vec<_>>().join(", "),
    }
}

/// Parse a duration and normalize it to milliseconds.
///
/// Accepted: `<int>`, `<int>ms`, `<int>s`, `<int>m` (suffix case-insensitive).
/// A bare integer is in `default_units`. Negative magnitudes are accepted here;
/// options that forbid them say so through their constraint.
pub fn parse_duration(text: &str, default_units: DurationUnits) -> Result<i64, ParseError> {
    let (number, suffix) = split_units(text);
    let units = if suffix.is_empty() {
        default_units
    } else {
        DurationUnits::ALL
            .into_iter()
            .find(|units| units.suffix().eq_ignore_ascii_case(suffix))
            .ok_or_else(|| unknown_units(suffix, DurationUnits::ALL.iter().map(|u| u.suffix())))?
    };
    let magnitude = parse_int(number).map_err(|e| reattach(e, text))?;
    magnitude
        .checked_mul(units.millis())
        .ok_or_else(|| ParseError::IntegerOverflow(text.to_string()))
}

/// Parse a size and normalize it to bytes.
///
/// Accepted: `<int>`, `<int>b`, `<int>kb`, `<int>mb`, `<int>gb` (suffix
/// case-insensitive, 1024-based). A bare integer is in `default_units`.
pub fn parse_size(text: &str, default_units: SizeUnits) -> Result<u64, ParseError> {
    let (number, suffix) = split_units(text);
    let units = if suffix.is_empty() {
        default_units
    } else {
        SizeUnits::ALL
            .into_iter()
            .find(|units| units.suffix().eq_ignore_ascii_case(suffix))
            .ok_or_else(|| unknown_units(suffix, SizeUnits::ALL.iter().map(|u| u.suffix())))?
    };
    let magnitude = parse_uint(number).map_err(|e| reattach(e, text))?;
    magnitude
        .checked_mul(units.bytes())
        .ok_or_else(|| ParseError::IntegerOverflow(text.to_string()))
}

/// Report the whole input rather than only the numeric part.
fn reattach(err: ParseError, text: &str) -> ParseError {
    match err {
        ParseError::InvalidInteger(_) => ParseError::InvalidInteger(text.to_string()),
        ParseError::IntegerOverflow(_) => ParseError::IntegerOverflow(text.to_string()),
        ParseError::Negative(_) => ParseError::Negative(text.to_string()),
        other => other,
    }
}

/// Parse a finite decimal number. No range check.
pub fn parse_rate(text: &str) -> Result<f64, ParseError> {
    let trimmed = text.trim();
    match trimmed.parse::<f64>() {
        Ok(rate) if rate.is_finite() => Ok(rate),
        _ => Err(ParseError::InvalidNumber(text.to_string())),
    }
}

/// Match `text` against the scale's names, case-insensitively, returning the ordinal.
///
/// An exact match always wins. Otherwise, when `unique_prefix_enough` is set,
/// a prefix of exactly one name is accepted; a prefix of several names is
/// ambiguous.
pub fn parse_level(
    text: &str,
    scale: LevelScale,
    unique_prefix_enough: bool,
) -> Result<usize, ParseError> {
    let trimmed = text.trim();
    let names = scale.names();

    if !trimmed.is_empty() {
        if let Some(ordinal) = names.iter().position(|n| n.eq_ignore_ascii_case(trimmed)) {
            return Ok(ordinal);
        }

        if unique_prefix_enough {
            let mut found: Option<usize> = None;
            for (ordinal, name) in names.iter().enumerate() {
                let is_prefix = name.len() > trimmed.len()
                    && name.as_bytes()[..trimmed.len()].eq_ignore_ascii_case(trimmed.as_bytes());
                if !is_prefix {
                    continue;
                }
                if let Some(previous) = found {
                    return Err(ParseError::AmbiguousLevel {
                        value: text.to_string(),
                        first: names[previous].to_string(),
                        second: name.to_string(),
                    });
                }
                found = Some(ordinal);
            }
            if let Some(ordinal) = found {
                return Ok(ordinal);
            }
        }
    }

    Err(ParseError::UnknownLevel {
        value: text.to_string(),
        expected: names.join(", "),
    })
}

/// The raw text, unchanged.
pub fn parse_string(text: &str) -> String {
    text.to_string()
}

/// Split on `,`, trim each element and drop empty ones.
pub fn parse_list(text: &str) -> Vec<String> {
    text.split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split on `,` into records and each record on the first `=`.
///
/// Keys and values are trimmed, empty records are skipped, and a repeated key
/// keeps its first position but takes the last value.
pub fn parse_map(text: &str) -> Result<Vec<(String, String)>, ParseError> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for record in text.split(LIST_DELIMITER).map(str::trim) {
        if record.is_empty() {
            continue;
        }
        let (key, value) = record
            .split_once(MAP_KEY_VALUE_DELIMITER)
            .ok_or_else(|| ParseError::InvalidMapEntry(record.to_string()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ParseError::InvalidMapEntry(record.to_string()));
        }
        let value = value.trim().to_string();
        match pairs.iter_mut().find(|(existing, _)| existing == key) {
            Some(entry) => entry.1 = value,
            None => pairs.push((key.to_string(), value)),
        }
    }
    Ok(pairs)
}
