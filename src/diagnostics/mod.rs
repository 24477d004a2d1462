//! Supportability report of the effective configuration.
//!
//! Secret options never show their text here: both the parsed and the raw
//! value are replaced by [`REDACTED`]. Absent values stay absent.

mod render;
mod report;

pub use report::{DiagnosticsReport, OptionRow, SourceRow, SourceTable};

use crate::options::{OptionMetadata, OptionValue};

/// Replaces the text of secret options.
pub const REDACTED: &str = "***";

/// Shown in the `Source` column when the default is in effect.
pub const DEFAULT_ORIGIN: &str = "Default";

/// Display text of `value`, redacted if `meta` is secret and the value is set.
pub fn redact_value(meta: &OptionMetadata, value: &OptionValue) -> String {
    if meta.is_secret && !value.is_unset() {
        REDACTED.to_string()
    } else {
        value.to_string()
    }
}

/// `raw`, redacted if `meta` is secret. `None` stays `None`.
pub fn redact_raw(meta: &OptionMetadata, raw: Option<&str>) -> Option<String> {
    raw.map(|text| {
        if meta.is_secret {
            REDACTED.to_string()
        } else {
            text.to_string()
        }
    })
}
