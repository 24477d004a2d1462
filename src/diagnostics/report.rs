//! Report data model and its construction from a manager.

use super::{DEFAULT_ORIGIN, REDACTED, redact_raw, redact_value};
use crate::core::{ConfigManager, OptionStatus};
use crate::options::OptionId;
use crate::sources::RawConfigSourceId;
use serde::Serialize;

/// One line of the option table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionRow {
    /// Option name.
    pub option: String,
    /// Effective value as text.
    pub parsed_value: String,
    /// Raw text from the source, `None` when no source supplied one.
    pub raw_value: Option<String>,
    /// Source description, or `Default` when the default is in effect.
    pub source: String,
    /// Source whose value was rejected, if any.
    pub rejected_source: Option<RawConfigSourceId>,
    /// Why that value was rejected.
    pub error: Option<String>,
    /// Whether the option is redacted.
    pub is_secret: bool,
    /// Whether the option is re-resolved on rebuild.
    pub is_dynamic: bool,
}

/// One line of a per-source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRow {
    /// The option's key in this source.
    pub name: String,
    /// Raw text this source held when the current snapshot was built.
    pub used_raw: Option<String>,
    /// The same text after the source's empty-value interpretation.
    pub used_interpreted: Option<String>,
    /// What the source holds for the key right now.
    pub current: Option<String>,
}

/// Keys and raw values of one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceTable {
    /// Which source.
    pub source: RawConfigSourceId,
    /// Human-readable description of the source.
    pub description: String,
    /// One row per option.
    pub rows: Vec<SourceRow>,
}

/// Redacted view of the current snapshot and every source.
///
/// Renders as plain-text tables through `Display`.
///
/// # Examples
///
/// ```rust
/// use apm_agent_config::prelude::*;
///
/// let manager = ConfigManager::builder()
///     .with_env_vars([("ELASTIC_APM_SECRET_TOKEN", "s3cr3t")])
///     .build()
///     .unwrap();
/// manager.ensure_has_latest_config();
///
/// let report = manager.diagnostics();
/// assert!(!report.to_string().contains("s3cr3t"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticsReport {
    /// Generation of the snapshot the report describes.
    pub generation: u64,
    /// Fingerprint of the snapshot the report describes.
    pub fingerprint: String,
    /// One row per option, in option order.
    pub options: Vec<OptionRow>,
    /// One table per source, in precedence order.
    pub sources: Vec<SourceTable>,
}

impl DiagnosticsReport {
    pub(crate) fn build(manager: &ConfigManager) -> Self {
        let snapshot = manager.get();
        let metadata = manager.metadata();

        let options = snapshot
            .iter()
            .map(|(id, resolved)| {
                let meta = metadata.get(id);
                let raw = resolved.raw.as_ref();
                let (source, rejected_source, error) = match (&resolved.status, raw) {
                    (OptionStatus::Parsed, Some(raw)) => {
                        (raw.source.description().to_string(), None, None)
                    }
                    (OptionStatus::Invalid { error }, raw) => {
                        let error = if meta.is_secret {
                            REDACTED.to_string()
                        } else {
                            error.clone()
                        };
                        (
                            DEFAULT_ORIGIN.to_string(),
                            raw.map(|raw| raw.source),
                            Some(error),
                        )
                    }
                    _ => (DEFAULT_ORIGIN.to_string(), None, None),
                };
                OptionRow {
                    option: meta.name.to_string(),
                    parsed_value: redact_value(meta, &resolved.value),
                    raw_value: redact_raw(meta, raw.map(|raw| raw.original.as_str())),
                    source,
                    rejected_source,
                    error,
                    is_secret: meta.is_secret,
                    is_dynamic: meta.is_dynamic(),
                }
            })
            .collect();

        let sources = RawConfigSourceId::ALL
            .into_iter()
            .map(|source| {
                let current = manager.load_source(source);
                let rows = OptionId::ALL
                    .into_iter()
                    .map(|id| {
                        let meta = metadata.get(id);
                        let key = meta.source_key(source);
                        let used = snapshot.option(id).raw_from(source);
                        SourceRow {
                            name: key.to_string(),
                            used_raw: redact_raw(meta, used.map(|raw| raw.original.as_str())),
                            used_interpreted: redact_raw(
                                meta,
                                used.map(|raw| raw.interpreted.as_str()),
                            ),
                            current: redact_raw(meta, current.read_raw(key)),
                        }
                    })
                    .collect();
                SourceTable {
                    source,
                    description: source.description().to_string(),
                    rows,
                }
            })
            .collect();

        Self {
            generation: snapshot.generation(),
            fingerprint: snapshot.fingerprint().to_string(),
            options,
            sources,
        }
    }

    /// Row of the option called `name` (ASCII case ignored).
    pub fn option(&self, name: &str) -> Option<&OptionRow> {
        self.options
            .iter()
            .find(|row| row.option.eq_ignore_ascii_case(name))
    }

    /// Table of `source`.
    pub fn source(&self, source: RawConfigSourceId) -> Option<&SourceTable> {
        self.sources.iter().find(|table| table.source == source)
    }

    /// The report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Other` if serialization fails.
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> crate::error::Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| crate::error::ConfigError::Other(format!("Failed to render report: {}", e)))
    }
}
