//! The option catalogue.
//!
//! Every option the agent understands is described exactly once, in
//! [`CATALOGUE`], in [`OptionId`] order. [`build_metadata`] turns the static
//! descriptions into a validated [`MetadataTable`], deriving each option's
//! per-source key and parsing its default with the option's own parser.

use super::parse::parse_value;
use super::value::{DurationUnits, LevelScale, OptionValue, SizeUnits, ValueType};
use crate::core::{Constraint, Validate};
use crate::error::{ConfigError, RejectedValue, Result, ValidationError};
use crate::sources::RawConfigSourceId;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Dense identifier of an option. Declaration order is iteration order.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionId {
    AbortOnMemoryLeak,
    ApiKey,
    AssertLevel,
    AstProcessEnabled,
    AstProcessDebugDumpConvertedBackToSource,
    AstProcessDebugDumpForPathPrefix,
    AstProcessDebugDumpOutDir,
    AsyncBackendComm,
    BootstrapPhpPartFile,
    BreakdownMetrics,
    CaptureErrors,
    DebugDiagnosticFile,
    DevInternal,
    DevInternalBackendCommLogVerbose,
    DisableInstrumentations,
    DisableSend,
    Enabled,
    Environment,
    GlobalLabels,
    Hostname,
    InternalChecksLevel,
    LogFile,
    LogLevel,
    LogLevelFile,
    LogLevelStderr,
    LogLevelSyslog,
    MemoryTrackingLevel,
    NonKeywordStringMaxLength,
    ProfilingInferredSpansEnabled,
    ProfilingInferredSpansMinDuration,
    ProfilingInferredSpansSamplingInterval,
    SanitizeFieldNames,
    SecretToken,
    ServerTimeout,
    ServerUrl,
    ServiceName,
    ServiceNodeName,
    ServiceVersion,
    SpanCompressionEnabled,
    SpanCompressionExactMatchMaxDuration,
    SpanCompressionSameKindMaxDuration,
    SpanStackTraceMinDuration,
    StackTraceLimit,
    TransactionIgnoreUrls,
    TransactionMaxSpans,
    TransactionSampleRate,
    UrlGroups,
    VerifyServerCert,
    MaxSendQueueSize,
}

impl OptionId {
    /// Number of options.
    pub const COUNT: usize = 49;

    /// Every option, in iteration order.
    pub const ALL: [OptionId; Self::COUNT] = [
        OptionId::AbortOnMemoryLeak,
        OptionId::ApiKey,
        OptionId::AssertLevel,
        OptionId::AstProcessEnabled,
        OptionId::AstProcessDebugDumpConvertedBackToSource,
        OptionId::AstProcessDebugDumpForPathPrefix,
        OptionId::AstProcessDebugDumpOutDir,
        OptionId::AsyncBackendComm,
        OptionId::BootstrapPhpPartFile,
        OptionId::BreakdownMetrics,
        OptionId::CaptureErrors,
        OptionId::DebugDiagnosticFile,
        OptionId::DevInternal,
        OptionId::DevInternalBackendCommLogVerbose,
        OptionId::DisableInstrumentations,
        OptionId::DisableSend,
        OptionId::Enabled,
        OptionId::Environment,
        OptionId::GlobalLabels,
        OptionId::Hostname,
        OptionId::InternalChecksLevel,
        OptionId::LogFile,
        OptionId::LogLevel,
        OptionId::LogLevelFile,
        OptionId::LogLevelStderr,
        OptionId::LogLevelSyslog,
        OptionId::MemoryTrackingLevel,
        OptionId::NonKeywordStringMaxLength,
        OptionId::ProfilingInferredSpansEnabled,
        OptionId::ProfilingInferredSpansMinDuration,
        OptionId::ProfilingInferredSpansSamplingInterval,
        OptionId::SanitizeFieldNames,
        OptionId::SecretToken,
        OptionId::ServerTimeout,
        OptionId::ServerUrl,
        OptionId::ServiceName,
        OptionId::ServiceNodeName,
        OptionId::ServiceVersion,
        OptionId::SpanCompressionEnabled,
        OptionId::SpanCompressionExactMatchMaxDuration,
        OptionId::SpanCompressionSameKindMaxDuration,
        OptionId::SpanStackTraceMinDuration,
        OptionId::StackTraceLimit,
        OptionId::TransactionIgnoreUrls,
        OptionId::TransactionMaxSpans,
        OptionId::TransactionSampleRate,
        OptionId::UrlGroups,
        OptionId::VerifyServerCert,
        OptionId::MaxSendQueueSize,
    ];

    /// Position in iteration order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Canonical option name.
    pub fn name(self) -> &'static str {
        CATALOGUE[self.index()].name
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether an option may change after the first snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mutability {
    /// Resolved once, at the first build from sources, and never again.
    Frozen,
    /// Re-resolved on every rebuild.
    Dynamic,
}

/// Static description of one option, as written in [`CATALOGUE`].
#[derive(Debug, Clone, Copy)]
pub struct OptionDefinition {
    /// Option this entry describes.
    pub id: OptionId,
    /// Canonical name.
    pub name: &'static str,
    /// How raw text is parsed.
    pub value_type: ValueType,
    /// Default as raw text; `None` means the type's unset value.
    pub default_raw: Option<&'static str>,
    /// Redact in diagnostics.
    pub is_secret: bool,
    /// Frozen or dynamic.
    pub mutability: Mutability,
    /// Parsed in the logging-only bootstrap mode.
    pub is_logging_related: bool,
    /// Option-level range restriction.
    pub constraint: Constraint,
}

impl OptionDefinition {
    const fn new(id: OptionId, name: &'static str, value_type: ValueType) -> Self {
        Self {
            id,
            name,
            value_type,
            default_raw: None,
            is_secret: false,
            mutability: Mutability::Frozen,
            is_logging_related: false,
            constraint: Constraint::None,
        }
    }

    const fn with_default(mut self, raw: &'static str) -> Self {
        self.default_raw = Some(raw);
        self
    }

    const fn secret(mut self) -> Self {
        self.is_secret = true;
        self
    }

    const fn dynamic(mut self) -> Self {
        self.mutability = Mutability::Dynamic;
        self
    }

    const fn logging(mut self) -> Self {
        self.is_logging_related = true;
        self
    }

    const fn constrained(mut self, constraint: Constraint) -> Self {
        self.constraint = constraint;
        self
    }
}

const BOOL: ValueType = ValueType::Bool;
const STRING: ValueType = ValueType::String;
const LIST: ValueType = ValueType::List;
const MILLIS: ValueType = ValueType::Duration {
    default_units: DurationUnits::Milliseconds,
};

const fn level(scale: LevelScale) -> ValueType {
    ValueType::Level {
        scale,
        unique_prefix_enough: true,
    }
}

use OptionDefinition as Def;
use OptionId as Id;

/// The canonical option table, in [`OptionId`] order.
pub static CATALOGUE: [OptionDefinition; OptionId::COUNT] = [
    Def::new(Id::AbortOnMemoryLeak, "abort_on_memory_leak", BOOL).with_default("false"),
    Def::new(Id::ApiKey, "api_key", STRING).secret(),
    Def::new(Id::AssertLevel, "assert_level", level(LevelScale::InternalChecks)),
    Def::new(Id::AstProcessEnabled, "ast_process_enabled", BOOL).with_default("false"),
    Def::new(
        Id::AstProcessDebugDumpConvertedBackToSource,
        "ast_process_debug_dump_converted_back_to_source",
        BOOL,
    )
    .with_default("true"),
    Def::new(
        Id::AstProcessDebugDumpForPathPrefix,
        "ast_process_debug_dump_for_path_prefix",
        STRING,
    ),
    Def::new(Id::AstProcessDebugDumpOutDir, "ast_process_debug_dump_out_dir", STRING),
    Def::new(Id::AsyncBackendComm, "async_backend_comm", ValueType::OptionalBool),
    Def::new(Id::BootstrapPhpPartFile, "bootstrap_php_part_file", STRING),
    Def::new(Id::BreakdownMetrics, "breakdown_metrics", BOOL)
        .with_default("true")
        .dynamic(),
    Def::new(Id::CaptureErrors, "capture_errors", BOOL)
        .with_default("true")
        .dynamic(),
    Def::new(Id::DebugDiagnosticFile, "debug_diagnostic_file", STRING),
    Def::new(Id::DevInternal, "dev_internal", LIST),
    Def::new(
        Id::DevInternalBackendCommLogVerbose,
        "dev_internal_backend_comm_log_verbose",
        BOOL,
    )
    .with_default("false"),
    Def::new(Id::DisableInstrumentations, "disable_instrumentations", LIST).dynamic(),
    Def::new(Id::DisableSend, "disable_send", BOOL)
        .with_default("false")
        .dynamic(),
    Def::new(Id::Enabled, "enabled", BOOL).with_default("true"),
    Def::new(Id::Environment, "environment", STRING),
    Def::new(Id::GlobalLabels, "global_labels", ValueType::Map),
    Def::new(Id::Hostname, "hostname", STRING),
    Def::new(
        Id::InternalChecksLevel,
        "internal_checks_level",
        level(LevelScale::InternalChecks),
    ),
    Def::new(Id::LogFile, "log_file", STRING).logging(),
    Def::new(Id::LogLevel, "log_level", level(LevelScale::Log))
        .dynamic()
        .logging(),
    Def::new(Id::LogLevelFile, "log_level_file", level(LevelScale::Log)).logging(),
    Def::new(Id::LogLevelStderr, "log_level_stderr", level(LevelScale::Log)).logging(),
    Def::new(Id::LogLevelSyslog, "log_level_syslog", level(LevelScale::Log)).logging(),
    Def::new(
        Id::MemoryTrackingLevel,
        "memory_tracking_level",
        level(LevelScale::MemoryTracking),
    ),
    Def::new(
        Id::NonKeywordStringMaxLength,
        "non_keyword_string_max_length",
        ValueType::UInt,
    )
    .with_default("10000")
    .dynamic(),
    Def::new(
        Id::ProfilingInferredSpansEnabled,
        "profiling_inferred_spans_enabled",
        BOOL,
    )
    .with_default("false")
    .dynamic(),
    Def::new(
        Id::ProfilingInferredSpansMinDuration,
        "profiling_inferred_spans_min_duration",
        MILLIS,
    )
    .with_default("0ms")
    .dynamic()
    .constrained(Constraint::NonNegative),
    Def::new(
        Id::ProfilingInferredSpansSamplingInterval,
        "profiling_inferred_spans_sampling_interval",
        MILLIS,
    )
    .with_default("50ms")
    .dynamic()
    .constrained(Constraint::NonNegative),
    Def::new(Id::SanitizeFieldNames, "sanitize_field_names", LIST)
        .with_default("password,passwd,pwd,secret,*key,*token*,*session*,*credit*,*card*,*auth*,set-cookie")
        .secret()
        .dynamic(),
    Def::new(Id::SecretToken, "secret_token", STRING).secret(),
    Def::new(
        Id::ServerTimeout,
        "server_timeout",
        ValueType::Duration {
            default_units: DurationUnits::Seconds,
        },
    )
    .with_default("30s")
    .constrained(Constraint::NonNegative),
    Def::new(Id::ServerUrl, "server_url", STRING).with_default("http://localhost:8200"),
    Def::new(Id::ServiceName, "service_name", STRING),
    Def::new(Id::ServiceNodeName, "service_node_name", STRING),
    Def::new(Id::ServiceVersion, "service_version", STRING),
    Def::new(Id::SpanCompressionEnabled, "span_compression_enabled", BOOL)
        .with_default("true")
        .dynamic(),
    Def::new(
        Id::SpanCompressionExactMatchMaxDuration,
        "span_compression_exact_match_max_duration",
        MILLIS,
    )
    .with_default("50ms")
    .dynamic()
    .constrained(Constraint::NonNegative),
    Def::new(
        Id::SpanCompressionSameKindMaxDuration,
        "span_compression_same_kind_max_duration",
        MILLIS,
    )
    .with_default("0ms")
    .dynamic()
    .constrained(Constraint::NonNegative),
    // Negative disables stack trace collection for spans.
    Def::new(
        Id::SpanStackTraceMinDuration,
        "span_stack_trace_min_duration",
        MILLIS,
    )
    .with_default("5ms")
    .dynamic(),
    // -1 means unlimited.
    Def::new(Id::StackTraceLimit, "stack_trace_limit", ValueType::Int)
        .with_default("50")
        .dynamic()
        .constrained(Constraint::AtLeast(-1)),
    Def::new(Id::TransactionIgnoreUrls, "transaction_ignore_urls", LIST).dynamic(),
    Def::new(Id::TransactionMaxSpans, "transaction_max_spans", ValueType::UInt)
        .with_default("500")
        .dynamic(),
    Def::new(Id::TransactionSampleRate, "transaction_sample_rate", ValueType::Rate)
        .with_default("1.0")
        .dynamic()
        .constrained(Constraint::UnitInterval),
    Def::new(Id::UrlGroups, "url_groups", LIST).dynamic(),
    Def::new(Id::VerifyServerCert, "verify_server_cert", BOOL).with_default("true"),
    Def::new(
        Id::MaxSendQueueSize,
        "max_send_queue_size",
        ValueType::Size {
            default_units: SizeUnits::Bytes,
        },
    )
    .with_default("2mb"),
];

/// How option names map to per-source keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyNaming {
    /// Prepended to the name in the directive file (`elastic_apm.` by default).
    pub file_prefix: String,
    /// Prepended to the upper-cased name in the environment (`ELASTIC_APM_` by default).
    pub env_prefix: String,
}

impl Default for KeyNaming {
    fn default() -> Self {
        Self {
            file_prefix: "elastic_apm.".to_string(),
            env_prefix: "ELASTIC_APM_".to_string(),
        }
    }
}

impl KeyNaming {
    /// Key of option `name` in `source`.
    pub fn source_key(&self, source: RawConfigSourceId, name: &str) -> String {
        match source {
            RawConfigSourceId::DirectiveFile => format!("{}{}", self.file_prefix, name),
            RawConfigSourceId::EnvVars => {
                format!("{}{}", self.env_prefix, name.to_ascii_uppercase())
            }
        }
    }
}

/// Fully built description of one option.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionMetadata {
    /// Option this entry describes.
    pub id: OptionId,
    /// Canonical name.
    pub name: &'static str,
    /// One key per source, in precedence order.
    pub source_keys: [String; RawConfigSourceId::COUNT],
    /// How raw text is parsed.
    pub value_type: ValueType,
    /// Default as raw text, if any.
    pub default_raw: Option<&'static str>,
    /// Default as a typed value.
    pub default_value: OptionValue,
    /// Redact in diagnostics.
    pub is_secret: bool,
    /// Frozen or dynamic.
    pub mutability: Mutability,
    /// Parsed in the logging-only bootstrap mode.
    pub is_logging_related: bool,
    /// Option-level range restriction.
    pub constraint: Constraint,
}

impl OptionMetadata {
    /// Key of this option in `source`.
    pub fn source_key(&self, source: RawConfigSourceId) -> &str {
        &self.source_keys[source.index()]
    }

    /// Whether the option may change after the first snapshot.
    pub fn is_dynamic(&self) -> bool {
        self.mutability == Mutability::Dynamic
    }

    /// Parse `text` as this option and apply its constraint.
    ///
    /// # Errors
    ///
    /// Returns `RejectedValue::Parse` if the text does not parse and
    /// `RejectedValue::Constraint` if the value is out of range.
    pub fn parse(&self, text: &str) -> std::result::Result<OptionValue, RejectedValue> {
        let value = parse_value(&self.value_type, text)?;
        self.constraint.check(self.name, &value)?;
        Ok(value)
    }
}

/// The unset value of a type, used when an option has no textual default.
fn unset_value(value_type: &ValueType) -> Option<OptionValue> {
    match *value_type {
        ValueType::OptionalBool => Some(OptionValue::OptionalBool(None)),
        ValueType::Level { scale, .. } => Some(OptionValue::Level {
            scale,
            ordinal: None,
        }),
        ValueType::String => Some(OptionValue::String(None)),
        ValueType::List => Some(OptionValue::List(Vec::new())),
        ValueType::Map => Some(OptionValue::Map(Vec::new())),
        _ => None,
    }
}

/// Validated, immutable table of every option's metadata.
#[derive(Debug, Clone)]
pub struct MetadataTable {
    options: Vec<OptionMetadata>,
}

impl MetadataTable {
    /// Metadata of `id`.
    pub fn get(&self, id: OptionId) -> &OptionMetadata {
        &self.options[id.index()]
    }

    /// Iterate in [`OptionId`] order.
    pub fn iter(&self) -> impl Iterator<Item = &OptionMetadata> {
        self.options.iter()
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Whether the table is empty (never true for a built table).
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Find an option by name, ignoring ASCII case.
    pub fn find_by_name(&self, name: &str) -> Option<&OptionMetadata> {
        self.options
            .iter()
            .find(|meta| meta.name.eq_ignore_ascii_case(name))
    }
}

impl Validate for MetadataTable {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        let mut errors = Vec::new();

        if self.options.len() != OptionId::COUNT {
            errors.push(ValidationError::custom(format!(
                "expected {} options, found {}",
                OptionId::COUNT,
                self.options.len()
            )));
        }

        let mut names = HashSet::new();
        let mut keys = HashSet::new();
        for (position, meta) in self.options.iter().enumerate() {
            if meta.id.index() != position {
                errors.push(ValidationError::invalid_field(
                    meta.name,
                    format!("listed at position {} but has id {:?}", position, meta.id),
                ));
            }
            if !names.insert(meta.name.to_ascii_lowercase()) {
                errors.push(ValidationError::invalid_field(meta.name, "duplicate name"));
            }
            for source in RawConfigSourceId::ALL {
                let key = meta.source_key(source).to_ascii_lowercase();
                if !keys.insert((source, key)) {
                    errors.push(ValidationError::invalid_field(
                        meta.name,
                        format!("duplicate {} key", source),
                    ));
                }
            }
            if !meta.default_value.matches(&meta.value_type) {
                errors.push(ValidationError::invalid_field(
                    meta.name,
                    "default does not match the option type",
                ));
            }
            if let Err(e) = meta.constraint.check(meta.name, &meta.default_value) {
                errors.push(e);
            }
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple(errors)),
        }
    }
}

/// Build the metadata table from [`CATALOGUE`].
///
/// # Errors
///
/// Returns `ConfigError::Metadata` if a default does not parse, an option of
/// a type without an unset value has no default, or the table fails
/// validation (wrong count, misplaced id, duplicate name or key). Any of these
/// is a defect in the catalogue.
pub fn build_metadata(naming: &KeyNaming) -> Result<MetadataTable> {
    build_from(&CATALOGUE, naming)
}

fn build_from(definitions: &[OptionDefinition], naming: &KeyNaming) -> Result<MetadataTable> {
    let mut options = Vec::with_capacity(definitions.len());
    for def in definitions {
        let default_value = match def.default_raw {
            Some(raw) => parse_value(&def.value_type, raw).map_err(|e| {
                ConfigError::Metadata(format!("default of '{}' does not parse: {}", def.name, e))
            })?,
            None => unset_value(&def.value_type).ok_or_else(|| {
                ConfigError::Metadata(format!(
                    "'{}' is a {} option without a default",
                    def.name,
                    def.value_type.describe()
                ))
            })?,
        };

        options.push(OptionMetadata {
            id: def.id,
            name: def.name,
            source_keys: RawConfigSourceId::ALL.map(|source| naming.source_key(source, def.name)),
            value_type: def.value_type,
            default_raw: def.default_raw,
            default_value,
            is_secret: def.is_secret,
            mutability: def.mutability,
            is_logging_related: def.is_logging_related,
            constraint: def.constraint,
        });
    }

    let table = MetadataTable { options };
    table
        .validate()
        .map_err(|e| ConfigError::Metadata(e.to_string()))?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;

    #[test]
    fn test_catalogue_builds() {
        let table = build_metadata(&KeyNaming::default()).unwrap();
        assert_eq!(table.len(), OptionId::COUNT);
    }

    #[test]
    fn test_every_default_parses_under_its_own_option() {
        let table = build_metadata(&KeyNaming::default()).unwrap();
        for meta in table.iter() {
            if let Some(raw) = meta.default_raw {
                assert_eq!(meta.parse(raw).as_ref(), Ok(&meta.default_value), "{}", meta.name);
            }
        }
    }

    #[test]
    fn test_ids_match_positions() {
        for (position, id) in OptionId::ALL.iter().enumerate() {
            assert_eq!(id.index(), position);
            assert_eq!(CATALOGUE[position].id, *id);
        }
    }

    #[test]
    fn test_source_keys() {
        let table = build_metadata(&KeyNaming::default()).unwrap();
        let meta = table.get(OptionId::LogLevel);
        assert_eq!(
            meta.source_key(RawConfigSourceId::DirectiveFile),
            "elastic_apm.log_level"
        );
        assert_eq!(
            meta.source_key(RawConfigSourceId::EnvVars),
            "ELASTIC_APM_LOG_LEVEL"
        );

        let naming = KeyNaming {
            file_prefix: "apm.".to_string(),
            env_prefix: "APM_".to_string(),
        };
        let table = build_metadata(&naming).unwrap();
        assert_eq!(
            table.get(OptionId::ServerUrl).source_key(RawConfigSourceId::EnvVars),
            "APM_SERVER_URL"
        );
    }

    #[test]
    fn test_find_by_name_ignores_case() {
        let table = build_metadata(&KeyNaming::default()).unwrap();
        assert_eq!(
            table.find_by_name("Secret_Token").map(|m| m.id),
            Some(OptionId::SecretToken)
        );
        assert!(table.find_by_name("no_such_option").is_none());
    }

    #[test]
    fn test_flags() {
        let table = build_metadata(&KeyNaming::default()).unwrap();
        assert!(table.get(OptionId::SecretToken).is_secret);
        assert!(table.get(OptionId::ApiKey).is_secret);
        assert!(table.get(OptionId::LogLevel).is_dynamic());
        assert!(!table.get(OptionId::Enabled).is_dynamic());
        assert!(table.get(OptionId::LogFile).is_logging_related);
        assert!(!table.get(OptionId::ServerUrl).is_logging_related);
    }

    #[test]
    fn test_defaults() {
        let table = build_metadata(&KeyNaming::default()).unwrap();
        assert_eq!(
            table.get(OptionId::ServerTimeout).default_value,
            OptionValue::Duration(30_000)
        );
        assert_eq!(
            table.get(OptionId::MaxSendQueueSize).default_value,
            OptionValue::Size(2 * 1024 * 1024)
        );
        assert_eq!(
            table.get(OptionId::TransactionSampleRate).default_value,
            OptionValue::Rate(1.0)
        );
        assert_eq!(
            table.get(OptionId::LogLevel).default_value,
            OptionValue::Level {
                scale: LevelScale::Log,
                ordinal: None
            }
        );
        assert_eq!(
            table.get(OptionId::SanitizeFieldNames).default_value,
            OptionValue::List(
                [
                    "password", "passwd", "pwd", "secret", "*key", "*token*", "*session*",
                    "*credit*", "*card*", "*auth*", "set-cookie",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect()
            )
        );
    }

    #[test]
    fn test_parse_applies_constraint() {
        let table = build_metadata(&KeyNaming::default()).unwrap();
        let rate = table.get(OptionId::TransactionSampleRate);
        assert_eq!(rate.parse("0.5"), Ok(OptionValue::Rate(0.5)));
        assert!(matches!(rate.parse("1.1"), Err(RejectedValue::Constraint(_))));
        assert!(matches!(rate.parse("-0.1"), Err(RejectedValue::Constraint(_))));
        assert!(matches!(
            rate.parse("abc"),
            Err(RejectedValue::Parse(ParseError::InvalidNumber(_)))
        ));
    }

    #[test]
    fn test_defective_catalogue_is_rejected() {
        let mut defs: Vec<OptionDefinition> = CATALOGUE.to_vec();
        defs[1] = defs[0];
        let err = build_from(&defs, &KeyNaming::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Metadata(_)));

        let mut defs: Vec<OptionDefinition> = CATALOGUE.to_vec();
        defs[OptionId::TransactionSampleRate.index()].default_raw = Some("2.0");
        let err = build_from(&defs, &KeyNaming::default()).unwrap_err();
        assert!(err.to_string().contains("transaction_sample_rate"));

        let mut defs: Vec<OptionDefinition> = CATALOGUE.to_vec();
        defs[OptionId::Enabled.index()].default_raw = None;
        assert!(build_from(&defs, &KeyNaming::default()).is_err());

        let defs: Vec<OptionDefinition> = CATALOGUE[..10].to_vec();
        assert!(build_from(&defs, &KeyNaming::default()).is_err());
    }
}
