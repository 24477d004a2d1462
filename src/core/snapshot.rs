//! Immutable, fully resolved configuration snapshots.

use super::loader::{LoadedSources, RawData, ResolvedRaw};
use crate::diagnostics::REDACTED;
use crate::options::{LogLevel, MetadataTable, OptionId, OptionMetadata, OptionValue};
use crate::sources::RawConfigSourceId;
use std::time::Duration;
use tracing::{debug, warn};

/// How an option's value came about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionStatus {
    /// No source had the option (or it was not parsed in this mode); the default applies.
    Default,
    /// The raw value parsed and passed the option's constraint.
    Parsed,
    /// The raw value was rejected; the default applies.
    Invalid {
        /// Why the raw value was rejected
        error: String,
    },
}

/// One option as recorded in a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOption {
    /// Effective value.
    pub value: OptionValue,
    /// Raw text that drove the resolution, if any source supplied one.
    pub raw: Option<ResolvedRaw>,
    /// Outcome of parsing `raw`.
    pub status: OptionStatus,
    /// What every source held for the option at build time, indexed by source.
    pub from_sources: [Option<RawData>; RawConfigSourceId::COUNT],
}

impl ResolvedOption {
    fn default_for(meta: &OptionMetadata) -> Self {
        Self {
            value: meta.default_value.clone(),
            raw: None,
            status: OptionStatus::Default,
            from_sources: Default::default(),
        }
    }

    /// Raw text `source` held for the option when the snapshot was built.
    pub fn raw_from(&self, source: RawConfigSourceId) -> Option<&RawData> {
        self.from_sources[source.index()].as_ref()
    }

    /// Whether the value came from a source rather than the default.
    pub fn is_from_source(&self) -> bool {
        self.status == OptionStatus::Parsed
    }
}

/// Which options a build parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerMode {
    /// Every option.
    Full,
    /// Only logging-related options (early bootstrap); the rest keep their defaults.
    LoggingOnly,
}

/// An immutable set of effective values for every option.
///
/// Snapshots are shared as `Arc<ConfigSnapshot>`; a holder keeps its snapshot
/// alive and unchanged however many newer ones are published meanwhile.
///
/// # Examples
///
/// ```rust
/// use apm_agent_config::prelude::*;
///
/// let manager = ConfigManager::builder()
///     .with_env_vars([("ELASTIC_APM_TRANSACTION_MAX_SPANS", "10")])
///     .build()
///     .unwrap();
/// manager.ensure_has_latest_config();
///
/// let snapshot = manager.get();
/// assert_eq!(snapshot.transaction_max_spans(), 10);
/// assert!(snapshot.enabled());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSnapshot {
    options: Vec<ResolvedOption>,
    fingerprint: String,
    generation: u64,
    built_from_sources: bool,
}

impl ConfigSnapshot {
    /// A snapshot holding every option's default, not built from any source.
    pub(crate) fn defaults(table: &MetadataTable) -> Self {
        let options: Vec<_> = table.iter().map(ResolvedOption::default_for).collect();
        let fingerprint = super::loader::fingerprint(
            table
                .iter()
                .zip(&options)
                .map(|(meta, option)| (meta.name, &option.from_sources[..])),
        );
        Self {
            options,
            fingerprint,
            generation: 0,
            built_from_sources: false,
        }
    }

    pub(crate) fn from_sources(
        options: Vec<ResolvedOption>,
        fingerprint: String,
        generation: u64,
    ) -> Self {
        Self {
            options,
            fingerprint,
            generation,
            built_from_sources: true,
        }
    }

    /// Effective value of `id`.
    pub fn get(&self, id: OptionId) -> &OptionValue {
        &self.options[id.index()].value
    }

    /// Value, raw data and status of `id`.
    pub fn option(&self, id: OptionId) -> &ResolvedOption {
        &self.options[id.index()]
    }

    /// Every option, in [`OptionId`] order.
    pub fn iter(&self) -> impl Iterator<Item = (OptionId, &ResolvedOption)> {
        OptionId::ALL.into_iter().zip(self.options.iter())
    }

    /// SHA-256 (hex) of the raw inputs this snapshot was built from.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Publication counter; 0 for the defaults-only snapshot.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether this snapshot was built by reading sources.
    pub fn is_built_from_sources(&self) -> bool {
        self.built_from_sources
    }

    fn bool_or(&self, id: OptionId, fallback: bool) -> bool {
        self.get(id).as_bool().unwrap_or(fallback)
    }

    /// Whether the agent is enabled at all.
    pub fn enabled(&self) -> bool {
        self.bool_or(OptionId::Enabled, true)
    }

    /// `log_level`, if set.
    pub fn log_level(&self) -> Option<LogLevel> {
        self.get(OptionId::LogLevel)
            .level_ordinal()
            .and_then(LogLevel::from_ordinal)
    }

    /// `log_file`, if set.
    pub fn log_file(&self) -> Option<&str> {
        self.get(OptionId::LogFile).as_str()
    }

    /// URL of the collector.
    pub fn server_url(&self) -> Option<&str> {
        self.get(OptionId::ServerUrl).as_str()
    }

    /// Timeout for requests to the collector.
    pub fn server_timeout(&self) -> Duration {
        let millis = self.get(OptionId::ServerTimeout).as_i64().unwrap_or(0);
        Duration::from_millis(u64::try_from(millis).unwrap_or(0))
    }

    /// `secret_token`, if set.
    pub fn secret_token(&self) -> Option<&str> {
        self.get(OptionId::SecretToken).as_str()
    }

    /// `api_key`, if set.
    pub fn api_key(&self) -> Option<&str> {
        self.get(OptionId::ApiKey).as_str()
    }

    /// `service_name`, if set.
    pub fn service_name(&self) -> Option<&str> {
        self.get(OptionId::ServiceName).as_str()
    }

    /// Fraction of transactions to sample, within `[0, 1]`.
    pub fn transaction_sample_rate(&self) -> f64 {
        self.get(OptionId::TransactionSampleRate)
            .as_f64()
            .unwrap_or(1.0)
    }

    /// Maximum number of spans recorded per transaction.
    pub fn transaction_max_spans(&self) -> u64 {
        self.get(OptionId::TransactionMaxSpans)
            .as_u64()
            .unwrap_or(500)
    }

    /// Stack frames to capture; `-1` for unlimited.
    pub fn stack_trace_limit(&self) -> i64 {
        self.get(OptionId::StackTraceLimit).as_i64().unwrap_or(50)
    }

    /// Instrumentations that must not be applied.
    pub fn disable_instrumentations(&self) -> &[String] {
        self.get(OptionId::DisableInstrumentations)
            .as_list()
            .unwrap_or_default()
    }

    /// Labels attached to every event.
    pub fn global_labels(&self) -> &[(String, String)] {
        self.get(OptionId::GlobalLabels)
            .as_map()
            .unwrap_or_default()
    }

    /// Ordinal of `memory_tracking_level`, if set.
    pub fn memory_tracking_level(&self) -> Option<usize> {
        self.get(OptionId::MemoryTrackingLevel).level_ordinal()
    }

    /// `abort_on_memory_leak`.
    pub fn abort_on_memory_leak(&self) -> bool {
        self.bool_or(OptionId::AbortOnMemoryLeak, false)
    }

    /// `ast_process_enabled`.
    pub fn ast_process_enabled(&self) -> bool {
        self.bool_or(OptionId::AstProcessEnabled, false)
    }

    /// `verify_server_cert`.
    pub fn verify_server_cert(&self) -> bool {
        self.bool_or(OptionId::VerifyServerCert, true)
    }

    /// Bytes the send queue may hold.
    pub fn max_send_queue_size(&self) -> u64 {
        self.get(OptionId::MaxSendQueueSize).as_u64().unwrap_or(0)
    }
}

/// Resolve and parse every option against one consistent read of the sources.
///
/// A rejected raw value is logged and replaced by the default; it never stops
/// the remaining options from being resolved.
pub(crate) fn resolve_options(
    table: &MetadataTable,
    loaded: &LoadedSources,
    mode: ManagerMode,
) -> Vec<ResolvedOption> {
    table
        .iter()
        .map(|meta| {
            if mode == ManagerMode::LoggingOnly && !meta.is_logging_related {
                return ResolvedOption::default_for(meta);
            }
            let mut option = match loaded.resolve(meta) {
                Some(raw) => resolve_raw(meta, raw),
                None => {
                    debug!(option = meta.name, "No source defines the option, using default");
                    ResolvedOption::default_for(meta)
                }
            };
            option.from_sources = loaded.raw_data_by_source(meta);
            option
        })
        .collect()
}

fn resolve_raw(meta: &OptionMetadata, raw: ResolvedRaw) -> ResolvedOption {
    let shown = if meta.is_secret { REDACTED } else { raw.original.as_str() };
    match meta.parse(&raw.interpreted) {
        Ok(value) => {
            debug!(option = meta.name, raw = shown, source = %raw.source, "Parsed option");
            ResolvedOption {
                value,
                raw: Some(raw),
                status: OptionStatus::Parsed,
                from_sources: Default::default(),
            }
        }
        Err(error) => {
            warn!(
                option = meta.name,
                raw = shown,
                source = %raw.source,
                error = %error,
                "Failed to parse option, using default"
            );
            ResolvedOption {
                value: meta.default_value.clone(),
                raw: Some(raw),
                status: OptionStatus::Invalid {
                    error: error.to_string(),
                },
                from_sources: Default::default(),
            }
        }
    }
}
