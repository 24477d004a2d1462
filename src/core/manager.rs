//! The configuration manager: snapshot publication with lock-free reads.

use super::builder::ConfigManagerBuilder;
use super::loader::{ConfigLoader, RawData, fingerprint};
use super::snapshot::{ConfigSnapshot, ManagerMode, resolve_options};
use crate::diagnostics::{DiagnosticsReport, redact_value};
use crate::options::{MetadataTable, OptionId, OptionMetadata, OptionValue};
use crate::sources::{RawConfigSourceId, RawValues};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

/// Writer-side state, only touched under the publication lock.
#[derive(Default)]
struct PublishState {
    /// First snapshot built from sources; frozen options are taken from it forever after.
    frozen_baseline: Option<Arc<ConfigSnapshot>>,
    last_generation: u64,
}

/// Owns the current [`ConfigSnapshot`] and rebuilds it on request.
///
/// Reads are lock-free (`arc-swap`). Rebuilds are serialized; each one reads
/// every source once, resolves every option and publishes a new snapshot only
/// if the raw inputs changed. Frozen options keep the values of the first
/// snapshot built from sources.
///
/// The manager is cheap to clone; clones share the same snapshot.
///
/// # Examples
///
/// ```rust
/// use apm_agent_config::prelude::*;
///
/// let manager = ConfigManager::builder()
///     .with_env_vars([("ELASTIC_APM_LOG_LEVEL", "debug")])
///     .build()
///     .unwrap();
///
/// assert!(manager.ensure_has_latest_config());
/// assert!(!manager.ensure_has_latest_config());
/// assert_eq!(manager.get().log_level(), Some(LogLevel::Debug));
/// ```
pub struct ConfigManager {
    metadata: Arc<MetadataTable>,
    loader: Arc<ConfigLoader>,
    mode: ManagerMode,
    current: Arc<ArcSwap<ConfigSnapshot>>,
    publish: Arc<Mutex<PublishState>>,
}

impl ConfigManager {
    /// Create a builder for a manager.
    pub fn builder() -> ConfigManagerBuilder {
        ConfigManagerBuilder::new()
    }

    /// Create a manager holding a defaults-only snapshot. Nothing is read yet.
    pub(crate) fn new(metadata: MetadataTable, loader: ConfigLoader, mode: ManagerMode) -> Self {
        let initial = ConfigSnapshot::defaults(&metadata);
        Self {
            metadata: Arc::new(metadata),
            loader: Arc::new(loader),
            mode,
            current: Arc::new(ArcSwap::from_pointee(initial)),
            publish: Arc::new(Mutex::new(PublishState::default())),
        }
    }

    /// Get a reference-counted handle to the current snapshot.
    ///
    /// Lock-free. The returned snapshot stays valid and unchanged for as long
    /// as it is held.
    pub fn get(&self) -> Arc<ConfigSnapshot> {
        self.current.load_full()
    }

    /// Re-read all sources and publish a new snapshot if anything changed.
    ///
    /// Returns `true` if a new snapshot was published. Never fails: unreadable
    /// sources count as empty and unparsable values fall back to defaults.
    pub fn ensure_has_latest_config(&self) -> bool {
        let mut state = self.publish.lock();

        let loaded = self.loader.load_all();
        let mut options = resolve_options(&self.metadata, &loaded, self.mode);

        if let Some(baseline) = &state.frozen_baseline {
            for meta in self.metadata.iter().filter(|meta| !meta.is_dynamic()) {
                options[meta.id.index()] = baseline.option(meta.id).clone();
            }
        }

        let new_fingerprint = fingerprint(
            self.metadata
                .iter()
                .zip(options.iter())
                .map(|(meta, option)| (meta.name, &option.from_sources[..])),
        );

        let current = self.current.load();
        if current.is_built_from_sources() && current.fingerprint() == new_fingerprint {
            debug!(generation = current.generation(), "Configuration unchanged");
            return false;
        }

        state.last_generation += 1;
        let snapshot = Arc::new(ConfigSnapshot::from_sources(
            options,
            new_fingerprint,
            state.last_generation,
        ));
        if state.frozen_baseline.is_none() {
            state.frozen_baseline = Some(Arc::clone(&snapshot));
        }
        self.current.store(Arc::clone(&snapshot));

        info!(
            generation = snapshot.generation(),
            fingerprint = snapshot.fingerprint(),
            mode = ?self.mode,
            "Published new configuration snapshot"
        );
        true
    }

    /// Which options this manager parses.
    pub fn mode(&self) -> ManagerMode {
        self.mode
    }

    /// The option catalogue.
    pub fn metadata(&self) -> &MetadataTable {
        &self.metadata
    }

    /// Metadata of `id`.
    pub fn option_metadata(&self, id: OptionId) -> &OptionMetadata {
        self.metadata.get(id)
    }

    /// Effective value of `id` in the current snapshot. Not redacted.
    pub fn option_value_by_id(&self, id: OptionId) -> OptionValue {
        self.get().get(id).clone()
    }

    /// Effective value of the option called `name` (ASCII case ignored), as text.
    ///
    /// Secret options yield the redaction marker. `None` if no option has that name.
    pub fn option_value_by_name(&self, name: &str) -> Option<String> {
        let meta = self.metadata.find_by_name(name)?;
        Some(redact_value(meta, self.get().get(meta.id)))
    }

    /// Raw text `source` held for `id` when the current snapshot was built,
    /// whether or not a higher-precedence source overrode it.
    ///
    /// Not redacted.
    pub fn raw_data(&self, id: OptionId, source: RawConfigSourceId) -> Option<RawData> {
        self.get().option(id).raw_from(source).cloned()
    }

    /// Read `source` now and return its text for `id`, whether or not it is used.
    ///
    /// Not redacted.
    pub fn read_current_raw(&self, id: OptionId, source: RawConfigSourceId) -> Option<String> {
        let key = self.metadata.get(id).source_key(source);
        self.loader
            .load_source(source)
            .read_raw(key)
            .map(str::to_string)
    }

    /// Read `source` now, in full.
    pub(crate) fn load_source(&self, source: RawConfigSourceId) -> RawValues {
        self.loader.load_source(source)
    }

    /// Names of the configured sources, in precedence order.
    pub fn source_names(&self) -> Vec<String> {
        self.loader.source_names()
    }

    /// Build a redacted report of the current snapshot and every source.
    pub fn diagnostics(&self) -> DiagnosticsReport {
        DiagnosticsReport::build(self)
    }
}

impl Clone for ConfigManager {
    fn clone(&self) -> Self {
        Self {
            metadata: Arc::clone(&self.metadata),
            loader: Arc::clone(&self.loader),
            mode: self.mode,
            current: Arc::clone(&self.current),
            publish: Arc::clone(&self.publish),
        }
    }
}
