//! Raw value loading and source precedence.

use crate::options::{OptionMetadata, ValueType};
use crate::sources::{ConfigSource, RawConfigSourceId, RawValues};
use sha2::{Digest, Sha256};
use tracing::warn;

/// One source's raw text for one option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawData {
    /// Text exactly as the source provided it.
    pub original: String,
    /// Text handed to the parser, after the source's empty-value interpretation.
    pub interpreted: String,
}

/// Raw text that drives one option, and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRaw {
    /// Text exactly as the source provided it.
    pub original: String,
    /// Text handed to the parser, after the source's empty-value interpretation.
    pub interpreted: String,
    /// Source that supplied the value.
    pub source: RawConfigSourceId,
}

/// Every source's values, read once for one build.
#[derive(Debug, Default)]
pub struct LoadedSources {
    values: [RawValues; RawConfigSourceId::COUNT],
    interprets_empty: [bool; RawConfigSourceId::COUNT],
}

impl LoadedSources {
    /// Values loaded from `source`.
    pub fn values(&self, source: RawConfigSourceId) -> &RawValues {
        &self.values[source.index()]
    }

    /// Raw text `source` holds for the option, if present.
    pub fn raw_data(&self, meta: &OptionMetadata, source: RawConfigSourceId) -> Option<RawData> {
        let original = self.values(source).read_raw(meta.source_key(source))?;
        let interpreted = if self.interprets_empty[source.index()] {
            interpret_empty(&meta.value_type, original)
        } else {
            original
        };
        Some(RawData {
            original: original.to_string(),
            interpreted: interpreted.to_string(),
        })
    }

    /// Raw text of every source for the option, indexed by source.
    pub fn raw_data_by_source(
        &self,
        meta: &OptionMetadata,
    ) -> [Option<RawData>; RawConfigSourceId::COUNT] {
        RawConfigSourceId::ALL.map(|source| self.raw_data(meta, source))
    }

    /// Walk sources in precedence order and return the first present value.
    ///
    /// `None` means no source has the option and its default applies. An empty
    /// value is present.
    pub fn resolve(&self, meta: &OptionMetadata) -> Option<ResolvedRaw> {
        RawConfigSourceId::ALL.into_iter().find_map(|source| {
            let RawData {
                original,
                interpreted,
            } = self.raw_data(meta, source)?;
            Some(ResolvedRaw {
                original,
                interpreted,
                source,
            })
        })
    }
}

/// INI meaning of an empty value: `false` for booleans, `off` for levels.
fn interpret_empty<'a>(value_type: &ValueType, raw: &'a str) -> &'a str {
    if !raw.trim().is_empty() {
        return raw;
    }
    match value_type {
        ValueType::Bool | ValueType::OptionalBool => "false",
        ValueType::Level { .. } => "off",
        _ => raw,
    }
}

/// Holds one slot per [`RawConfigSourceId`] and reads them.
///
/// An empty slot behaves like a source with no values.
#[derive(Default)]
pub struct ConfigLoader {
    sources: [Option<Box<dyn ConfigSource>>; RawConfigSourceId::COUNT],
}

impl ConfigLoader {
    /// Create a loader with every slot empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `source` in the slot for `id`, replacing what was there.
    pub fn set_source(&mut self, id: RawConfigSourceId, source: Box<dyn ConfigSource>) {
        self.sources[id.index()] = Some(source);
    }

    /// Read one source. A failing source is logged and treated as empty.
    pub fn load_source(&self, id: RawConfigSourceId) -> RawValues {
        let Some(source) = &self.sources[id.index()] else {
            return RawValues::new();
        };
        match source.load() {
            Ok(values) => values,
            Err(e) => {
                warn!(
                    source = %id,
                    name = %source.name(),
                    error = %e,
                    "Failed to read configuration source, treating it as empty"
                );
                RawValues::new()
            }
        }
    }

    /// Read every source once.
    pub fn load_all(&self) -> LoadedSources {
        let mut loaded = LoadedSources::default();
        for id in RawConfigSourceId::ALL {
            loaded.values[id.index()] = self.load_source(id);
            loaded.interprets_empty[id.index()] = self.sources[id.index()]
                .as_ref()
                .is_some_and(|s| s.interprets_empty_values());
        }
        loaded
    }

    /// Names of the configured sources, in precedence order.
    pub fn source_names(&self) -> Vec<String> {
        self.sources
            .iter()
            .flatten()
            .map(|source| source.name())
            .collect()
    }
}

/// SHA-256 (hex) over every option's name and the raw data of every source.
///
/// Per-source slices are in precedence order, so the origin of the winning
/// value is part of the input. Fields are length-prefixed so that no two
/// distinct inputs share an encoding.
pub fn fingerprint<'a>(
    entries: impl IntoIterator<Item = (&'a str, &'a [Option<RawData>])>,
) -> String {
    fn field(hasher: &mut Sha256, bytes: &[u8]) {
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }

    let mut hasher = Sha256::new();
    for (name, by_source) in entries {
        field(&mut hasher, name.as_bytes());
        for raw in by_source {
            match raw {
                Some(raw) => {
                    hasher.update([1u8]);
                    field(&mut hasher, raw.original.as_bytes());
                    field(&mut hasher, raw.interpreted.as_bytes());
                }
                None => hasher.update([0u8]),
            }
        }
    }
    hex::encode(hasher.finalize())
}
