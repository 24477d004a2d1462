//! Directive-file configuration source.

use super::{ConfigSource, RawValues};
use crate::error::{ConfigError, Result};
use config::File;
use std::collections::HashMap;
use std::path::PathBuf;

/// Directive-file configuration source.
///
/// Loads `elastic_apm.<name> = <value>` style entries from an INI, TOML, YAML or
/// JSON file (format detected from the extension, each behind the matching
/// cargo feature). Nested tables are flattened into dotted keys, so
///
/// ```ini
/// [elastic_apm]
/// log_level = debug
/// ```
///
/// and `elastic_apm.log_level = debug` at the top level are the same entry.
/// In an INI file, dotted directives inside any other section (such as
/// `[PHP]`) are also read under their own name.
///
/// A file that does not exist provides no values. By default an empty value
/// is given its INI meaning (`false` for booleans, `off` for levels).
///
/// # Examples
///
/// ```rust,no_run
/// use apm_agent_config::sources::FileSource;
///
/// let source = FileSource::new("/etc/apm/agent.ini");
/// ```
pub struct FileSource {
    path: PathBuf,
    interpret_empty_values: bool,
}

impl FileSource {
    /// Create a new directive-file source.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            interpret_empty_values: true,
        }
    }

    /// Keep empty values as plain empty text instead of applying INI semantics.
    pub fn with_empty_value_interpretation(mut self, enabled: bool) -> Self {
        self.interpret_empty_values = enabled;
        self
    }

    fn is_ini(&self) -> bool {
        self.path
            .extension()
            .is_some_and(|ext| ext == "ini")
    }

    /// Validate that the file extension is supported by the enabled formats.
    fn validate_extension(&self) -> Result<()> {
        let extension = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                ConfigError::LoadError(format!(
                    "Unable to determine file format for: {}",
                    self.path.display()
                ))
            })?;

        let supported = match extension {
            "ini" => cfg!(feature = "ini"),
            "toml" => cfg!(feature = "toml"),
            "yaml" | "yml" => cfg!(feature = "yaml"),
            "json" => cfg!(feature = "json"),
            _ => false,
        };

        if supported {
            Ok(())
        } else {
            Err(ConfigError::LoadError(format!(
                "Unsupported directive file extension: {} (enable the matching format feature)",
                extension
            )))
        }
    }
}

/// Make directives inside INI sections visible under their own names.
///
/// A section only groups directives: `elastic_apm.log_level` under `[PHP]`
/// is flattened to `php.elastic_apm.log_level` and also registered as
/// `elastic_apm.log_level`. A key of the same name outside any section wins;
/// between sections, the first in name order wins.
fn hoist_ini_sections(values: RawValues) -> RawValues {
    let mut sectioned: Vec<(String, String, String)> = values
        .iter()
        .filter_map(|(key, value)| {
            let (_, directive) = key.split_once('.')?;
            directive
                .contains('.')
                .then(|| (key.to_string(), directive.to_string(), value.to_string()))
        })
        .collect();
    sectioned.sort();

    let mut hoisted = values;
    for (_, directive, value) in sectioned {
        if !hoisted.present(&directive) {
            hoisted.insert(directive, value);
        }
    }
    hoisted
}

impl ConfigSource for FileSource {
    fn load(&self) -> Result<RawValues> {
        self.validate_extension()?;

        if !self.path.exists() {
            return Ok(RawValues::new());
        }

        let map = config::Config::builder()
            .add_source(File::from(self.path.clone()).required(false))
            .build()?
            .try_deserialize::<HashMap<String, config::Value>>()?;

        let values = RawValues::from(map);
        if self.is_ini() {
            Ok(hoist_ini_sections(values))
        } else {
            Ok(values)
        }
    }

    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn interprets_empty_values(&self) -> bool {
        self.interpret_empty_values
    }
}
