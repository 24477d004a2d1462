//! Builder for constructing ConfigManager instances.

use crate::core::{ConfigLoader, ConfigManager, ManagerMode};
use crate::error::Result;
use crate::options::{KeyNaming, build_metadata};
use crate::sources::{ConfigSource, EnvSource, FileSource, RawConfigSourceId};
use std::collections::HashMap;
use std::path::PathBuf;

/// Builder for constructing a `ConfigManager`.
///
/// By default the manager reads process environment variables prefixed with
/// `ELASTIC_APM_` and no directive file.
///
/// # Examples
///
/// ```rust,no_run
/// use apm_agent_config::prelude::*;
///
/// # fn example() -> Result<()> {
/// let manager = ConfigManager::builder()
///     .with_directive_file("/etc/php/conf.d/elastic-apm.ini")
///     .build()?;
///
/// manager.ensure_has_latest_config();
/// println!("Server: {:?}", manager.get().server_url());
/// # Ok(())
/// # }
/// ```
pub struct ConfigManagerBuilder {
    directive_file: Option<PathBuf>,
    naming: KeyNaming,
    env_vars: Option<HashMap<String, String>>,
    custom_sources: Vec<(RawConfigSourceId, Box<dyn ConfigSource>)>,
    mode: ManagerMode,
}

impl ConfigManagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            directive_file: None,
            naming: KeyNaming::default(),
            env_vars: None,
            custom_sources: Vec::new(),
            mode: ManagerMode::Full,
        }
    }

    /// Read the directive file at `path` (INI, or another format enabled by a
    /// cargo feature). A missing file provides no values.
    pub fn with_directive_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.directive_file = Some(path.into());
        self
    }

    /// Key prefix in the directive file (default `elastic_apm.`).
    pub fn with_file_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.naming.file_prefix = prefix.into();
        self
    }

    /// Environment variable prefix (default `ELASTIC_APM_`).
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.naming.env_prefix = prefix.into();
        self
    }

    /// Use the given variables instead of the process environment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use apm_agent_config::prelude::*;
    ///
    /// let manager = ConfigManager::builder()
    ///     .with_env_vars([("ELASTIC_APM_SERVICE_NAME", "checkout")])
    ///     .build()
    ///     .unwrap();
    /// manager.ensure_has_latest_config();
    /// assert_eq!(manager.get().service_name(), Some("checkout"));
    /// ```
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Put a custom source in the slot of `id`, replacing the built-in one.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use apm_agent_config::prelude::*;
    /// use apm_agent_config::sources::FileSource;
    ///
    /// let builder = ConfigManager::builder().with_source(
    ///     RawConfigSourceId::DirectiveFile,
    ///     FileSource::new("agent.toml").with_empty_value_interpretation(false),
    /// );
    /// ```
    pub fn with_source<S: ConfigSource + 'static>(
        mut self,
        id: RawConfigSourceId,
        source: S,
    ) -> Self {
        self.custom_sources.push((id, Box::new(source)));
        self
    }

    /// Parse only logging-related options (early bootstrap).
    pub fn logging_only(mut self) -> Self {
        self.mode = ManagerMode::LoggingOnly;
        self
    }

    /// Build the manager.
    ///
    /// The manager starts with a defaults-only snapshot; call
    /// [`ConfigManager::ensure_has_latest_config`] to read the sources.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Metadata` if the option catalogue is inconsistent
    /// (for example a prefix that makes two source keys collide).
    pub fn build(self) -> Result<ConfigManager> {
        let metadata = build_metadata(&self.naming)?;

        let mut loader = ConfigLoader::new();

        if let Some(path) = self.directive_file {
            loader.set_source(RawConfigSourceId::DirectiveFile, Box::new(FileSource::new(path)));
        }

        let mut env_source = EnvSource::new(self.naming.env_prefix.clone());
        if let Some(vars) = self.env_vars {
            env_source = env_source.with_vars(vars);
        }
        loader.set_source(RawConfigSourceId::EnvVars, Box::new(env_source));

        for (id, source) in self.custom_sources {
            loader.set_source(id, source);
        }

        Ok(ConfigManager::new(metadata, loader, self.mode))
    }
}

impl Default for ConfigManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionId;

    #[test]
    fn test_builder_defaults() {
        let builder = ConfigManagerBuilder::new();
        assert!(builder.directive_file.is_none());
        assert_eq!(builder.naming, KeyNaming::default());
        assert_eq!(builder.mode, ManagerMode::Full);
    }

    #[test]
    fn test_builder_prefixes() {
        let manager = ConfigManagerBuilder::new()
            .with_env_prefix("APM_")
            .with_file_key_prefix("apm.")
            .with_env_vars([("APM_SERVICE_NAME", "checkout")])
            .build()
            .unwrap();

        assert_eq!(
            manager
                .option_metadata(OptionId::ServiceName)
                .source_key(RawConfigSourceId::DirectiveFile),
            "apm.service_name"
        );
        manager.ensure_has_latest_config();
        assert_eq!(manager.get().service_name(), Some("checkout"));
    }

    #[test]
    fn test_builder_logging_only() {
        let manager = ConfigManagerBuilder::new()
            .logging_only()
            .with_env_vars(HashMap::<String, String>::new())
            .build()
            .unwrap();
        assert_eq!(manager.mode(), ManagerMode::LoggingOnly);
    }

    #[test]
    fn test_builder_sources() {
        let manager = ConfigManagerBuilder::new()
            .with_directive_file("agent.ini")
            .with_env_vars(HashMap::<String, String>::new())
            .build()
            .unwrap();
        assert_eq!(
            manager.source_names(),
            vec!["file:agent.ini".to_string(), "env:ELASTIC_APM_*".to_string()]
        );
    }
}
