//! Environment variable configuration source.

use super::{ConfigSource, RawValues};
use crate::error::Result;
use config::Environment;
use std::collections::HashMap;

/// Environment variable configuration source.
///
/// Reads every variable starting with the prefix (matched case-insensitively)
/// and keys it by its full name, so `ELASTIC_APM_LOG_LEVEL` is looked up as
/// `ELASTIC_APM_LOG_LEVEL`. Values are kept as text and trimmed.
///
/// # Examples
///
/// ```rust
/// use apm_agent_config::sources::EnvSource;
///
/// // Matches: ELASTIC_APM_LOG_LEVEL, ELASTIC_APM_ENABLED, etc.
/// let source = EnvSource::new("ELASTIC_APM_");
/// ```
pub struct EnvSource {
    prefix: String,
    vars: Option<HashMap<String, String>>,
}

impl EnvSource {
    /// Create a source reading the process environment.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Full variable name prefix, including any trailing separator
    ///   (e.g. `"ELASTIC_APM_"`)
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            vars: None,
        }
    }

    /// Read from the given variables instead of the process environment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use apm_agent_config::sources::{ConfigSource, EnvSource};
    /// use std::collections::HashMap;
    ///
    /// let vars = HashMap::from([("ELASTIC_APM_LOG_LEVEL".to_string(), "debug".to_string())]);
    /// let source = EnvSource::new("ELASTIC_APM_").with_vars(vars);
    /// assert_eq!(source.load().unwrap().read_raw("ELASTIC_APM_LOG_LEVEL"), Some("debug"));
    /// ```
    pub fn with_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.vars = Some(vars);
        self
    }

    /// Variables to read: the injected map, or a copy of the process environment.
    fn vars(&self) -> HashMap<String, String> {
        match &self.vars {
            Some(vars) => vars.clone(),
            None => process_vars(),
        }
    }

    /// The `config` crate splits a prefix into a stem and a separator.
    fn split_prefix(&self) -> (&str, &str) {
        match self.prefix.strip_suffix('_') {
            Some(stem) => (stem, "_"),
            None => (self.prefix.as_str(), ""),
        }
    }
}

impl ConfigSource for EnvSource {
    fn load(&self) -> Result<RawValues> {
        let (stem, separator) = self.split_prefix();

        let env_source = Environment::default()
            .prefix(stem)
            .prefix_separator(separator)
            .try_parsing(false)
            .source(Some(self.vars()));

        let map = config::Config::builder()
            .add_source(env_source)
            .build()?
            .try_deserialize::<HashMap<String, config::Value>>()?;

        // The `config` crate strips the prefix; put it back so keys are full variable names.
        let stripped = RawValues::from(map);
        Ok(stripped
            .iter()
            .map(|(key, value)| (format!("{}{}", self.prefix, key), value.to_string()))
            .collect())
    }

    fn name(&self) -> String {
        format!("env:{}*", self.prefix)
    }
}

/// The process environment, skipping variables whose name or value is not UTF-8.
fn process_vars() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_name() {
        let source = EnvSource::new("ELASTIC_APM_");
        assert_eq!(source.name(), "env:ELASTIC_APM_*");
    }

    #[test]
    fn test_split_prefix() {
        assert_eq!(EnvSource::new("ELASTIC_APM_").split_prefix(), ("ELASTIC_APM", "_"));
        assert_eq!(EnvSource::new("APM").split_prefix(), ("APM", ""));
    }

    #[test]
    fn test_load_injected_vars() {
        let source = EnvSource::new("ELASTIC_APM_").with_vars(vars(&[
            ("ELASTIC_APM_LOG_LEVEL", " debug "),
            ("ELASTIC_APM_SECRET_TOKEN", ""),
            ("OTHER_LOG_LEVEL", "trace"),
        ]));

        let values = source.load().unwrap();
        assert_eq!(values.read_raw("ELASTIC_APM_LOG_LEVEL"), Some("debug"));
        assert!(values.present("ELASTIC_APM_SECRET_TOKEN"));
        assert_eq!(values.read_raw("ELASTIC_APM_SECRET_TOKEN"), Some(""));
        assert!(!values.present("OTHER_LOG_LEVEL"));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_load_empty() {
        let source = EnvSource::new("ELASTIC_APM_").with_vars(HashMap::new());
        assert!(source.load().unwrap().is_empty());
    }

    #[test]
    fn test_does_not_interpret_empty_values() {
        assert!(!EnvSource::new("ELASTIC_APM_").interprets_empty_values());
    }

    #[cfg(unix)]
    #[test]
    #[allow(unsafe_code)] // set_var/remove_var are unsafe in edition 2024
    fn test_process_environment_with_non_utf8_variable() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let bad_name = "APM_AGENT_CONFIG_TEST_NON_UTF8";
        let good_name = "APM_AGENT_CONFIG_TEST_UTF8_SERVICE_NAME";
        unsafe {
            std::env::set_var(bad_name, OsStr::from_bytes(b"\xff\xfe"));
            std::env::set_var(good_name, "checkout");
        }

        let vars = process_vars();
        let loaded = EnvSource::new("APM_AGENT_CONFIG_TEST_UTF8_").load();

        unsafe {
            std::env::remove_var(bad_name);
            std::env::remove_var(good_name);
        }

        assert!(!vars.contains_key(bad_name));
        assert_eq!(vars.get(good_name).map(String::as_str), Some("checkout"));
        let loaded = loaded.unwrap();
        assert_eq!(
            loaded.read_raw("APM_AGENT_CONFIG_TEST_UTF8_SERVICE_NAME"),
            Some("checkout")
        );
    }
}
