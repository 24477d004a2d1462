//! Point-in-time view of the raw text a source provides.

use config::ValueKind;
use std::collections::HashMap;

/// Raw key/value text loaded from one source.
///
/// Keys are matched case-insensitively. Values are kept exactly as the source
/// handed them over (sources trim before inserting).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawValues {
    values: HashMap<String, String>,
}

impl RawValues {
    /// Create an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value for `key`.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.values
            .insert(key.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Whether the source defines `key`. An empty value still counts.
    pub fn present(&self, key: &str) -> bool {
        self.values.contains_key(&key.to_ascii_lowercase())
    }

    /// The raw text for `key`, if present.
    pub fn read_raw(&self, key: &str) -> Option<&str> {
        self.values
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the view holds no keys.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(lowercased key, value)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<HashMap<String, config::Value>> for RawValues {
    /// Flatten a `config` crate tree into dotted keys.
    ///
    /// Nested tables become `parent.child` keys, arrays are joined with `,`,
    /// scalars are rendered as text and trimmed. `Nil` entries are dropped.
    fn from(map: HashMap<String, config::Value>) -> Self {
        let mut values = RawValues::new();
        for (key, value) in map {
            flatten_into(&mut values, key, value);
        }
        values
    }
}

fn flatten_into(out: &mut RawValues, key: String, value: config::Value) {
    match value.kind {
        ValueKind::Table(table) => {
            for (child, value) in table {
                flatten_into(out, format!("{}.{}", key, child), value);
            }
        }
        ValueKind::Array(items) => {
            let joined = items
                .into_iter()
                .filter_map(|item| item.into_string().ok())
                .map(|item| item.trim().to_string())
                .collect::<Vec<_>>()
                .join(",");
            out.insert(key, joined);
        }
        ValueKind::Nil => {}
        scalar => {
            if let Ok(text) = config::Value::new(None, scalar).into_string() {
                out.insert(key, text.trim());
            }
        }
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for RawValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = RawValues::new();
        for (key, value) in iter {
            values.insert(key, value);
        }
        values
    }
}
