//! Default values for driftcheck configuration.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::paths::DRIFT_DATA_FILE;

/// Macro to generate default functions for serde attributes
macro_rules! default_fn {
    ($name:ident, $type:ty, $value:expr) => {
        pub(crate) fn $name() -> $type {
            $value
        }
    };
}

// =========================================================================
// DEFAULT VALUE FUNCTIONS
// =========================================================================

default_fn!(default_data_file, String, DRIFT_DATA_FILE.to_string());
default_fn!(
    default_reserved_keys,
    Vec<ReservedKey>,
    vec![
        ReservedKey::with_required("tested", Value::Bool(false)),
        ReservedKey::new("additions"),
        ReservedKey::with_required("overwrite", Value::Bool(true)),
    ]
);

// =========================================================================
// RESERVED KEYS
// =========================================================================

/// A drift data entry key with structural meaning rather than a test file path.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReservedKey {
    /// Key name as written in the YAML entry
    pub name: String,
    /// Literal value the key must carry when present (if any)
    #[serde(default)]
    pub required: Option<Value>,
}

impl ReservedKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: None,
        }
    }

    pub fn with_required(name: impl Into<String>, required: Value) -> Self {
        Self {
            name: name.into(),
            required: Some(required),
        }
    }
}

/// Borrowed lookup view over the configured reserved keys.
#[derive(Debug, Clone, Copy)]
pub struct ReservedKeys<'a> {
    keys: &'a [ReservedKey],
}

impl<'a> ReservedKeys<'a> {
    pub fn new(keys: &'a [ReservedKey]) -> Self {
        Self { keys }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k.name == key)
    }

    /// Literal value `key` must carry, if it is reserved and constrained.
    pub fn required_value(&self, key: &str) -> Option<&'a Value> {
        self.keys
            .iter()
            .find(|k| k.name == key)
            .and_then(|k| k.required.as_ref())
    }

    /// First key of `keys` (in the given order) that is reserved.
    pub fn first_in<I, S>(&self, keys: I) -> Option<S>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        keys.into_iter().find(|k| self.contains(k.as_ref()))
    }
}
