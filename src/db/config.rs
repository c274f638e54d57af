//! Facade configuration maps.
//!
//! Configuration is kept as loosely typed JSON values so that callers can
//! hand over the same definition files the CLI reads. Keys follow the
//! camelCase names used in those files (`dsn`, `models`, `connectionOptions`).

use std::time::Duration;

use serde_json::{Map, Value};

pub const DSN_KEY: &str = "dsn";
pub const MODELS_KEY: &str = "models";
pub const CONNECTION_OPTIONS_KEY: &str = "connectionOptions";

/// Returns whether a value counts as set.
///
/// `null`, `false`, `0`, `NaN` and the empty string are unset. Objects and
/// arrays are set even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Key/value configuration owned by a facade.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigMap {
    entries: Map<String, Value>,
}

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value` when both are truthy.
    ///
    /// A falsy value can never be written through this method, so an entry
    /// cannot be cleared or set to `false`/`0` once present.
    pub fn set(&mut self, key: &str, value: Value) -> &mut Self {
        if !key.is_empty() && is_truthy(&value) {
            self.entries.insert(key.to_string(), value);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// String value for `key`, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }
}

/// Document store connection options.
///
/// Starts from [`ConnectionOptions::defaults`]; caller-supplied keys replace
/// default ones and unknown keys are carried along untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionOptions {
    values: Map<String, Value>,
}

pub const AUTO_INDEX: &str = "autoIndex";
pub const MAX_POOL_SIZE: &str = "maxPoolSize";
pub const SERVER_SELECTION_TIMEOUT_MS: &str = "serverSelectionTimeoutMS";
pub const SOCKET_TIMEOUT_MS: &str = "socketTimeoutMS";
pub const FAMILY: &str = "family";
pub const NAMESPACE: &str = "namespace";
pub const DATABASE: &str = "database";

pub const DEFAULT_NAMESPACE: &str = "storekit";
pub const DEFAULT_DATABASE: &str = "storekit";

impl ConnectionOptions {
    /// Options applied unless overridden.
    pub fn defaults() -> Self {
        let mut values = Map::new();
        values.insert(AUTO_INDEX.to_string(), Value::Bool(false));
        values.insert(MAX_POOL_SIZE.to_string(), Value::from(10));
        values.insert(SERVER_SELECTION_TIMEOUT_MS.to_string(), Value::from(5000));
        values.insert(SOCKET_TIMEOUT_MS.to_string(), Value::from(45000));
        values.insert(FAMILY.to_string(), Value::from(4));
        Self { values }
    }

    /// Defaults overlaid with `overrides`.
    pub fn with_overrides(overrides: &Map<String, Value>) -> Self {
        let mut options = Self::defaults();
        options.merge(overrides);
        options
    }

    pub fn merge(&mut self, overrides: &Map<String, Value>) {
        for (key, value) in overrides {
            self.values.insert(key.clone(), value.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn auto_index(&self) -> bool {
        self.values
            .get(AUTO_INDEX)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn max_pool_size(&self) -> Option<u64> {
        self.values.get(MAX_POOL_SIZE).and_then(Value::as_u64)
    }

    pub fn server_selection_timeout(&self) -> Option<Duration> {
        self.millis(SERVER_SELECTION_TIMEOUT_MS)
    }

    pub fn socket_timeout(&self) -> Option<Duration> {
        self.millis(SOCKET_TIMEOUT_MS)
    }

    pub fn namespace(&self) -> &str {
        self.values
            .get(NAMESPACE)
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_NAMESPACE)
    }

    pub fn database(&self) -> &str {
        self.values
            .get(DATABASE)
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_DATABASE)
    }

    fn millis(&self, key: &str) -> Option<Duration> {
        self.values
            .get(key)
            .and_then(Value::as_u64)
            .map(Duration::from_millis)
    }
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self::defaults()
    }
}
