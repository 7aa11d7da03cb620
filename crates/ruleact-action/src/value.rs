//! Host-supplied configuration values.
//!
//! A `ConfigValue` is a JSON tree that may additionally carry the non-JSON
//! values a host hands over programmatically: callables, delegate objects,
//! validation predicates, normalizers and regex patterns.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::{Number, Value};

use crate::action::{Action, Completion};
use crate::context::ExecutionContext;

/// A plain callable handler.
pub type HandlerFn = Arc<dyn Fn(&ExecutionContext) -> Completion + Send + Sync>;

/// Accepts or rejects a value captured from an element.
pub type PredicateFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Maps a captured string to the final attribute value.
pub type NormalizerFn = Arc<dyn Fn(&str) -> Value + Send + Sync>;

#[derive(Clone)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<ConfigValue>),
    Object(BTreeMap<String, ConfigValue>),
    Function(HandlerFn),
    Delegate(Arc<dyn Action>),
    Predicate(PredicateFn),
    Normalizer(NormalizerFn),
    Pattern(Regex),
}

impl ConfigValue {
    /// Wrap a closure as a handler value.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&ExecutionContext) -> Completion + Send + Sync + 'static,
    {
        ConfigValue::Function(Arc::new(f))
    }

    /// Wrap an object exposing `apply`.
    pub fn delegate<A: Action + 'static>(action: A) -> Self {
        ConfigValue::Delegate(Arc::new(action))
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        ConfigValue::Predicate(Arc::new(f))
    }

    pub fn normalizer<F>(f: F) -> Self
    where
        F: Fn(&str) -> Value + Send + Sync + 'static,
    {
        ConfigValue::Normalizer(Arc::new(f))
    }

    /// Build an object from key/value pairs.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ConfigValue)>,
    {
        ConfigValue::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Name of this value's type as reported in validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "boolean",
            ConfigValue::Number(n) if n.is_i64() || n.is_u64() => "integer",
            ConfigValue::Number(_) => "number",
            ConfigValue::String(_) => "string",
            ConfigValue::Array(_) => "array",
            ConfigValue::Object(_) | ConfigValue::Delegate(_) => "object",
            ConfigValue::Function(_) => "function",
            ConfigValue::Predicate(_) => "predicate",
            ConfigValue::Normalizer(_) => "normalizer",
            ConfigValue::Pattern(_) => "regex",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, ConfigValue>> {
        match self {
            ConfigValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key on an object value.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Convert back to plain JSON. Returns `None` if the tree holds anything
    /// JSON cannot represent.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            ConfigValue::Null => Some(Value::Null),
            ConfigValue::Bool(b) => Some(Value::Bool(*b)),
            ConfigValue::Number(n) => Some(Value::Number(n.clone())),
            ConfigValue::String(s) => Some(Value::String(s.clone())),
            ConfigValue::Array(items) => items
                .iter()
                .map(ConfigValue::to_json)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            ConfigValue::Object(map) => map
                .iter()
                .map(|(k, v)| v.to_json().map(|v| (k.clone(), v)))
                .collect::<Option<serde_json::Map<_, _>>>()
                .map(Value::Object),
            _ => None,
        }
    }
}

impl fmt::Debug for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Null => f.write_str("Null"),
            ConfigValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            ConfigValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
            ConfigValue::String(s) => f.debug_tuple("String").field(s).finish(),
            ConfigValue::Array(items) => f.debug_tuple("Array").field(items).finish(),
            ConfigValue::Object(map) => f.debug_tuple("Object").field(map).finish(),
            ConfigValue::Function(_) => f.write_str("Function(..)"),
            ConfigValue::Delegate(_) => f.write_str("Delegate(..)"),
            ConfigValue::Predicate(_) => f.write_str("Predicate(..)"),
            ConfigValue::Normalizer(_) => f.write_str("Normalizer(..)"),
            ConfigValue::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
        }
    }
}

impl From<Value> for ConfigValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ConfigValue::Null,
            Value::Bool(b) => ConfigValue::Bool(b),
            Value::Number(n) => ConfigValue::Number(n),
            Value::String(s) => ConfigValue::String(s),
            Value::Array(items) => {
                ConfigValue::Array(items.into_iter().map(ConfigValue::from).collect())
            }
            Value::Object(map) => ConfigValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, ConfigValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(items: Vec<ConfigValue>) -> Self {
        ConfigValue::Array(items)
    }
}

impl From<Regex> for ConfigValue {
    fn from(re: Regex) -> Self {
        ConfigValue::Pattern(re)
    }
}

/// Type name of a plain JSON value, using the same vocabulary as
/// [`ConfigValue::type_name`].
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
