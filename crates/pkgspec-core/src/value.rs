//! Generic document values
//!
//! Manifests and defaults documents are YAML on disk but are handled as
//! `serde_json::Value` (built with `preserve_order`, so objects keep their
//! key order). The YAML tree is converted once, on load.

use crate::error::{Error, Result};
use serde_json::Map;
use serde_yaml::Value as YamlValue;
use std::fmt;

pub use serde_json::Value;

/// Parse a YAML document whose root must be an object.
pub fn parse_document(source: &str, origin: &str) -> Result<Value> {
    let yaml: YamlValue = serde_yaml::from_str(source).map_err(|e| Error::Yaml {
        origin: origin.to_string(),
        message: e.to_string(),
    })?;
    let value = from_yaml(yaml);
    match value {
        Value::Object(_) => Ok(value),
        other => Err(Error::parse(
            origin,
            JsonPath::root(),
            format!("expected Object, but encountered {}", shape(&other)),
        )),
    }
}

/// Convert a YAML value, stringifying non-string keys and dropping tags.
pub fn from_yaml(value: YamlValue) -> Value {
    match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => Value::Array(items.into_iter().map(from_yaml).collect()),
        YamlValue::Mapping(mapping) => {
            let mut object = Map::new();
            for (key, value) in mapping {
                object.insert(key_to_string(key), from_yaml(value));
            }
            Value::Object(object)
        }
        YamlValue::Tagged(tagged) => from_yaml(tagged.value),
    }
}

fn key_to_string(key: YamlValue) -> String {
    match key {
        YamlValue::String(s) => s,
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

/// Name of a value's shape as used in error messages.
pub fn shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Boolean",
        Value::Number(_) => "Number",
        Value::String(_) => "String",
        Value::Array(_) => "Array",
        Value::Object(_) => "Object",
    }
}

/// A `$`-rooted path into a document: `.key` for object members, `[i]` for
/// array elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsonPath(String);

impl JsonPath {
    pub fn root() -> Self {
        Self("$".to_string())
    }

    pub fn key(&self, key: &str) -> Self {
        Self(format!("{}.{}", self.0, key))
    }

    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
