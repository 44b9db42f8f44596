//! Shape-checked accessors over raw document values

use crate::error::{Error, Result};
use crate::fields::Dependency;
use crate::value::{JsonPath, Value, shape};
use indexmap::IndexMap;
use serde_json::Map;

/// Decoding context: the file errors are attributed to.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    pub origin: &'a str,
}

impl<'a> Decoder<'a> {
    pub fn new(origin: &'a str) -> Self {
        Self { origin }
    }

    pub fn mismatch(&self, path: &JsonPath, expected: &str, found: &Value) -> Error {
        Error::parse(
            self.origin,
            path,
            format!("expected {expected}, but encountered {}", shape(found)),
        )
    }

    pub fn missing(&self, path: &JsonPath, key: &str) -> Error {
        Error::parse(self.origin, path, format!("key \"{key}\" not present"))
    }

    pub fn object<'v>(&self, value: &'v Value, path: &JsonPath) -> Result<&'v Map<String, Value>> {
        value
            .as_object()
            .ok_or_else(|| self.mismatch(path, "Object", value))
    }

    /// Strings, numbers and booleans all read as text (`version: 1.0`).
    pub fn scalar(&self, value: &Value, path: &JsonPath) -> Result<String> {
        scalar_text(value).ok_or_else(|| self.mismatch(path, "String", value))
    }

    pub fn boolean(&self, value: &Value, path: &JsonPath) -> Result<bool> {
        value
            .as_bool()
            .ok_or_else(|| self.mismatch(path, "Boolean", value))
    }

    /// A scalar or a list of scalars; `null` is the empty list.
    pub fn list(&self, value: &Value, path: &JsonPath) -> Result<Vec<String>> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| self.scalar(item, &path.index(index)))
                .collect(),
            scalar => scalar_text(scalar)
                .map(|text| vec![text])
                .ok_or_else(|| self.mismatch(path, "Array of String", value)),
        }
    }

    /// Dependencies in list form (`"base >= 4"` or `{ name, version }`
    /// items) or object form (`{ base: ">= 4", text: null }`).
    pub fn dependencies(&self, value: &Value, path: &JsonPath) -> Result<Vec<Dependency>> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::String(entry) => Ok(vec![Dependency::parse(entry)]),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| self.dependency_item(item, &path.index(index)))
                .collect(),
            Value::Object(map) => map
                .iter()
                .map(|(name, constraint)| self.dependency_constraint(name, constraint, &path.key(name)))
                .collect(),
            other => Err(self.mismatch(path, "Array, Object or String", other)),
        }
    }

    fn dependency_item(&self, item: &Value, path: &JsonPath) -> Result<Dependency> {
        match item {
            Value::String(entry) => Ok(Dependency::parse(entry)),
            Value::Object(object) => {
                let name = object
                    .get("name")
                    .ok_or_else(|| self.missing(path, "name"))
                    .and_then(|name| self.scalar(name, &path.key("name")))?;
                match object.get("version") {
                    Some(version) => self.dependency_constraint(&name, version, &path.key("version")),
                    None => Ok(Dependency {
                        name,
                        constraint: None,
                    }),
                }
            }
            other => Err(self.mismatch(path, "Object or String", other)),
        }
    }

    fn dependency_constraint(&self, name: &str, value: &Value, path: &JsonPath) -> Result<Dependency> {
        let constraint = match value {
            Value::Null => None,
            Value::String(text) => Some(text.trim().to_string()).filter(|text| !text.is_empty()),
            Value::Number(number) => Some(format!("=={number}")),
            Value::Object(object) => match object.get("version") {
                Some(version) => return self.dependency_constraint(name, version, &path.key("version")),
                None => None,
            },
            other => return Err(self.mismatch(path, "Null, Number, Object or String", other)),
        };
        Ok(Dependency {
            name: name.to_string(),
            constraint,
        })
    }

    /// A map of named entries; `null` entries decode as empty objects.
    pub fn named<T>(
        &self,
        value: &Value,
        path: &JsonPath,
        mut decode: impl FnMut(&Value, &JsonPath) -> Result<T>,
    ) -> Result<IndexMap<String, T>> {
        let empty = Value::Object(Map::new());
        let mut entries = IndexMap::new();
        for (name, entry) in self.object(value, path)? {
            let entry = if entry.is_null() { &empty } else { entry };
            entries.insert(name.clone(), decode(entry, &path.key(name))?);
        }
        Ok(entries)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn decoder() -> Decoder<'static> {
        Decoder::new("package.yaml")
    }

    fn dep(name: &str, constraint: Option<&str>) -> Dependency {
        Dependency {
            name: name.into(),
            constraint: constraint.map(Into::into),
        }
    }

    #[test]
    fn scalar_lists_are_single_items() {
        let path = JsonPath::root().key("ghc-options");
        assert_eq!(decoder().list(&json!("-Wall"), &path).unwrap(), vec!["-Wall"]);
        assert_eq!(
            decoder().list(&json!(["-Wall", 2]), &path).unwrap(),
            vec!["-Wall", "2"]
        );
    }

    #[test]
    fn nested_list_items_are_rejected_with_index() {
        let err = decoder()
            .list(&json!(["a", ["b"]]), &JsonPath::root().key("ghc-options"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "package.yaml: Error while parsing $.ghc-options[1] - expected String, but encountered Array"
        );
    }

    #[test]
    fn dependency_forms_agree() {
        let path = JsonPath::root().key("dependencies");
        let expected = vec![dep("base", Some(">= 4")), dep("text", None)];

        let list = decoder()
            .dependencies(&json!(["base >= 4", "text"]), &path)
            .unwrap();
        let objects = decoder()
            .dependencies(&json!([{"name": "base", "version": ">= 4"}, {"name": "text"}]), &path)
            .unwrap();
        let map = decoder()
            .dependencies(&json!({"base": ">= 4", "text": null}), &path)
            .unwrap();

        assert_eq!(list, expected);
        assert_eq!(objects, expected);
        assert_eq!(map, expected);
    }

    #[test]
    fn dependency_object_needs_name() {
        let err = decoder()
            .dependencies(&json!([{"version": "1"}]), &JsonPath::root().key("dependencies"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "package.yaml: Error while parsing $.dependencies[0] - key \"name\" not present"
        );
    }

    #[test]
    fn booleans_are_strict() {
        let err = decoder()
            .boolean(&json!("yes"), &JsonPath::root().key("buildable"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "package.yaml: Error while parsing $.buildable - expected Boolean, but encountered String"
        );
    }
}
