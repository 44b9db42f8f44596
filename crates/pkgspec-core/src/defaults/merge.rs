//! Value-level merge of a document over its defaults

use crate::fields::{self, FieldShape};
use crate::schema::Scope;
use crate::value::Value;
use serde_json::{Map, json};

/// Merge `overlay` over `base`.
///
/// List-shaped fields concatenate with `base` first (a scalar counts as a
/// one-element list), dependencies are normalized to list form first, `when`
/// concatenates, sections merge per name, `flags` and `verbatim` merge per
/// key, and everything else is replaced by `overlay`.
pub fn merge_documents(base: Value, overlay: Value, scope: Scope) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match merged.get_mut(&key) {
                    Some(slot) => {
                        let inherited = std::mem::take(slot);
                        *slot = merge_key(&key, inherited, value, scope);
                    }
                    None => {
                        merged.insert(key, value);
                    }
                }
            }
            Value::Object(merged)
        }
        (_, overlay) => overlay,
    }
}

fn merge_key(key: &str, base: Value, overlay: Value, scope: Scope) -> Value {
    if key == fields::DEPENDENCIES {
        return concat(dependency_items(base), dependency_items(overlay));
    }
    if key == "when" || is_list_field(key, scope) {
        return concat(list_items(base), list_items(overlay));
    }
    if scope == Scope::Package {
        match key {
            "library" => return merge_documents(base, overlay, Scope::Library),
            "executable" => return merge_documents(base, overlay, Scope::Component),
            "custom-setup" => return merge_documents(base, overlay, Scope::CustomSetup),
            "internal-libraries" => return merge_sections(base, overlay, Scope::Library),
            "executables" | "tests" | "benchmarks" => {
                return merge_sections(base, overlay, Scope::Component);
            }
            "flags" => return merge_keys(base, overlay),
            _ => {}
        }
    }
    if key == "verbatim" {
        return merge_keys(base, overlay);
    }
    overlay
}

fn is_list_field(key: &str, scope: Scope) -> bool {
    if scope == Scope::Package && fields::PACKAGE_LIST_FIELDS.contains(&key) {
        return true;
    }
    fields::lookup(key).is_some_and(|spec| spec.shape == FieldShape::List)
}

fn merge_sections(base: Value, overlay: Value, scope: Scope) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay)) => {
            for (name, section) in overlay {
                match merged.get_mut(&name) {
                    Some(slot) => {
                        let inherited = std::mem::take(slot);
                        *slot = merge_documents(inherited, section, scope);
                    }
                    None => {
                        merged.insert(name, section);
                    }
                }
            }
            Value::Object(merged)
        }
        (_, overlay) => overlay,
    }
}

fn merge_keys(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay)) => {
            merged.extend(overlay);
            Value::Object(merged)
        }
        (_, overlay) => overlay,
    }
}

fn list_items(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        single => vec![single],
    }
}

/// Object form `{ name: constraint }` becomes list form.
fn dependency_items(value: Value) -> Vec<Value> {
    match value {
        Value::Object(map) => map.into_iter().map(dependency_item).collect(),
        other => list_items(other),
    }
}

fn dependency_item((name, constraint): (String, Value)) -> Value {
    match constraint {
        Value::Null => Value::String(name),
        Value::String(version) if version.trim().is_empty() => Value::String(name),
        Value::String(version) => Value::String(format!("{name} {version}")),
        Value::Number(version) => Value::String(format!("{name} =={version}")),
        Value::Object(mut details) => {
            let mut item = Map::new();
            item.insert("name".to_string(), Value::String(name));
            if let Some(version) = details.remove("version") {
                item.insert("version".to_string(), version);
            }
            Value::Object(item)
        }
        other => json!({ "name": name, "version": other }),
    }
}

fn concat(mut base: Vec<Value>, overlay: Vec<Value>) -> Value {
    base.extend(overlay);
    Value::Array(base)
}
