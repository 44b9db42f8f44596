//! Section, conditional and verbatim decoding

use super::decode::Decoder;
use crate::conditional::{ConditionalNode, ConditionalTree};
use crate::error::Result;
use crate::fields::{self, FieldSet, FieldShape, FieldValue};
use crate::value::{JsonPath, Value};
use indexmap::IndexMap;
use serde_json::Map;

/// Raw override of rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verbatim {
    /// Appended as-is at the end of its scope
    Text(String),
    /// Field name to value; `None` removes the field
    Fields(IndexMap<String, Option<String>>),
}

impl Verbatim {
    pub fn decode(decoder: &Decoder<'_>, value: &Value, path: &JsonPath) -> Result<Self> {
        match value {
            Value::String(text) => Ok(Self::Text(text.clone())),
            Value::Object(map) => {
                let mut entries = IndexMap::new();
                for (name, entry) in map {
                    let entry = match entry {
                        Value::Null => None,
                        other => Some(decoder.scalar(other, &path.key(name))?),
                    };
                    entries.insert(name.clone(), entry);
                }
                Ok(Self::Fields(entries))
            }
            other => Err(decoder.mismatch(path, "Object or String", other)),
        }
    }
}

/// A decoded section before global fields are merged in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionConfig {
    pub fields: FieldSet,
    pub conditionals: ConditionalTree,
    pub verbatim: Option<Verbatim>,
}

impl SectionConfig {
    /// Decode a section object. Unknown keys were already removed.
    pub fn decode(decoder: &Decoder<'_>, value: &Value, path: &JsonPath) -> Result<Self> {
        let object = decoder.object(value, path)?;
        let fields = decode_fields(decoder, object, path)?;
        let conditionals = match object.get("when") {
            Some(when) => decode_when(decoder, when, &path.key("when"))?,
            None => ConditionalTree::new(),
        };
        let verbatim = object
            .get("verbatim")
            .map(|verbatim| Verbatim::decode(decoder, verbatim, &path.key("verbatim")))
            .transpose()?;
        Ok(Self {
            fields,
            conditionals,
            verbatim,
        })
    }
}

/// Decode every known field of `object`, in the object's key order.
pub fn decode_fields(
    decoder: &Decoder<'_>,
    object: &Map<String, Value>,
    path: &JsonPath,
) -> Result<FieldSet> {
    let mut fields = FieldSet::new();
    for (key, value) in object {
        let Some(spec) = fields::lookup(key) else {
            continue;
        };
        let field_path = path.key(key);
        let decoded = match spec.shape {
            FieldShape::List => FieldValue::List(decoder.list(value, &field_path)?),
            FieldShape::Dependencies => {
                FieldValue::Dependencies(decoder.dependencies(value, &field_path)?)
            }
            FieldShape::Text => FieldValue::Text(decoder.scalar(value, &field_path)?),
            FieldShape::Bool => FieldValue::Bool(decoder.boolean(value, &field_path)?),
        };
        fields.insert(spec.key, decoded);
    }
    Ok(fields)
}

/// `when` holds one conditional object or a list of them.
pub fn decode_when(decoder: &Decoder<'_>, value: &Value, path: &JsonPath) -> Result<ConditionalTree> {
    let mut tree = ConditionalTree::new();
    match value {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                tree.push(decode_conditional(decoder, item, &path.index(index))?);
            }
        }
        single => tree.push(decode_conditional(decoder, single, path)?),
    }
    Ok(tree)
}

fn decode_conditional(decoder: &Decoder<'_>, value: &Value, path: &JsonPath) -> Result<ConditionalNode> {
    let object = decoder.object(value, path)?;
    let condition = match object.get("condition") {
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::String(expression)) => expression.clone(),
        Some(other) => return Err(decoder.mismatch(&path.key("condition"), "Boolean or String", other)),
        None => return Err(decoder.missing(path, "condition")),
    };

    let (then, otherwise) = match object.get("then") {
        Some(then) => {
            let then = branch_body(decoder, then, &path.key("then"))?;
            let otherwise = object
                .get("else")
                .ok_or_else(|| decoder.missing(path, "else"))?;
            let otherwise = branch_body(decoder, otherwise, &path.key("else"))?;
            (then, Some(otherwise))
        }
        None => {
            let then = body_of(decoder, object, path)?;
            let otherwise = object
                .get("else")
                .map(|otherwise| branch_body(decoder, otherwise, &path.key("else")))
                .transpose()?;
            (then, otherwise)
        }
    };

    Ok(ConditionalNode::Branch {
        condition,
        then,
        otherwise,
    })
}

fn branch_body(decoder: &Decoder<'_>, value: &Value, path: &JsonPath) -> Result<ConditionalTree> {
    let object = decoder.object(value, path)?;
    body_of(decoder, object, path)
}

fn body_of(decoder: &Decoder<'_>, object: &Map<String, Value>, path: &JsonPath) -> Result<ConditionalTree> {
    let fields = decode_fields(decoder, object, path)?;
    let nested = match object.get("when") {
        Some(when) => decode_when(decoder, when, &path.key("when"))?,
        None => ConditionalTree::new(),
    };
    Ok(ConditionalTree::body(fields, nested))
}
