//! Attribute values stored on entities and edges.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Attribute bag attached to a relation edge.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// Scalar value of an entity or edge attribute.
///
/// Equality and hashing are total: floats compare by bit pattern, so
/// `NaN == NaN` and `0.0 != -0.0`. This keeps values usable in sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Errors converting foreign values into attribute values.
#[derive(Debug, Error, PartialEq)]
pub enum ValueError {
    #[error("Unsupported attribute value: {kind} values cannot be stored as attributes")]
    Unsupported { kind: &'static str },

    #[error("Number out of range for an attribute value: {0}")]
    NumberOutOfRange(String),
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttributeValue::Null, AttributeValue::Null) => true,
            (AttributeValue::Bool(a), AttributeValue::Bool(b)) => a == b,
            (AttributeValue::Int(a), AttributeValue::Int(b)) => a == b,
            (AttributeValue::Float(a), AttributeValue::Float(b)) => a.to_bits() == b.to_bits(),
            (AttributeValue::Str(a), AttributeValue::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for AttributeValue {}

impl Hash for AttributeValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            AttributeValue::Null => {}
            AttributeValue::Bool(b) => b.hash(state),
            AttributeValue::Int(i) => i.hash(state),
            AttributeValue::Float(f) => f.to_bits().hash(state),
            AttributeValue::Str(s) => s.hash(state),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Str(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Str(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Int(i64::from(value))
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl TryFrom<serde_json::Value> for AttributeValue {
    type Error = ValueError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Null => Ok(AttributeValue::Null),
            serde_json::Value::Bool(b) => Ok(AttributeValue::Bool(b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(AttributeValue::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(AttributeValue::Float(f))
                } else {
                    Err(ValueError::NumberOutOfRange(n.to_string()))
                }
            }
            serde_json::Value::String(s) => Ok(AttributeValue::Str(s)),
            serde_json::Value::Array(_) => Err(ValueError::Unsupported { kind: "array" }),
            serde_json::Value::Object(_) => Err(ValueError::Unsupported { kind: "object" }),
        }
    }
}

/// Build an attribute map from a JSON object.
///
/// Fails on non-object input or on any nested array/object value.
pub fn attribute_map_from_json(value: serde_json::Value) -> Result<AttributeMap, ValueError> {
    match value {
        serde_json::Value::Object(fields) => fields
            .into_iter()
            .map(|(key, value)| Ok((key, AttributeValue::try_from(value)?)))
            .collect(),
        other => Err(ValueError::Unsupported {
            kind: json_kind(&other),
        }),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Null => write!(f, "null"),
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Int(i) => write!(f, "{}", i),
            AttributeValue::Float(x) => write!(f, "{}", x),
            AttributeValue::Str(s) => write!(f, "{}", s),
        }
    }
}
