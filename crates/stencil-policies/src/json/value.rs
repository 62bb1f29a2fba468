//! JSON values produced by [`JsonLiteral`](super::JsonLiteral).

use std::fmt;

use ordered_float::OrderedFloat;
use stencil_core::{Dynamic, Native};

use super::JsonError;

/// A JSON value. Objects keep insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    String(String),
    Array(Vec<JsonValue>),
    Object(JsonObject),
}

impl Native for JsonValue {
    fn type_name() -> &'static str {
        "JsonValue"
    }
}

impl JsonValue {
    /// Build an object from key/value pairs, keeping their order.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, JsonValue)>,
    {
        JsonValue::Object(JsonObject {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })
    }

    pub fn array(values: impl IntoIterator<Item = JsonValue>) -> Self {
        JsonValue::Array(values.into_iter().collect())
    }

    pub fn as_object(&self) -> Option<&JsonObject> {
        match self {
            JsonValue::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Look up `key` if this is an object.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.as_object().and_then(|object| object.get(key))
    }

    /// Convert an argument into a JSON value.
    ///
    /// Nested `JsonValue` host values are cloned in; other host values are
    /// rejected.
    pub fn from_dynamic(value: &Dynamic) -> Result<Self, JsonError> {
        Ok(match value {
            Dynamic::Null => JsonValue::Null,
            Dynamic::Bool(b) => JsonValue::Bool(*b),
            Dynamic::Int(i) => JsonValue::Int(*i),
            Dynamic::Float(f) => JsonValue::Float(OrderedFloat(*f)),
            Dynamic::String(s) => JsonValue::String(s.clone()),
            Dynamic::Array(items) => JsonValue::Array(
                items
                    .iter()
                    .map(JsonValue::from_dynamic)
                    .collect::<Result<_, _>>()?,
            ),
            Dynamic::Native(native) => native
                .downcast_ref::<JsonValue>()
                .cloned()
                .ok_or(JsonError::UnsupportedValue {
                    type_name: value.type_name(),
                })?,
        })
    }
}

impl From<&str> for JsonValue {
    fn from(s: &str) -> Self {
        JsonValue::String(s.to_owned())
    }
}

impl From<String> for JsonValue {
    fn from(s: String) -> Self {
        JsonValue::String(s)
    }
}

impl From<i64> for JsonValue {
    fn from(i: i64) -> Self {
        JsonValue::Int(i)
    }
}

impl From<f64> for JsonValue {
    fn from(f: f64) -> Self {
        JsonValue::Float(OrderedFloat(f))
    }
}

impl From<bool> for JsonValue {
    fn from(b: bool) -> Self {
        JsonValue::Bool(b)
    }
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonValue::Null => f.write_str("null"),
            JsonValue::Bool(b) => write!(f, "{}", b),
            JsonValue::Int(i) => write!(f, "{}", i),
            JsonValue::Float(x) => write!(f, "{}", x),
            JsonValue::String(s) => write_quoted(f, s),
            JsonValue::Array(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str("]")
            }
            JsonValue::Object(object) => write!(f, "{}", object),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

/// An insertion-ordered JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonObject {
    entries: Vec<(String, JsonValue)>,
}

impl JsonObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, key: String, value: JsonValue) {
        self.entries.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Display for JsonObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write_quoted(f, key)?;
            write!(f, ": {}", value)?;
        }
        f.write_str("}")
    }
}
