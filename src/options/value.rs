//! Decoded option values

use super::table::ValueKind;
use indexmap::IndexMap;
use std::fmt;

/// Decoded options: option name to value.
///
/// Insertion order is not significant; encoding always sorts by rank.
pub type Options = IndexMap<String, OptionValue>;

/// A decoded option value
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// Flag or boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Finite number
    Float(f64),
    /// Text
    Text(String),
    /// Bytes
    Bytes(Vec<u8>),
    /// Type reference, possibly prefixed with `#` (enum) or `>` (pointer)
    Ref(String),
}

impl OptionValue {
    /// Check whether this value is representable as the given kind
    pub fn matches(&self, kind: ValueKind) -> bool {
        matches!(
            (self, kind),
            (OptionValue::Bool(true), ValueKind::Flag)
                | (OptionValue::Bool(_), ValueKind::Boolean)
                | (OptionValue::Int(_), ValueKind::Integer)
                | (OptionValue::Float(_), ValueKind::Number)
                | (OptionValue::Text(_), ValueKind::String)
                | (OptionValue::Bytes(_), ValueKind::Binary)
                | (OptionValue::Ref(_), ValueKind::TypeRef)
        )
    }

    /// Integer value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Text or type reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Text(s) | OptionValue::Ref(s) => Some(s),
            _ => None,
        }
    }

    /// Canonical payload text (empty for flags)
    pub fn payload(&self, kind: ValueKind) -> String {
        match (self, kind) {
            (OptionValue::Bool(_), ValueKind::Flag) => String::new(),
            _ => self.to_string(),
        }
    }

    /// Value as JSON, used by notations that embed option values in JSON text
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            OptionValue::Bool(b) => serde_json::Value::Bool(*b),
            OptionValue::Int(i) => serde_json::Value::from(*i),
            OptionValue::Float(f) => serde_json::Value::from(*f),
            OptionValue::Text(s) | OptionValue::Ref(s) => serde_json::Value::String(s.clone()),
            OptionValue::Bytes(b) => serde_json::Value::String(hex::encode(b)),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Int(i) => write!(f, "{}", i),
            OptionValue::Float(x) => write!(f, "{}", format_float(*x)),
            OptionValue::Text(s) | OptionValue::Ref(s) => write!(f, "{}", s),
            OptionValue::Bytes(b) => write!(f, "{}", hex::encode(b)),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        OptionValue::Int(i)
    }
}

impl From<f64> for OptionValue {
    fn from(x: f64) -> Self {
        OptionValue::Float(x)
    }
}

/// Canonical text of a number: integral values keep a trailing `.0`
pub fn format_float(x: f64) -> String {
    let mut s = x.to_string();
    if !s.contains('.') && x.is_finite() {
        s.push_str(".0");
    }
    s
}
