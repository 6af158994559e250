//! JADN core types
//!
//! The closed set of structural and primitive kinds a type definition may have.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Core type of a type definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreType {
    /// Sequence of octets
    Binary,
    /// true or false
    Boolean,
    /// Whole number
    Integer,
    /// Real number
    Number,
    /// Sequence of characters
    String,
    /// Vocabulary of items
    Enumerated,
    /// One field selected from a set of fields
    Choice,
    /// Ordered list of labeled fields, by position
    Array,
    /// Ordered list of fields of one type
    ArrayOf,
    /// Unordered map from a set of specified keys
    Map,
    /// Unordered map from a key type to a value type
    MapOf,
    /// Ordered map from a list of keys, by name or position
    Record,
}

impl CoreType {
    /// All core types in definition order
    pub const ALL: [CoreType; 12] = [
        CoreType::Binary,
        CoreType::Boolean,
        CoreType::Integer,
        CoreType::Number,
        CoreType::String,
        CoreType::Enumerated,
        CoreType::Choice,
        CoreType::Array,
        CoreType::ArrayOf,
        CoreType::Map,
        CoreType::MapOf,
        CoreType::Record,
    ];

    /// Parse a core type from its name
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|ct| ct.as_str() == s)
    }

    /// Name of the core type
    pub fn as_str(&self) -> &'static str {
        match self {
            CoreType::Binary => "Binary",
            CoreType::Boolean => "Boolean",
            CoreType::Integer => "Integer",
            CoreType::Number => "Number",
            CoreType::String => "String",
            CoreType::Enumerated => "Enumerated",
            CoreType::Choice => "Choice",
            CoreType::Array => "Array",
            CoreType::ArrayOf => "ArrayOf",
            CoreType::Map => "Map",
            CoreType::MapOf => "MapOf",
            CoreType::Record => "Record",
        }
    }

    /// Kinds whose definition lists FieldDefs
    pub fn has_fields(&self) -> bool {
        matches!(
            self,
            CoreType::Array | CoreType::Choice | CoreType::Map | CoreType::Record
        )
    }

    /// Kinds whose definition lists ItemDefs
    pub fn has_items(&self) -> bool {
        matches!(self, CoreType::Enumerated)
    }
}

impl fmt::Display for CoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CoreType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| Error::Invalid(format!("unknown core type '{}'", s)))
    }
}

/// True if a type reference names a built-in core type
pub fn is_builtin(name: &str) -> bool {
    CoreType::parse(name).is_some()
}
