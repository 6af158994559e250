//! Name rules
//!
//! Type names, field names and namespace prefixes are checked against the
//! patterns in the schema's `config` metadata, falling back to defaults.

use crate::core_type::CoreType;
use crate::error::{Error, Result};
use crate::model::Meta;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Default `$TypeName` pattern
pub const DEFAULT_TYPE_NAME: &str = r"^[A-Z][-.A-Za-z0-9]{0,63}$";
/// Default `$FieldName` pattern
pub const DEFAULT_FIELD_NAME: &str = r"^[a-z][_A-Za-z0-9]{0,63}$";
/// Default `$NSID` pattern
pub const DEFAULT_NSID: &str = r"^([A-Za-z][A-Za-z0-9]{0,7})?$";

static TYPE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(DEFAULT_TYPE_NAME).unwrap());
static FIELD_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(DEFAULT_FIELD_NAME).unwrap());
static NSID: Lazy<Regex> = Lazy::new(|| Regex::new(DEFAULT_NSID).unwrap());

/// Schema configuration from `meta.config`
#[derive(Debug, Clone)]
pub struct SchemaConfig {
    /// Maximum length of a Binary value
    pub max_binary: i64,
    /// Maximum length of a String value
    pub max_string: i64,
    /// Maximum number of elements in a container
    pub max_elements: i64,
    /// Separator between a namespace prefix and a type name
    pub sys: String,
    /// Pattern for type names
    pub type_name: Regex,
    /// Pattern for field names
    pub field_name: Regex,
    /// Pattern for namespace prefixes
    pub nsid: Regex,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            max_binary: 255,
            max_string: 255,
            max_elements: 255,
            sys: ".".to_string(),
            type_name: TYPE_NAME.clone(),
            field_name: FIELD_NAME.clone(),
            nsid: NSID.clone(),
        }
    }
}

impl SchemaConfig {
    /// Read the configuration of a schema, applying overrides from `meta.config`
    pub fn from_meta(meta: &Meta) -> Result<Self> {
        let mut config = Self::default();
        let Some(overrides) = meta.config() else {
            return Ok(config);
        };
        for (key, value) in overrides {
            match key.as_str() {
                "$MaxBinary" => config.max_binary = int_value(key, value)?,
                "$MaxString" => config.max_string = int_value(key, value)?,
                "$MaxElements" => config.max_elements = int_value(key, value)?,
                "$Sys" => config.sys = str_value(key, value)?.to_string(),
                "$TypeName" => config.type_name = pattern(key, value)?,
                "$FieldName" => config.field_name = pattern(key, value)?,
                "$NSID" => config.nsid = pattern(key, value)?,
                _ => return Err(Error::Invalid(format!("unknown config key '{}'", key))),
            }
        }
        Ok(config)
    }

    /// Check a type name (without namespace prefix)
    pub fn is_valid_type_name(&self, name: &str) -> bool {
        self.type_name.is_match(name)
    }

    /// Check a field or item name
    pub fn is_valid_field_name(&self, name: &str) -> bool {
        self.field_name.is_match(name)
    }

    /// Check a namespace prefix
    pub fn is_valid_nsid(&self, prefix: &str) -> bool {
        self.nsid.is_match(prefix)
    }

    /// Largest `maxLength` allowed for a core type, if the config bounds it
    pub fn max_length(&self, core_type: CoreType) -> Option<(&'static str, i64)> {
        match core_type {
            CoreType::Binary => Some(("$MaxBinary", self.max_binary)),
            CoreType::String => Some(("$MaxString", self.max_string)),
            CoreType::Array | CoreType::ArrayOf | CoreType::Map | CoreType::MapOf | CoreType::Record => {
                Some(("$MaxElements", self.max_elements))
            }
            _ => None,
        }
    }
}

/// Split `prefix<sys>Name` at the first separator
pub fn split_typeref<'a>(typeref: &'a str, sys: &str) -> (Option<&'a str>, &'a str) {
    if sys.is_empty() {
        return (None, typeref);
    }
    match typeref.split_once(sys) {
        Some((prefix, local)) if !prefix.is_empty() => (Some(prefix), local),
        _ => (None, typeref),
    }
}

fn int_value(key: &str, value: &Value) -> Result<i64> {
    value
        .as_i64()
        .filter(|n| *n >= 0)
        .ok_or_else(|| Error::Invalid(format!("config {} must be a non-negative integer", key)))
}

fn str_value<'a>(key: &str, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| Error::Invalid(format!("config {} must be a string", key)))
}

fn pattern(key: &str, value: &Value) -> Result<Regex> {
    let text = str_value(key, value)?;
    Regex::new(text).map_err(|e| Error::Invalid(format!("config {} is not a valid pattern: {}", key, e)))
}
