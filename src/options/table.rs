//! Option table
//!
//! Registry of every recognized option: tag character, name, value kind,
//! canonical rank and the core types it may qualify. The table is built from
//! the embedded vocabulary document `data/options.jadn`, which is itself a
//! JADN schema; only the reduced subset needed here is parsed by hand.

use crate::core_type::CoreType;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Embedded option vocabulary
pub const BOOTSTRAP: &str = include_str!("../../data/options.jadn");

/// Name of the Enumerated type holding the vocabulary
const VOCABULARY_TYPE: &str = "Option";

static GLOBAL: OnceCell<OptionTable> = OnceCell::new();

/// Kind of value an option payload decodes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Presence flag: no payload, value is `true`
    Flag,
    /// `true` / `false`
    Boolean,
    /// Signed whole number
    Integer,
    /// Finite floating point number
    Number,
    /// Text
    String,
    /// Hex-encoded bytes
    Binary,
    /// Name of a type definition
    TypeRef,
}

impl ValueKind {
    /// Kind of a context-dependent option on the given core type or type reference
    pub fn for_context(context: &str) -> Self {
        match CoreType::parse(context) {
            Some(CoreType::Binary) => ValueKind::Binary,
            Some(CoreType::Boolean) => ValueKind::Boolean,
            Some(CoreType::Integer) => ValueKind::Integer,
            Some(CoreType::Number) => ValueKind::Number,
            _ => ValueKind::String,
        }
    }

    fn parse(word: &str) -> Option<Option<Self>> {
        match word {
            "Flag" => Some(Some(ValueKind::Flag)),
            "Boolean" => Some(Some(ValueKind::Boolean)),
            "Integer" => Some(Some(ValueKind::Integer)),
            "Number" => Some(Some(ValueKind::Number)),
            "String" => Some(Some(ValueKind::String)),
            "Binary" => Some(Some(ValueKind::Binary)),
            "TypeRef" => Some(Some(ValueKind::TypeRef)),
            "Context" => Some(None),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::Flag => "flag",
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Binary => "binary",
            ValueKind::TypeRef => "type reference",
        };
        write!(f, "{}", s)
    }
}

/// Whether an option qualifies a type definition or a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionScope {
    /// Ranked before the sentinel
    Type,
    /// Ranked after the sentinel
    Field,
}

/// One option of the vocabulary
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDef {
    /// Tag character
    pub tag: char,
    /// Option name
    pub name: String,
    /// Declared kind; `None` means the kind follows the context type
    pub kind: Option<ValueKind>,
    /// Canonical sort rank
    pub rank: usize,
    /// Type or field option
    pub scope: OptionScope,
    /// Core types this option is legal for (type options only)
    pub legal: Vec<CoreType>,
}

impl OptionDef {
    /// Presence flags carry no payload
    pub fn is_flag(&self) -> bool {
        self.kind == Some(ValueKind::Flag)
    }

    /// Kind of the value in the given context
    pub fn value_kind(&self, context: &str) -> ValueKind {
        self.kind.unwrap_or_else(|| ValueKind::for_context(context))
    }

    /// Check whether this option may appear in the options of a type with this core type
    pub fn is_legal_for(&self, core_type: CoreType) -> bool {
        self.scope == OptionScope::Type && self.legal.contains(&core_type)
    }
}

/// Immutable option registry
#[derive(Debug, Clone)]
pub struct OptionTable {
    /// Definitions keyed by tag, in rank order
    by_tag: IndexMap<char, OptionDef>,
    /// Name to tag index
    by_name: HashMap<String, char>,
    /// Rank of the type/field separator
    sentinel_rank: usize,
}

impl OptionTable {
    /// Build the table from the embedded vocabulary
    pub fn load() -> Result<Self> {
        Self::from_bootstrap(BOOTSTRAP)
    }

    /// Process-wide table, initialized on first use
    pub fn global() -> Result<&'static OptionTable> {
        GLOBAL.get_or_try_init(Self::load)
    }

    /// Build a table from a vocabulary document in serialized JADN form
    pub fn from_bootstrap(text: &str) -> Result<Self> {
        let doc: Value = serde_json::from_str(text)?;
        let items = vocabulary_items(&doc)?;

        let mut by_tag = IndexMap::new();
        let mut by_name = HashMap::new();
        let mut sentinel_rank = None;

        for (rank, item) in items.iter().enumerate() {
            let (code, name, desc) = match item.as_array().map(|a| a.as_slice()) {
                Some([Value::Number(code), Value::String(name), Value::String(desc)]) => {
                    (code, name, desc)
                }
                _ => {
                    return Err(Error::Structural(format!(
                        "option vocabulary item {} is not [codepoint, name, kind]",
                        rank
                    )))
                }
            };
            let tag = code
                .as_u64()
                .and_then(|c| u32::try_from(c).ok())
                .and_then(char::from_u32)
                .ok_or_else(|| {
                    Error::Structural(format!("option '{}' has an invalid tag {}", name, code))
                })?;

            let (kind_word, legal_words) = match desc.split_once('|') {
                Some((k, l)) => (k.trim(), l.trim()),
                None => (desc.trim(), ""),
            };

            if kind_word == "Sentinel" {
                if sentinel_rank.replace(rank).is_some() {
                    return Err(Error::Duplicate("option vocabulary sentinel".to_string()));
                }
                continue;
            }

            let kind = ValueKind::parse(kind_word).ok_or_else(|| {
                Error::Structural(format!(
                    "option '{}' has unknown kind '{}'",
                    name, kind_word
                ))
            })?;
            let scope = if sentinel_rank.is_some() {
                OptionScope::Field
            } else {
                OptionScope::Type
            };
            let legal = if legal_words == "*" {
                Vec::new()
            } else {
                legal_words
                    .split_whitespace()
                    .map(|w| w.parse::<CoreType>())
                    .collect::<Result<Vec<_>>>()?
            };

            if by_name.insert(name.clone(), tag).is_some() {
                return Err(Error::Duplicate(format!("option name '{}'", name)));
            }
            let def = OptionDef {
                tag,
                name: name.clone(),
                kind,
                rank,
                scope,
                legal,
            };
            if by_tag.insert(tag, def).is_some() {
                return Err(Error::Duplicate(format!("option tag '{}'", tag)));
            }
        }

        let sentinel_rank = sentinel_rank.ok_or_else(|| {
            Error::Structural("option vocabulary has no field-option sentinel".to_string())
        })?;

        tracing::debug!(options = by_tag.len(), "option table loaded");
        Ok(Self {
            by_tag,
            by_name,
            sentinel_rank,
        })
    }

    /// Look up an option by tag character
    pub fn get(&self, tag: char) -> Option<&OptionDef> {
        self.by_tag.get(&tag)
    }

    /// Look up an option by name
    pub fn by_name(&self, name: &str) -> Option<&OptionDef> {
        self.by_name.get(name).and_then(|tag| self.by_tag.get(tag))
    }

    /// Tag character of an option name
    pub fn tag(&self, name: &str) -> Option<char> {
        self.by_name.get(name).copied()
    }

    /// Canonical rank of an option name
    pub fn rank(&self, name: &str) -> Option<usize> {
        self.by_name(name).map(|d| d.rank)
    }

    /// True if the tag belongs to a type-level option
    pub fn is_type_option(&self, tag: char) -> bool {
        self.get(tag).map_or(false, |d| d.rank < self.sentinel_rank)
    }

    /// True if the tag belongs to a field-level option
    pub fn is_field_option(&self, tag: char) -> bool {
        self.get(tag).map_or(false, |d| d.rank > self.sentinel_rank)
    }

    /// All options in rank order
    pub fn iter(&self) -> impl Iterator<Item = &OptionDef> {
        self.by_tag.values()
    }

    /// Number of options
    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    /// True if the table has no options
    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}

fn vocabulary_items(doc: &Value) -> Result<&Vec<Value>> {
    let types = doc
        .get("types")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Structural("option vocabulary has no types".to_string()))?;

    types
        .iter()
        .filter_map(Value::as_array)
        .find(|td| {
            td.first().and_then(Value::as_str) == Some(VOCABULARY_TYPE)
                && td.get(1).and_then(Value::as_str) == Some("Enumerated")
        })
        .and_then(|td| td.get(4))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            Error::Structural(format!(
                "option vocabulary has no Enumerated '{}' items",
                VOCABULARY_TYPE
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_bootstrap() {
        let table = OptionTable::load().unwrap();
        assert_eq!(table.len(), 31);
        assert_eq!(table.tag("minLength"), Some('{'));
        assert_eq!(table.get('&').unwrap().name, "tagid");
        assert!(table.get('|').is_none());
    }

    #[test]
    fn test_scope_partition() {
        let table = OptionTable::load().unwrap();
        assert!(table.is_type_option('%'));
        assert!(!table.is_field_option('%'));
        assert!(table.is_field_option('['));
        assert!(table.is_field_option('K'));
        assert!(!table.is_type_option('K'));
        assert!(!table.is_type_option('?'));
    }

    #[test]
    fn test_rank_order_matches_vocabulary() {
        let table = OptionTable::load().unwrap();
        let names: Vec<&str> = table.iter().take(4).map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["id", "vtype", "ktype", "enum"]);
        assert!(table.rank("const").unwrap() < table.rank("minOccurs").unwrap());
    }

    #[test]
    fn test_context_kind() {
        let table = OptionTable::load().unwrap();
        let def = table.by_name("minInclusive").unwrap();
        assert_eq!(def.value_kind("Number"), ValueKind::Number);
        assert_eq!(def.value_kind("Integer"), ValueKind::Integer);
        assert_eq!(def.value_kind("Person"), ValueKind::String);
        assert!(def.is_legal_for(CoreType::Integer));
        assert!(!def.is_legal_for(CoreType::String));
    }

    #[test]
    fn test_duplicate_tag_fails() {
        let doc = r#"{"types": [["Option", "Enumerated", [], "", [
            [61, "id", "Flag | Map"],
            [61, "other", "Flag | Map"],
            [124, "fieldOptions", "Sentinel"]
        ]]]}"#;
        assert!(matches!(
            OptionTable::from_bootstrap(doc),
            Err(Error::Duplicate(_))
        ));
    }

    #[test]
    fn test_duplicate_name_fails() {
        let doc = r#"{"types": [["Option", "Enumerated", [], "", [
            [61, "id", "Flag | Map"],
            [124, "fieldOptions", "Sentinel"],
            [62, "id", "Flag | *"]
        ]]]}"#;
        assert!(matches!(
            OptionTable::from_bootstrap(doc),
            Err(Error::Duplicate(_))
        ));
    }

    #[test]
    fn test_missing_sentinel_fails() {
        let doc = r#"{"types": [["Option", "Enumerated", [], "", [[61, "id", "Flag | Map"]]]]}"#;
        assert!(matches!(
            OptionTable::from_bootstrap(doc),
            Err(Error::Structural(_))
        ));
    }

    #[test]
    fn test_global_is_shared() {
        let a = OptionTable::global().unwrap();
        let b = OptionTable::global().unwrap();
        assert!(std::ptr::eq(a, b));
    }
}
