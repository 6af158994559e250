//! Schema, metadata and the construction invariants

use super::typedef::TypeDef;
use crate::error::{Error, Result};
use crate::options::OptionValue;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;

/// Preferred order of reserved metadata keys when printing
pub const META_ORDER: [&str; 11] = [
    "title",
    "package",
    "version",
    "jadn_version",
    "description",
    "comment",
    "copyright",
    "license",
    "namespaces",
    "roots",
    "config",
];

/// Schema metadata: key to JSON value, in encounter order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Meta(IndexMap<String, Value>);

impl Meta {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a string value by key
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Insert or replace a value
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// True if no metadata is present
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Entries in encounter order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Entries with reserved keys first in preferred order, then the rest in encounter order
    pub fn ordered(&self) -> Vec<(&str, &Value)> {
        let mut out: Vec<(&str, &Value)> = META_ORDER
            .iter()
            .filter_map(|k| self.0.get_key_value(*k))
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        out.extend(
            self.0
                .iter()
                .filter(|(k, _)| !META_ORDER.contains(&k.as_str()))
                .map(|(k, v)| (k.as_str(), v)),
        );
        out
    }

    /// Declared root type names
    pub fn roots(&self) -> Vec<&str> {
        self.0
            .get("roots")
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Declared namespaces as (prefix, uri) pairs
    pub fn namespaces(&self) -> Vec<(&str, &str)> {
        self.0
            .get("namespaces")
            .and_then(Value::as_array)
            .map(|a| {
                a.iter()
                    .filter_map(|pair| match pair.as_array().map(|p| p.as_slice()) {
                        Some([Value::String(prefix), Value::String(uri)]) => {
                            Some((prefix.as_str(), uri.as_str()))
                        }
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Schema configuration overrides
    pub fn config(&self) -> Option<&serde_json::Map<String, Value>> {
        self.0.get("config").and_then(Value::as_object)
    }

    /// Metadata as a JSON object
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

impl FromIterator<(String, Value)> for Meta {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A validated schema
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    meta: Meta,
    types: Vec<TypeDef>,
}

impl Schema {
    /// Assemble a schema, enforcing the construction invariants
    pub fn new(meta: Meta, types: Vec<TypeDef>) -> Result<Self> {
        validate_types(&types)?;
        Ok(Self { meta, types })
    }

    /// Schema metadata
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Type definitions in declaration order
    pub fn types(&self) -> &[TypeDef] {
        &self.types
    }

    /// Look up a type definition by name
    pub fn get_type(&self, name: &str) -> Option<&TypeDef> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Type names in declaration order
    pub fn type_names(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.name.as_str()).collect()
    }

    pub(crate) fn types_mut(&mut self) -> &mut Vec<TypeDef> {
        &mut self.types
    }
}

/// Incremental schema construction
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    meta: Meta,
    types: Vec<TypeDef>,
}

impl SchemaBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a metadata value
    pub fn meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key, value);
        self
    }

    /// Append a type definition
    pub fn add_type(mut self, typedef: TypeDef) -> Self {
        self.types.push(typedef);
        self
    }

    /// Validate and produce the schema
    pub fn build(self) -> Result<Schema> {
        Schema::new(self.meta, self.types)
    }
}

fn validate_types(types: &[TypeDef]) -> Result<()> {
    let mut names = HashSet::new();
    for td in types {
        if !names.insert(td.name.as_str()) {
            return Err(Error::Duplicate(format!("type '{}'", td.name)));
        }
        validate_members(td)?;
    }
    Ok(())
}

fn validate_members(td: &TypeDef) -> Result<()> {
    if !td.fields.is_empty() && !td.core_type.has_fields() {
        return Err(Error::Invalid(format!(
            "{} type '{}' cannot have fields",
            td.core_type, td.name
        )));
    }
    if !td.items.is_empty() && !td.core_type.has_items() {
        return Err(Error::Invalid(format!(
            "{} type '{}' cannot have items",
            td.core_type, td.name
        )));
    }

    let mut ids = HashSet::new();
    for item in &td.items {
        if !ids.insert(item.id) {
            return Err(Error::Duplicate(format!(
                "item id {} in '{}'",
                item.id, td.name
            )));
        }
    }

    ids.clear();
    for field in &td.fields {
        if field.id == 0 {
            return Err(Error::Invalid(format!(
                "field '{}' in '{}' must have a positive id",
                field.name, td.name
            )));
        }
        if !ids.insert(field.id) {
            return Err(Error::Duplicate(format!(
                "field id {} in '{}'",
                field.id, td.name
            )));
        }
    }

    for field in &td.fields {
        match field.options.get("tagid") {
            None => {}
            Some(OptionValue::Int(id)) => {
                let known = u32::try_from(*id).map_or(false, |id| ids.contains(&id));
                if !known {
                    return Err(Error::Reference(format!(
                        "tagid {} of field '{}' in '{}' names no sibling field",
                        id, field.name, td.name
                    )));
                }
            }
            Some(other) => {
                return Err(Error::Reference(format!(
                    "unresolved tagid {} of field '{}' in '{}'",
                    other, field.name, td.name
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_type::CoreType;
    use crate::model::{FieldDef, ItemDef};
    use serde_json::json;

    fn record(name: &str) -> TypeDef {
        TypeDef::new(name, CoreType::Record).with_field(FieldDef::new(1, "a", "String"))
    }

    #[test]
    fn test_duplicate_type_names() {
        let err = SchemaBuilder::new()
            .add_type(record("A"))
            .add_type(record("A"))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Duplicate(_)));
    }

    #[test]
    fn test_duplicate_field_ids() {
        let td = record("A").with_field(FieldDef::new(1, "b", "Integer"));
        assert!(matches!(
            SchemaBuilder::new().add_type(td).build(),
            Err(Error::Duplicate(_))
        ));
    }

    #[test]
    fn test_zero_field_id() {
        let td = TypeDef::new("A", CoreType::Map).with_field(FieldDef::new(0, "a", "String"));
        assert!(matches!(
            SchemaBuilder::new().add_type(td).build(),
            Err(Error::Invalid(_))
        ));
    }

    #[test]
    fn test_duplicate_item_ids() {
        let td = TypeDef::new("Color", CoreType::Enumerated)
            .with_item(ItemDef::new(1, "red"))
            .with_item(ItemDef::new(1, "green"));
        assert!(matches!(
            SchemaBuilder::new().add_type(td).build(),
            Err(Error::Duplicate(_))
        ));
    }

    #[test]
    fn test_members_match_core_type() {
        let td = TypeDef::new("Name", CoreType::String).with_field(FieldDef::new(1, "a", "String"));
        assert!(SchemaBuilder::new().add_type(td).build().is_err());

        let td = TypeDef::new("Pick", CoreType::Choice).with_item(ItemDef::new(1, "x"));
        assert!(SchemaBuilder::new().add_type(td).build().is_err());
    }

    #[test]
    fn test_tagid_must_name_sibling() {
        let td = TypeDef::new("Msg", CoreType::Record)
            .with_field(FieldDef::new(1, "kind", "Kind"))
            .with_field(FieldDef::new(2, "body", "Body").with_option("tagid", 1i64));
        assert!(SchemaBuilder::new().add_type(td).build().is_ok());

        let td = TypeDef::new("Msg", CoreType::Record)
            .with_field(FieldDef::new(2, "body", "Body").with_option("tagid", 7i64));
        assert!(matches!(
            SchemaBuilder::new().add_type(td).build(),
            Err(Error::Reference(_))
        ));
    }

    #[test]
    fn test_meta_accessors() {
        let schema = SchemaBuilder::new()
            .meta("x-extra", json!(1))
            .meta("roots", json!(["A"]))
            .meta("title", json!("Demo"))
            .meta("namespaces", json!([["ex", "http://example.com/ex"]]))
            .add_type(record("A"))
            .build()
            .unwrap();

        let keys: Vec<&str> = schema.meta().ordered().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["title", "namespaces", "roots", "x-extra"]);
        assert_eq!(schema.meta().roots(), vec!["A"]);
        assert_eq!(
            schema.meta().namespaces(),
            vec![("ex", "http://example.com/ex")]
        );
        assert!(schema.get_type("A").is_some());
    }
}
