//! Type, field and item definitions

use crate::core_type::CoreType;
use crate::options::{OptionValue, Options};

/// A named type definition
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    /// Type name, unique within a schema
    pub name: String,
    /// Core type
    pub core_type: CoreType,
    /// Type options
    pub options: Options,
    /// Description
    pub description: String,
    /// Fields (Array, Choice, Map, Record)
    pub fields: Vec<FieldDef>,
    /// Items (Enumerated)
    pub items: Vec<ItemDef>,
}

impl TypeDef {
    /// Create a type definition with no options, description or members
    pub fn new(name: impl Into<String>, core_type: CoreType) -> Self {
        Self {
            name: name.into(),
            core_type,
            options: Options::new(),
            description: String::new(),
            fields: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Add an option
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a field
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Append an item
    pub fn with_item(mut self, item: ItemDef) -> Self {
        self.items.push(item);
        self
    }

    /// Field names are labels carried in descriptions rather than identifiers
    pub fn is_id_typed(&self) -> bool {
        self.core_type == CoreType::Array
            || self.options.contains_key("id")
            || self.options.contains_key("combine")
    }

    /// Look up a field by id
    pub fn field_by_id(&self, id: u32) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Look up a field by name
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Number of fields or items
    pub fn member_count(&self) -> usize {
        self.fields.len() + self.items.len()
    }
}

/// A field of an Array, Choice, Map or Record
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Positive id, unique within the type
    pub id: u32,
    /// Field name
    pub name: String,
    /// Referenced type name
    pub type_ref: String,
    /// Field options (may include type options refining the referenced type)
    pub options: Options,
    /// Description
    pub description: String,
}

impl FieldDef {
    /// Create a field
    pub fn new(id: u32, name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            type_ref: type_ref.into(),
            options: Options::new(),
            description: String::new(),
        }
    }

    /// Add an option
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Minimum occurrences (default 1)
    pub fn min_occurs(&self) -> i64 {
        self.options
            .get("minOccurs")
            .and_then(OptionValue::as_int)
            .unwrap_or(1)
    }

    /// Maximum occurrences (default 1, -1 unbounded)
    pub fn max_occurs(&self) -> i64 {
        self.options
            .get("maxOccurs")
            .and_then(OptionValue::as_int)
            .unwrap_or(1)
    }

    /// True if the field is a flag option
    pub fn has_flag(&self, name: &str) -> bool {
        self.options.get(name) == Some(&OptionValue::Bool(true))
    }
}

/// An item of an Enumerated type
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDef {
    /// Id, unique within the enumeration
    pub id: u32,
    /// Item value
    pub value: String,
    /// Description
    pub description: String,
}

impl ItemDef {
    /// Create an item
    pub fn new(id: u32, value: impl Into<String>) -> Self {
        Self {
            id,
            value: value.into(),
            description: String::new(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
