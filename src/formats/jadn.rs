//! JADN serialized form
//!
//! A JSON object with optional `meta` and required `types`. Type definitions
//! are positional arrays whose trailing default-valued slots may be omitted;
//! [`type_from_wire`] pads them and [`type_to_wire`] strips them again.

use super::{SchemaReader, SchemaWriter};
use crate::config::{style_as, Style};
use crate::core_type::CoreType;
use crate::error::{Error, Result};
use crate::model::{FieldDef, ItemDef, Meta, Schema, TypeDef};
use crate::options::{self, OptionTable, Options};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Embedded structural schema of the serialized form
const STRUCTURE_SCHEMA: &str = include_str!("../../data/jadn_v2.0_schema.json");

static STRUCTURE: OnceCell<jsonschema::Validator> = OnceCell::new();

/// The `jadn` format
#[derive(Debug, Clone, Copy)]
pub struct JadnFormat;

/// Layout options of the serialized form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JadnStyle {
    /// Omit blank lines between type definitions
    pub strip: bool,
}

impl Default for JadnStyle {
    fn default() -> Self {
        Self { strip: true }
    }
}

impl SchemaReader for JadnFormat {
    fn loads(&self, table: &OptionTable, text: &str) -> Result<Schema> {
        loads(table, text)
    }
}

impl SchemaWriter for JadnFormat {
    fn default_style(&self) -> Style {
        match serde_json::to_value(JadnStyle::default()) {
            Ok(Value::Object(style)) => style,
            _ => Style::new(),
        }
    }

    fn dumps(&self, table: &OptionTable, schema: &Schema, style: &Style) -> Result<String> {
        let style: JadnStyle = style_as(style)?;
        dumps(table, schema, &style)
    }
}

/// Parse and load serialized JADN text
pub fn loads(table: &OptionTable, text: &str) -> Result<Schema> {
    let doc: Value = serde_json::from_str(text)?;
    from_value(table, &doc)
}

/// Load a parsed JADN document
pub fn from_value(table: &OptionTable, doc: &Value) -> Result<Schema> {
    validate_structure(doc)?;

    let meta: Meta = doc
        .get("meta")
        .and_then(Value::as_object)
        .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();

    let types = doc
        .get("types")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Structural("'types' must be an array".to_string()))?
        .iter()
        .map(|td| type_from_wire(table, td))
        .collect::<Result<Vec<_>>>()?;

    Schema::new(meta, types)
}

/// Render a schema as compact, pretty-printed JADN
pub fn dumps(table: &OptionTable, schema: &Schema, style: &JadnStyle) -> Result<String> {
    let doc = to_value(table, schema)?;
    Ok(pprint(&doc, 0, style.strip) + "\n")
}

/// Serialized form of a schema, with default slots stripped and empty meta omitted
pub fn to_value(table: &OptionTable, schema: &Schema) -> Result<Value> {
    let mut doc = serde_json::Map::new();
    if !schema.meta().is_empty() {
        doc.insert("meta".to_string(), schema.meta().to_json());
    }
    let types = schema
        .types()
        .iter()
        .map(|td| type_to_wire(table, td))
        .collect::<Result<Vec<_>>>()?;
    doc.insert("types".to_string(), Value::Array(types));
    Ok(Value::Object(doc))
}

/// Check a document against the structural schema
pub fn validate_structure(doc: &Value) -> Result<()> {
    let validator = STRUCTURE.get_or_try_init(|| {
        let schema: Value = serde_json::from_str(STRUCTURE_SCHEMA)?;
        jsonschema::validator_for(&schema)
            .map_err(|e| Error::Structural(format!("structural schema: {}", e)))
    })?;

    let errors: Vec<String> = validator
        .iter_errors(doc)
        .map(|e| format!("{}: {}", e.instance_path, e))
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Structural(errors.join("; ")))
    }
}

/// Decode one positional type definition, padding omitted slots
pub fn type_from_wire(table: &OptionTable, value: &Value) -> Result<TypeDef> {
    let slots = value
        .as_array()
        .ok_or_else(|| Error::Structural(format!("type definition {} is not an array", value)))?;

    let name = slot_str(slots, 0, "type name")?.unwrap_or_default();
    let core_type: CoreType = slot_str(slots, 1, "core type")?.unwrap_or_default().parse()?;
    let tags = slot_tags(slots, 2)?;
    let description = slot_str(slots, 3, "type description")?.unwrap_or_default();
    let members = match slots.get(4) {
        None => &[][..],
        Some(Value::Array(m)) => m.as_slice(),
        Some(other) => {
            return Err(Error::Structural(format!(
                "members of '{}' must be an array, found {}",
                name, other
            )))
        }
    };

    let mut td = TypeDef::new(name, core_type).with_description(description);
    td.options = options::decode(table, &tags, core_type.as_str())?;

    if core_type.has_items() {
        td.items = members.iter().map(item_from_wire).collect::<Result<_>>()?;
    } else if core_type.has_fields() {
        td.fields = members
            .iter()
            .map(|m| field_from_wire(table, m))
            .collect::<Result<_>>()?;
    } else if !members.is_empty() {
        return Err(Error::Invalid(format!(
            "{} type '{}' cannot have fields",
            core_type, td.name
        )));
    }
    tracing::trace!(name = %td.name, core_type = %td.core_type, "decoded type");
    Ok(td)
}

fn item_from_wire(value: &Value) -> Result<ItemDef> {
    let slots = value
        .as_array()
        .filter(|s| (2..=3).contains(&s.len()))
        .ok_or_else(|| Error::Structural(format!("item {} is not [id, value, description]", value)))?;
    let id = slot_id(slots)?;
    let item_value = slot_str(slots, 1, "item value")?.unwrap_or_default();
    let description = slot_str(slots, 2, "item description")?.unwrap_or_default();
    Ok(ItemDef::new(id, item_value).with_description(description))
}

fn field_from_wire(table: &OptionTable, value: &Value) -> Result<FieldDef> {
    let slots = value
        .as_array()
        .filter(|s| (3..=5).contains(&s.len()))
        .ok_or_else(|| {
            Error::Structural(format!(
                "field {} is not [id, name, type, options, description]",
                value
            ))
        })?;
    let id = slot_id(slots)?;
    let name = slot_str(slots, 1, "field name")?.unwrap_or_default();
    let type_ref = slot_str(slots, 2, "field type")?.unwrap_or_default();
    let tags = slot_tags(slots, 3)?;
    let description = slot_str(slots, 4, "field description")?.unwrap_or_default();

    let mut field = FieldDef::new(id, name, type_ref).with_description(description);
    field.options = options::decode(table, &tags, &field.type_ref)?;
    Ok(field)
}

/// Encode one type definition, stripping default trailing slots
pub fn type_to_wire(table: &OptionTable, td: &TypeDef) -> Result<Value> {
    let members: Vec<Value> = if td.core_type.has_items() {
        td.items
            .iter()
            .map(|item| {
                strip_defaults(
                    vec![json!(item.id), json!(item.value), json!(item.description)],
                    &[None, None, Some(json!(""))],
                )
            })
            .collect()
    } else {
        td.fields
            .iter()
            .map(|f| {
                let tags = encode_tags(table, &f.options, &f.type_ref)?;
                Ok(strip_defaults(
                    vec![
                        json!(f.id),
                        json!(f.name),
                        json!(f.type_ref),
                        tags,
                        json!(f.description),
                    ],
                    &[None, None, None, Some(json!([])), Some(json!(""))],
                ))
            })
            .collect::<Result<_>>()?
    };

    let tags = encode_tags(table, &td.options, td.core_type.as_str())?;
    Ok(strip_defaults(
        vec![
            json!(td.name),
            json!(td.core_type.as_str()),
            tags,
            json!(td.description),
            Value::Array(members),
        ],
        &[None, None, Some(json!([])), Some(json!("")), Some(json!([]))],
    ))
}

fn encode_tags(table: &OptionTable, opts: &Options, context: &str) -> Result<Value> {
    Ok(Value::from(options::encode(table, opts, context)?))
}

fn strip_defaults(mut slots: Vec<Value>, defaults: &[Option<Value>]) -> Value {
    while let Some(last) = slots.last() {
        match defaults.get(slots.len() - 1) {
            Some(Some(default)) if default == last => {
                slots.pop();
            }
            _ => break,
        }
    }
    Value::Array(slots)
}

fn slot_str(slots: &[Value], index: usize, what: &str) -> Result<Option<String>> {
    match slots.get(index) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(Error::Structural(format!(
            "{} must be a string, found {}",
            what, other
        ))),
    }
}

fn slot_tags(slots: &[Value], index: usize) -> Result<Vec<String>> {
    match slots.get(index) {
        None => Ok(Vec::new()),
        Some(Value::Array(tags)) => tags
            .iter()
            .map(|t| {
                t.as_str().map(str::to_string).ok_or_else(|| {
                    Error::Structural(format!("option {} is not a tag-string", t))
                })
            })
            .collect(),
        Some(other) => Err(Error::Structural(format!(
            "options must be an array, found {}",
            other
        ))),
    }
}

fn slot_id(slots: &[Value]) -> Result<u32> {
    slots
        .first()
        .and_then(Value::as_u64)
        .and_then(|id| u32::try_from(id).ok())
        .ok_or_else(|| Error::Structural(format!("member id {:?} is not a whole number", slots.first())))
}

/// Compact layout: one type definition per line, one field per line
fn pprint(value: &Value, level: usize, strip: bool) -> String {
    const INDENT: usize = 2;
    let sp = " ".repeat(level * INDENT);
    let sp2 = " ".repeat((level + 1) * INDENT);
    let sep2 = if strip { ",\n" } else { ",\n\n" };

    match value {
        Value::Object(map) => {
            let sep = if level > 0 { ",\n" } else { sep2 };
            let lines: Vec<String> = map
                .iter()
                .map(|(k, v)| {
                    format!("{}{}: {}", sp2, Value::from(k.as_str()), pprint(v, level + 1, strip))
                })
                .collect();
            format!("{{\n{}\n{}}}", lines.join(sep), sp)
        }
        Value::Array(items) => {
            let sep = if level > 1 { ",\n" } else { sep2 };
            if matches!(items.first(), Some(Value::Array(_))) {
                let lines: Vec<String> = items
                    .iter()
                    .map(|v| format!("{}{}", sp2, pprint(v, level, strip)))
                    .collect();
                format!("[\n{}\n{}]", lines.join(sep), sp)
            } else {
                let inline: Vec<String> = items.iter().map(|v| pprint(v, level + 1, strip)).collect();
                format!("[{}]", inline.join(", "))
            }
        }
        scalar => scalar.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DEMO: &str = r#"{
  "meta": {
    "title": "Demo",
    "roots": ["Person"]
  },
  "types": [
    ["Person", "Record", [], "", [
      [1, "name", "String"],
      [2, "age", "Integer", ["[0"], "years"]
    ]],
    ["Color", "Enumerated", [], "", [
      [1, "red"],
      [2, "green", "the color"]
    ]],
    ["Name", "String", ["{1", "}64"]]
  ]
}
"#;

    fn table() -> &'static OptionTable {
        OptionTable::global().unwrap()
    }

    #[test]
    fn test_load_pads_defaults() {
        let schema = loads(table(), DEMO).unwrap();
        let person = schema.get_type("Person").unwrap();
        assert_eq!(person.fields[0].description, "");
        assert!(person.fields[0].options.is_empty());
        assert_eq!(person.fields[1].min_occurs(), 0);

        let name = schema.get_type("Name").unwrap();
        assert_eq!(name.options["maxLength"].as_int(), Some(64));
        assert!(name.fields.is_empty());
    }

    #[test]
    fn test_dump_compact_layout() {
        let schema = loads(table(), DEMO).unwrap();
        let text = dumps(table(), &schema, &JadnStyle::default()).unwrap();
        assert_eq!(text, DEMO);
    }

    #[test]
    fn test_dump_unstripped_separates_types() {
        let schema = loads(table(), DEMO).unwrap();
        let text = dumps(table(), &schema, &JadnStyle { strip: false }).unwrap();
        assert!(text.contains("  },\n\n  \"types\""));
        assert!(text.contains("    ]],\n\n    [\"Color\""));
    }

    #[test]
    fn test_empty_meta_omitted() {
        let schema = loads(table(), r#"{"types": [["A", "Integer"]]}"#).unwrap();
        let doc = to_value(table(), &schema).unwrap();
        assert_eq!(doc, json!({"types": [["A", "Integer"]]}));
    }

    #[test]
    fn test_structural_errors() {
        assert!(matches!(
            loads(table(), r#"{"meta": {}}"#),
            Err(Error::Structural(_))
        ));
        assert!(matches!(
            loads(table(), r#"{"types": [["A", "Widget"]]}"#),
            Err(Error::Structural(_))
        ));
        assert!(matches!(
            loads(table(), r#"{"types": [["A", "Record", [], "", [[1, "a"]]]]}"#),
            Err(Error::Structural(_))
        ));
        assert!(matches!(loads(table(), "not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_option_errors_propagate() {
        let err = loads(table(), r#"{"types": [["A", "String", ["{x"]]]}"#).unwrap_err();
        assert!(matches!(err, Error::OptionDecode(_)));
    }

    #[test]
    fn test_defaulting_is_idempotent() {
        let schema = loads(table(), DEMO).unwrap();
        let once = to_value(table(), &schema).unwrap();
        let again = to_value(table(), &from_value(table(), &once).unwrap()).unwrap();
        assert_eq!(once, again);
    }
}
