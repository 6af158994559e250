//! XML abstract schema definition (XASD)
//!
//! ```xml
//! <Schema>
//!   <Metadata>
//!     <Title>Music Library</Title>
//!     <Roots><TypeName>Library</TypeName></Roots>
//!   </Metadata>
//!   <Types>
//!     <Type name="Album" type="Record">model for the album
//!       <Field id="1" name="title" type="String" maxLength="80">album title</Field>
//!     </Type>
//!   </Types>
//! </Schema>
//! ```
//!
//! Options are attributes named by option name holding the tag-string payload;
//! flags are written as `"true"`.

use super::{SchemaReader, SchemaWriter};
use crate::config::Style;
use crate::core_type::CoreType;
use crate::documents::{Document, Element};
use crate::error::{Error, Result};
use crate::model::{FieldDef, ItemDef, Meta, Schema, TypeDef};
use crate::options::{decode_option, OptionTable, Options};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;

/// Metadata keys whose values are always text
const TEXT_META: [&str; 8] = [
    "title",
    "package",
    "version",
    "jadn_version",
    "description",
    "comment",
    "copyright",
    "license",
];

/// The `xasd` format
#[derive(Debug, Clone, Copy)]
pub struct XasdFormat;

impl SchemaReader for XasdFormat {
    fn loads(&self, table: &OptionTable, text: &str) -> Result<Schema> {
        loads(table, text)
    }
}

impl SchemaWriter for XasdFormat {
    fn dumps(&self, table: &OptionTable, schema: &Schema, _style: &Style) -> Result<String> {
        dumps(table, schema)
    }
}

/// Parse XASD text
pub fn loads(table: &OptionTable, text: &str) -> Result<Schema> {
    let doc = Document::from_string(text)?;
    let root = doc
        .root()
        .filter(|r| r.name == "Schema")
        .ok_or_else(|| Error::Structural("XASD root element must be <Schema>".to_string()))?;

    let meta = match root.find_child("Metadata") {
        Some(el) => meta_from_element(el),
        None => Meta::new(),
    };
    let types = match root.find_child("Types") {
        Some(el) => el
            .children
            .iter()
            .map(|t| type_from_element(table, t))
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };
    Schema::new(meta, types)
}

fn meta_from_element(el: &Element) -> Meta {
    let mut meta = Meta::new();
    for child in &el.children {
        match child.name.as_str() {
            "Roots" => {
                let roots: Vec<Value> = child
                    .find_children("TypeName")
                    .iter()
                    .map(|t| Value::from(t.text()))
                    .collect();
                meta.insert("roots", Value::Array(roots));
            }
            "Namespaces" => {
                let namespaces: Vec<Value> = child
                    .find_children("PrefixNs")
                    .iter()
                    .map(|ns| {
                        Value::from(vec![ns.get_attribute("prefix").unwrap_or_default(), ns.text()])
                    })
                    .collect();
                meta.insert("namespaces", Value::Array(namespaces));
            }
            "Config" => {
                let config: serde_json::Map<String, Value> = child
                    .children
                    .iter()
                    .map(|c| (format!("${}", c.name), json_or_text(c.text())))
                    .collect();
                meta.insert("config", Value::Object(config));
            }
            name => {
                let key = decapitalize(name);
                let value = if TEXT_META.contains(&key.as_str()) {
                    Value::from(child.text())
                } else {
                    json_or_text(child.text())
                };
                meta.insert(key, value);
            }
        }
    }
    meta
}

fn type_from_element(table: &OptionTable, el: &Element) -> Result<TypeDef> {
    if el.name != "Type" {
        return Err(Error::Structural(format!("unexpected <{}> in <Types>", el.name)));
    }
    let name = el.require_attribute("name")?;
    let core_type: CoreType = el.require_attribute("type")?.parse()?;

    let mut td = TypeDef::new(name, core_type).with_description(el.text());
    td.options = options_from_attributes(table, el, &["name", "type"], core_type.as_str())?;

    for member in &el.children {
        match member.name.as_str() {
            "Item" => {
                let id = parse_id(member)?;
                let value = member.require_attribute("value")?;
                td.items
                    .push(ItemDef::new(id, value).with_description(member.text()));
            }
            "Field" => {
                let id = parse_id(member)?;
                let mut field = FieldDef::new(
                    id,
                    member.require_attribute("name")?,
                    member.require_attribute("type")?,
                )
                .with_description(member.text());
                field.options =
                    options_from_attributes(table, member, &["id", "name", "type"], &field.type_ref)?;
                td.fields.push(field);
            }
            other => {
                return Err(Error::Structural(format!(
                    "unexpected <{}> in type '{}'",
                    other, td.name
                )))
            }
        }
    }
    Ok(td)
}

fn options_from_attributes(
    table: &OptionTable,
    el: &Element,
    reserved: &[&str],
    context: &str,
) -> Result<Options> {
    let mut options = Options::new();
    for (key, value) in el.attributes.iter().filter(|(k, _)| !reserved.contains(&k.as_str())) {
        let def = table.by_name(key).ok_or_else(|| {
            Error::Structural(format!("unknown option attribute '{}' on <{}>", key, el.name))
        })?;
        let payload = if def.is_flag() {
            match value.as_str() {
                "true" => "",
                "false" => continue,
                _ => {
                    return Err(Error::Structural(format!(
                        "flag '{}' must be \"true\" or \"false\"",
                        key
                    )))
                }
            }
        } else {
            value.as_str()
        };
        let (name, value) = decode_option(table, &format!("{}{}", def.tag, payload), context)?;
        options.insert(name, value);
    }
    Ok(options)
}

fn parse_id(el: &Element) -> Result<u32> {
    let id = el.require_attribute("id")?;
    id.parse()
        .map_err(|_| Error::Structural(format!("<{}> id '{}' is not a whole number", el.name, id)))
}

fn json_or_text(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::from(text))
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn decapitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Render a schema as XASD
pub fn dumps(table: &OptionTable, schema: &Schema) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write(&mut writer, Event::Start(BytesStart::new("Schema")))?;

    if !schema.meta().is_empty() {
        write(&mut writer, Event::Start(BytesStart::new("Metadata")))?;
        for (key, value) in schema.meta().iter() {
            write_meta(&mut writer, key, value)?;
        }
        write(&mut writer, Event::End(BytesEnd::new("Metadata")))?;
    }

    write(&mut writer, Event::Start(BytesStart::new("Types")))?;
    for td in schema.types() {
        let mut start = BytesStart::new("Type");
        start.push_attribute(("name", td.name.as_str()));
        start.push_attribute(("type", td.core_type.as_str()));
        for (name, payload) in option_attributes(table, &td.options, td.core_type.as_str())? {
            start.push_attribute((name.as_str(), payload.as_str()));
        }

        if td.fields.is_empty() && td.items.is_empty() {
            write_text_element(&mut writer, start, &td.description)?;
            continue;
        }
        write(&mut writer, Event::Start(start))?;
        if !td.description.is_empty() {
            write(&mut writer, Event::Text(BytesText::new(&td.description)))?;
        }
        for item in &td.items {
            let mut el = BytesStart::new("Item");
            el.push_attribute(("id", item.id.to_string().as_str()));
            el.push_attribute(("value", item.value.as_str()));
            write_text_element(&mut writer, el, &item.description)?;
        }
        for field in &td.fields {
            if field.options.contains_key("id") {
                return Err(Error::Invalid(format!(
                    "option 'id' on field '{}' of '{}' cannot be written as an attribute",
                    field.name, td.name
                )));
            }
            let mut el = BytesStart::new("Field");
            el.push_attribute(("id", field.id.to_string().as_str()));
            el.push_attribute(("name", field.name.as_str()));
            el.push_attribute(("type", field.type_ref.as_str()));
            for (name, payload) in option_attributes(table, &field.options, &field.type_ref)? {
                el.push_attribute((name.as_str(), payload.as_str()));
            }
            write_text_element(&mut writer, el, &field.description)?;
        }
        write(&mut writer, Event::End(BytesEnd::new("Type")))?;
    }
    write(&mut writer, Event::End(BytesEnd::new("Types")))?;
    write(&mut writer, Event::End(BytesEnd::new("Schema")))?;

    let mut text = String::from_utf8(writer.into_inner())
        .map_err(|e| Error::Xml(format!("invalid UTF-8 output: {}", e)))?;
    text.push('\n');
    Ok(text)
}

/// Option attributes as (name, payload) pairs in canonical order
fn option_attributes(table: &OptionTable, options: &Options, context: &str) -> Result<Vec<(String, String)>> {
    crate::options::encode(table, options, context)?
        .into_iter()
        .map(|tag_string| {
            let mut chars = tag_string.chars();
            let tag = chars.next().unwrap_or_default();
            let def = table
                .get(tag)
                .ok_or_else(|| Error::Invalid(format!("unknown option tag '{}'", tag)))?;
            let payload = if def.is_flag() { "true" } else { chars.as_str() };
            Ok((def.name.clone(), payload.to_string()))
        })
        .collect()
}

fn write_meta(writer: &mut Writer<Vec<u8>>, key: &str, value: &Value) -> Result<()> {
    let tag = capitalize(key);
    match (key, value) {
        ("roots", Value::Array(roots)) => {
            write(writer, Event::Start(BytesStart::new(tag.as_str())))?;
            for root in roots {
                write_text_element(writer, BytesStart::new("TypeName"), &value_text(root))?;
            }
            write(writer, Event::End(BytesEnd::new(tag.as_str())))
        }
        ("namespaces", Value::Array(namespaces)) => {
            write(writer, Event::Start(BytesStart::new(tag.as_str())))?;
            for pair in namespaces {
                let (prefix, uri) = match pair.as_array().map(|p| p.as_slice()) {
                    Some([p, u]) => (value_text(p), value_text(u)),
                    _ => return Err(Error::Invalid(format!("namespace {} is not [prefix, uri]", pair))),
                };
                let mut el = BytesStart::new("PrefixNs");
                el.push_attribute(("prefix", prefix.as_str()));
                write_text_element(writer, el, &uri)?;
            }
            write(writer, Event::End(BytesEnd::new(tag.as_str())))
        }
        ("config", Value::Object(config)) => {
            write(writer, Event::Start(BytesStart::new(tag.as_str())))?;
            for (k, v) in config {
                let name = k.trim_start_matches('$');
                write_text_element(writer, BytesStart::new(name), &value_text(v))?;
            }
            write(writer, Event::End(BytesEnd::new(tag.as_str())))
        }
        (_, value) => write_text_element(writer, BytesStart::new(tag.as_str()), &value_text(value)),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, start: BytesStart<'_>, text: &str) -> Result<()> {
    let end = BytesEnd::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    if text.is_empty() {
        return write(writer, Event::Empty(start));
    }
    write(writer, Event::Start(start))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(end))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Xml(format!("failed to write XML: {}", e)))
}
