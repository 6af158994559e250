//! Schema formats
//!
//! Each format implements [`SchemaReader`] and/or [`SchemaWriter`] and is
//! registered in a static table looked up by name or file extension. A format
//! missing a direction reports [`Error::Unsupported`].
//!
//! - `jadn`: serialized JSON form (read/write)
//! - `jidl`: textual notation (read/write)
//! - `xasd`: XML abstract schema (read/write)
//! - `atree`: ASCII dependency tree (write)
//! - `md`, `erd`, `json`, `xsd`, `cddl`, `proto`, `xeto`: registered, not implemented

pub mod atree;
pub mod jadn;
pub mod jidl;
mod stubs;
pub mod xasd;

use crate::config::Style;
use crate::error::{Error, Result};
use crate::model::Schema;
use crate::options::OptionTable;
use once_cell::sync::Lazy;

/// Reads text into a schema
pub trait SchemaReader: Send + Sync {
    /// Load a schema from text
    fn loads(&self, table: &OptionTable, text: &str) -> Result<Schema>;
}

/// Writes a schema as text
pub trait SchemaWriter: Send + Sync {
    /// Default style options
    fn default_style(&self) -> Style {
        Style::new()
    }

    /// Render a schema
    fn dumps(&self, table: &OptionTable, schema: &Schema, style: &Style) -> Result<String>;
}

/// A registered format
pub struct Format {
    /// Format name
    pub name: &'static str,
    /// File extension (without dot) of files in this format
    pub extension: &'static str,
    /// Short description
    pub description: &'static str,
    reader: Option<Box<dyn SchemaReader>>,
    writer: Option<Box<dyn SchemaWriter>>,
}

impl Format {
    fn new(name: &'static str, extension: &'static str, description: &'static str) -> Self {
        Self {
            name,
            extension,
            description,
            reader: None,
            writer: None,
        }
    }

    fn with_reader(mut self, reader: impl SchemaReader + 'static) -> Self {
        self.reader = Some(Box::new(reader));
        self
    }

    fn with_writer(mut self, writer: impl SchemaWriter + 'static) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    /// True if the format can be loaded
    pub fn can_load(&self) -> bool {
        self.reader.is_some()
    }

    /// True if the format can be dumped
    pub fn can_dump(&self) -> bool {
        self.writer.is_some()
    }

    /// Default style options of the writer (empty if there is none)
    pub fn default_style(&self) -> Style {
        self.writer
            .as_ref()
            .map(|w| w.default_style())
            .unwrap_or_default()
    }

    /// Load a schema from text
    pub fn loads(&self, table: &OptionTable, text: &str) -> Result<Schema> {
        let reader = self
            .reader
            .as_ref()
            .ok_or_else(|| Error::unsupported_load(self.name))?;
        let schema = reader.loads(table, text)?;
        tracing::debug!(
            format = self.name,
            types = schema.types().len(),
            "loaded schema"
        );
        Ok(schema)
    }

    /// Render a schema with the given style
    pub fn dumps(&self, table: &OptionTable, schema: &Schema, style: &Style) -> Result<String> {
        let writer = self
            .writer
            .as_ref()
            .ok_or_else(|| Error::unsupported_dump(self.name))?;
        let text = writer.dumps(table, schema, style)?;
        tracing::debug!(format = self.name, bytes = text.len(), "dumped schema");
        Ok(text)
    }

    /// Render a schema with the writer's default style
    pub fn dumps_default(&self, table: &OptionTable, schema: &Schema) -> Result<String> {
        self.dumps(table, schema, &self.default_style())
    }
}

impl std::fmt::Debug for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Format")
            .field("name", &self.name)
            .field("extension", &self.extension)
            .field("load", &self.can_load())
            .field("dump", &self.can_dump())
            .finish()
    }
}

static REGISTRY: Lazy<Vec<Format>> = Lazy::new(|| {
    let mut formats = vec![
        Format::new("jadn", "jadn", "JADN serialized form")
            .with_reader(jadn::JadnFormat)
            .with_writer(jadn::JadnFormat),
        Format::new("jidl", "jidl", "JADN interface definition language")
            .with_reader(jidl::JidlFormat)
            .with_writer(jidl::JidlFormat),
        Format::new("xasd", "xasd", "XML abstract schema definition")
            .with_reader(xasd::XasdFormat)
            .with_writer(xasd::XasdFormat),
        Format::new("atree", "txt", "ASCII dependency tree").with_writer(atree::AtreeFormat),
    ];
    formats.extend(stubs::unsupported());
    formats
});

/// All registered formats in registration order
pub fn registry() -> &'static [Format] {
    &REGISTRY
}

/// Look up a format by name
pub fn get(name: &str) -> Result<&'static Format> {
    registry()
        .iter()
        .find(|f| f.name == name)
        .ok_or_else(|| Error::Invalid(format!("unknown format '{}'", name)))
}

/// Look up the format that reads files with this extension
pub fn for_extension(extension: &str) -> Option<&'static Format> {
    let extension = extension.trim_start_matches('.');
    registry()
        .iter()
        .filter(|f| f.can_load())
        .find(|f| f.extension.eq_ignore_ascii_case(extension))
}
