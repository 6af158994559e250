//! # jadn
//!
//! Translator for JADN (JSON Abstract Data Notation) information models.
//!
//! A schema is loaded from any readable format into one logical model and
//! written back out in any writable one. Type and field options travel in
//! a compact tag-string form on the wire and as typed values in memory.
//!
//! ## Features
//!
//! - JADN serialized form, checked against its structural JSON Schema
//! - JIDL textual notation, read and written in column layout
//! - XASD XML form
//! - ASCII dependency trees
//! - Dependency graph with roots, topological order and cycles
//! - Canonical form and a schema checker
//!
//! ## Example
//!
//! ```rust
//! use jadn::{formats, OptionTable};
//!
//! let table = OptionTable::global()?;
//! let text = "Color = Enumerated\n   1 red\n   2 green\n";
//! let schema = formats::get("jidl")?.loads(table, text)?;
//! let json = formats::get("jadn")?.dumps_default(table, &schema)?;
//! assert!(json.contains("\"Color\""));
//! # Ok::<(), jadn::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Vocabulary and model
pub mod core_type;
pub mod options;
pub mod model;

// Names and configuration
pub mod names;
pub mod namespaces;
pub mod config;

// Formats
pub mod documents;
pub mod formats;

// Analysis
pub mod canonical;
pub mod check;
pub mod graph;

// Resource loading
pub mod loaders;

// Re-exports for convenience
pub use canonical::canonicalize;
pub use config::{Style, StyleConfig};
pub use core_type::CoreType;
pub use error::{Error, Result};
pub use formats::{Format, SchemaReader, SchemaWriter};
pub use limits::Limits;
pub use loaders::Loader;
pub use model::{FieldDef, ItemDef, Meta, Schema, SchemaBuilder, TypeDef};
pub use options::{OptionTable, OptionValue, Options};

/// Version of the jadn library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Load schema text in a named format using the built-in option table
pub fn loads(format: &str, text: &str) -> Result<Schema> {
    formats::get(format)?.loads(OptionTable::global()?, text)
}

/// Render a schema in a named format with that format's default style
pub fn dumps(format: &str, schema: &Schema) -> Result<String> {
    formats::get(format)?.dumps_default(OptionTable::global()?, schema)
}
