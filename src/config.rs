//! Style configuration
//!
//! Writers publish default style options. A user configuration file may
//! override them per format (`{"style": {"jidl": {"page": 80}}}`) and command
//! line arguments (`page:80,desc:none`) override both. Keys a writer does not
//! publish are rejected.

use crate::error::{Error, Result};
use crate::formats::Format;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Style options: key to JSON value
pub type Style = serde_json::Map<String, Value>;

/// Layered style overrides from a configuration file and the command line
#[derive(Debug, Clone, Default)]
pub struct StyleConfig {
    /// `style` section of the configuration file, keyed by format name
    file_sections: serde_json::Map<String, Value>,
    /// Command line overrides
    overrides: Style,
}

impl StyleConfig {
    /// Create an empty configuration (writer defaults only)
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the `style` section of a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&text)?;
        Self::from_value(&value)
            .map_err(|e| Error::Invalid(format!("configuration file '{}': {}", path.display(), e)))
    }

    /// Use the `style` section of a parsed configuration document
    pub fn from_value(config: &Value) -> Result<Self> {
        let file_sections = match config.get("style") {
            None => serde_json::Map::new(),
            Some(Value::Object(sections)) => sections.clone(),
            Some(_) => return Err(Error::Invalid("'style' must be an object".to_string())),
        };
        Ok(Self {
            file_sections,
            overrides: Style::new(),
        })
    }

    /// Add command line overrides in `key:value,key:value` form
    pub fn with_args(mut self, args: &str) -> Result<Self> {
        self.overrides.extend(parse_style_args(args)?);
        Ok(self)
    }

    /// Merge writer defaults, file section and overrides for one format
    pub fn resolve(&self, format: &Format) -> Result<Style> {
        let mut style = format.default_style();

        if let Some(section) = self.file_sections.get(format.name) {
            let section = section.as_object().ok_or_else(|| {
                Error::Invalid(format!("style section '{}' must be an object", format.name))
            })?;
            merge(&mut style, section, format.name, "configuration file")?;
        }
        merge(&mut style, &self.overrides, format.name, "command line")?;

        tracing::debug!(format = format.name, ?style, "resolved style");
        Ok(style)
    }
}

fn merge(style: &mut Style, layer: &Style, format: &str, origin: &str) -> Result<()> {
    for (key, value) in layer {
        match style.get_mut(key) {
            Some(slot) => *slot = value.clone(),
            None => {
                return Err(Error::Invalid(format!(
                    "invalid style option '{}' for format '{}' from {}",
                    key, format, origin
                )))
            }
        }
    }
    Ok(())
}

/// Parse `key:value,key:value` style arguments
pub fn parse_style_args(args: &str) -> Result<Style> {
    let mut style = Style::new();
    for arg in args.split(',').filter(|a| !a.trim().is_empty()) {
        let (key, value) = arg.split_once(':').ok_or_else(|| {
            Error::Invalid(format!("style argument '{}' is not key:value", arg.trim()))
        })?;
        style.insert(key.trim().to_string(), parse_scalar(value.trim()));
    }
    Ok(style)
}

fn parse_scalar(value: &str) -> Value {
    if value.eq_ignore_ascii_case("true") {
        Value::Bool(true)
    } else if value.eq_ignore_ascii_case("false") {
        Value::Bool(false)
    } else if value.eq_ignore_ascii_case("none") || value == "null" {
        Value::Null
    } else if let Ok(n) = value.parse::<i64>() {
        Value::from(n)
    } else {
        Value::String(value.to_string())
    }
}

/// Deserialize a resolved style into a writer's typed style struct
pub fn style_as<T: DeserializeOwned>(style: &Style) -> Result<T> {
    serde_json::from_value(Value::Object(style.clone()))
        .map_err(|e| Error::Invalid(format!("style: {}", e)))
}
