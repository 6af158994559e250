//! Schema file loading and writing
//!
//! The loader picks a format from the file extension, enforces [`Limits`] on
//! the input and parses it. Output files are named `<stem>.<extension>` after
//! the target format.

use crate::config::Style;
use crate::error::{Error, Result};
use crate::formats::{self, Format};
use crate::limits::Limits;
use crate::model::Schema;
use crate::options::OptionTable;
use std::fs;
use std::path::{Path, PathBuf};

/// Schema loader
///
/// Loading enforces structure only: option legality, naming patterns and
/// type references are left to [`check`](crate::check) unless the loader is
/// made strict with [`Loader::with_strict`].
#[derive(Debug)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
    /// Run the schema checker on every loaded schema
    strict: bool,
}

impl Loader {
    /// Create a new loader with default settings
    pub fn new() -> Self {
        Self {
            limits: Limits::default(),
            strict: false,
        }
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Reject schemas that load but fail the checker
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The format that reads a path, from its extension
    pub fn format_for(path: &Path) -> Result<&'static Format> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        formats::for_extension(extension).ok_or_else(|| {
            Error::Invalid(format!(
                "no schema reader for '{}' (extension '{}')",
                path.display(),
                extension
            ))
        })
    }

    /// Load a schema file
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Schema> {
        let path = path.as_ref();
        let format = Self::format_for(path)?;
        let size = fs::metadata(path)?.len();
        self.limits
            .check_input_size(usize::try_from(size).unwrap_or(usize::MAX))?;
        let text = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), format = format.name, "loading schema");
        self.load_str(format, &text)
    }

    /// Load schema text in a given format
    pub fn load_str(&self, format: &Format, text: &str) -> Result<Schema> {
        self.limits.check_input_size(text.len())?;
        self.limits.check_lines(text)?;
        let table = OptionTable::global()?;
        let schema = format.loads(table, text)?;
        self.limits.check_schema(&schema)?;
        if self.strict {
            crate::check::check(table, &schema)?;
        }
        Ok(schema)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Output file path for a schema written in a format
pub fn output_path(dir: impl AsRef<Path>, stem: &str, format: &Format) -> PathBuf {
    dir.as_ref().join(format!("{}.{}", stem, format.extension))
}

/// Render a schema and write it to `<dir>/<stem>.<extension>`
pub fn dump_to(
    schema: &Schema,
    format: &Format,
    dir: impl AsRef<Path>,
    stem: &str,
    style: &Style,
) -> Result<PathBuf> {
    let text = format.dumps(OptionTable::global()?, schema, style)?;
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = output_path(dir, stem, format);
    fs::write(&path, text)?;
    tracing::debug!(path = %path.display(), format = format.name, "wrote schema");
    Ok(path)
}
