//! Limits on schema input
//!
//! Bounds applied by the loader before and after parsing so that oversized
//! or runaway input fails early with [`Error::LimitExceeded`].

use crate::error::{Error, Result};
use crate::model::Schema;

/// Input limits
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum input size in bytes
    pub max_input_size: usize,

    /// Maximum number of type definitions
    pub max_types: usize,

    /// Maximum number of fields or items in one type definition
    pub max_fields: usize,

    /// Maximum length of one line of text input
    pub max_line_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_size: 16 * 1024 * 1024, // 16 MB
            max_types: 10_000,
            max_fields: 10_000,
            max_line_length: 64 * 1024,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_input_size: 1024 * 1024, // 1 MB
            max_types: 1_000,
            max_fields: 1_000,
            max_line_length: 4 * 1024,
        }
    }

    /// Create permissive limits (less restrictive)
    pub fn permissive() -> Self {
        Self {
            max_input_size: 1024 * 1024 * 1024, // 1 GB
            max_types: 1_000_000,
            max_fields: 1_000_000,
            max_line_length: 16 * 1024 * 1024,
        }
    }

    /// Check input size
    pub fn check_input_size(&self, size: usize) -> Result<()> {
        if size > self.max_input_size {
            Err(Error::LimitExceeded(format!(
                "Input size {} exceeds maximum {}",
                size, self.max_input_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check the longest line of text input
    pub fn check_lines(&self, text: &str) -> Result<()> {
        match text.lines().enumerate().find(|(_, l)| l.len() > self.max_line_length) {
            Some((n, line)) => Err(Error::LimitExceeded(format!(
                "Line {} length {} exceeds maximum {}",
                n + 1,
                line.len(),
                self.max_line_length
            ))),
            None => Ok(()),
        }
    }

    /// Check type and member counts of a loaded schema
    pub fn check_schema(&self, schema: &Schema) -> Result<()> {
        if schema.types().len() > self.max_types {
            return Err(Error::LimitExceeded(format!(
                "Type count {} exceeds maximum {}",
                schema.types().len(),
                self.max_types
            )));
        }
        if let Some(td) = schema.types().iter().find(|t| t.member_count() > self.max_fields) {
            return Err(Error::LimitExceeded(format!(
                "Type '{}' has {} members, exceeding maximum {}",
                td.name,
                td.member_count(),
                self.max_fields
            )));
        }
        Ok(())
    }
}
