//! Error types for jadn
//!
//! This module defines all error types used throughout the library.
//! Malformed input (structural, grammar, option and reference errors) is kept
//! distinct from [`Error::Unsupported`], which batch callers may skip.

use std::fmt;
use thiserror::Error;

/// Result type alias using jadn Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for jadn operations
#[derive(Error, Debug)]
pub enum Error {
    /// Serialized form does not match its structural schema
    #[error("structural error: {0}")]
    Structural(String),

    /// Textual notation line could not be parsed
    #[error("grammar error: {0}")]
    Grammar(#[from] GrammarError),

    /// Tag-string could not be decoded (or an option value could not be encoded)
    #[error("option error: {0}")]
    OptionDecode(#[from] OptionError),

    /// Cross reference (tagid, sibling name) could not be resolved
    #[error("reference error: {0}")]
    Reference(String),

    /// Two definitions share a name or id
    #[error("duplicate definition: {0}")]
    Duplicate(String),

    /// Schema violates a model or checker rule
    #[error("invalid schema: {0}")]
    Invalid(String),

    /// Format has no implementation for the requested direction
    #[error("format '{format}' does not support {direction}")]
    Unsupported {
        /// Format name
        format: String,
        /// Requested direction
        direction: Direction,
    },

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML parsing or writing error
    #[error("XML error: {0}")]
    Xml(String),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True if this error reports a missing implementation rather than bad input
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::Unsupported { .. })
    }

    /// Build an unsupported-load error for a format
    pub fn unsupported_load(format: impl Into<String>) -> Self {
        Error::Unsupported {
            format: format.into(),
            direction: Direction::Load,
        }
    }

    /// Build an unsupported-dump error for a format
    pub fn unsupported_dump(format: impl Into<String>) -> Self {
        Error::Unsupported {
            format: format.into(),
            direction: Direction::Dump,
        }
    }
}

/// Conversion direction of a format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Text to schema
    Load,
    /// Schema to text
    Dump,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Load => write!(f, "load"),
            Direction::Dump => write!(f, "dump"),
        }
    }
}

/// Textual notation parse error with line context
#[derive(Debug, Clone)]
pub struct GrammarError {
    /// Error message
    pub message: String,
    /// 1-based line number in the source text
    pub line: Option<usize>,
    /// Offending source line
    pub text: Option<String>,
}

impl GrammarError {
    /// Create a new grammar error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            text: None,
        }
    }

    /// Set the line number
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Set the offending text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(line) = self.line {
            write!(f, "line {}: ", line)?;
        }
        write!(f, "{}", self.message)?;

        if let Some(ref text) = self.text {
            write!(f, "\n\n    {}", text)?;
        }

        Ok(())
    }
}

impl std::error::Error for GrammarError {}

/// Option codec error with the offending tag-string and decoding context
#[derive(Debug, Clone)]
pub struct OptionError {
    /// Error message
    pub message: String,
    /// Offending tag-string or option name
    pub tag: Option<String>,
    /// Context type the option qualifies
    pub context: Option<String>,
}

impl OptionError {
    /// Create a new option error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tag: None,
            context: None,
        }
    }

    /// Set the tag-string
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Set the context type
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for OptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref tag) = self.tag {
            write!(f, " (option '{}'", tag)?;
            if let Some(ref context) = self.context {
                write!(f, " on {}", context)?;
            }
            write!(f, ")")?;
        }

        Ok(())
    }
}

impl std::error::Error for OptionError {}
