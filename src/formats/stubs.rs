//! Registered formats without an implementation

use super::Format;

/// Formats that are known by name but neither load nor dump
pub(super) fn unsupported() -> Vec<Format> {
    vec![
        Format::new("md", "md", "Markdown property tables"),
        Format::new("erd", "erd", "Entity relationship diagram"),
        Format::new("json", "json", "JSON Schema"),
        Format::new("xsd", "xsd", "XML Schema"),
        Format::new("cddl", "cddl", "Concise data definition language"),
        Format::new("proto", "proto", "Protocol Buffers"),
        Format::new("xeto", "xeto", "Xeto"),
    ]
}
