//! ASCII dependency tree
//!
//! Draws the type dependency graph as one tree per root type:
//!
//! ```text
//!  Library
//!  └── Album
//!      ├── Artist
//!      └── Track
//! ```

use super::jidl::typestr;
use super::SchemaWriter;
use crate::config::{style_as, Style};
use crate::error::Result;
use crate::graph::{self, Deps};
use crate::model::Schema;
use crate::options::OptionTable;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `atree` format
#[derive(Debug, Clone, Copy)]
pub struct AtreeFormat;

/// Box drawing characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Draw {
    /// Indentation only
    Blank,
    /// `+--` and `|`
    Ascii,
    /// Light box lines
    #[default]
    Light,
    /// Heavy box lines
    Heavy,
    /// Double box lines
    Double,
}

impl Draw {
    /// (branch, last branch, continuation) prefixes
    fn glyphs(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Draw::Blank => ("    ", "    ", "    "),
            Draw::Ascii => ("+-- ", "+-- ", "|   "),
            Draw::Light => ("├── ", "└── ", "│   "),
            Draw::Heavy => ("┣━━ ", "┗━━ ", "┃   "),
            Draw::Double => ("╠══ ", "╚══ ", "║   "),
        }
    }
}

/// How much of each type is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Detail {
    /// Type name
    #[default]
    Conceptual,
    /// Name and core type
    Logical,
    /// Name and full type expression
    Information,
}

/// Tree style
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AtreeStyle {
    /// Line drawing
    pub draw: Draw,
    /// Label detail
    pub detail: Detail,
}

impl SchemaWriter for AtreeFormat {
    fn default_style(&self) -> Style {
        match serde_json::to_value(AtreeStyle::default()) {
            Ok(Value::Object(style)) => style,
            _ => Style::new(),
        }
    }

    fn dumps(&self, _table: &OptionTable, schema: &Schema, style: &Style) -> Result<String> {
        let style: AtreeStyle = style_as(style)?;
        Ok(dumps(schema, &style))
    }
}

/// Draw the dependency trees of a schema
///
/// Every type is drawn as a tree root when the schema has no root types.
pub fn dumps(schema: &Schema, style: &AtreeStyle) -> String {
    let deps = graph::build_deps(schema);
    let mut roots = graph::roots(&deps);
    if roots.is_empty() {
        roots = deps.keys().cloned().collect();
    }

    let trees: Vec<String> = roots
        .iter()
        .map(|root| {
            let mut lines = vec![format!(" {}", label(schema, root, style.detail))];
            let mut path = vec![root.as_str()];
            draw_children(schema, &deps, style, &mut path, "", &mut lines);
            lines.join("\n")
        })
        .collect();
    let mut out = trees.join("\n\n");
    out.push('\n');
    out
}

fn draw_children<'a>(
    schema: &Schema,
    deps: &'a Deps,
    style: &AtreeStyle,
    path: &mut Vec<&'a str>,
    prefix: &str,
    lines: &mut Vec<String>,
) {
    let Some(current) = path.last().and_then(|name| deps.get(*name)) else {
        return;
    };
    let mut children: Vec<&str> = Vec::new();
    for child in current {
        if !children.contains(&child.as_str()) {
            children.push(child);
        }
    }

    let (branch, last_branch, cont) = style.draw.glyphs();
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        lines.push(format!(
            " {}{}{}",
            prefix,
            if last { last_branch } else { branch },
            label(schema, child, style.detail)
        ));
        // Recursion stops at a type already on the path
        if path.contains(child) {
            continue;
        }
        let next = format!("{}{}", prefix, if last { "    " } else { cont });
        path.push(child);
        draw_children(schema, deps, style, path, &next, lines);
        path.pop();
    }
}

fn label(schema: &Schema, name: &str, detail: Detail) -> String {
    let Some(td) = schema.get_type(name) else {
        return name.to_string();
    };
    match detail {
        Detail::Conceptual => name.to_string(),
        Detail::Logical => format!("{} = {}", name, td.core_type),
        Detail::Information => format!(
            "{} = {}",
            name,
            typestr::print(td.core_type.as_str(), &td.options, None)
        ),
    }
}
