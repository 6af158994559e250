//! Type and field options
//!
//! Options qualify a type definition or a field. In serialized form each
//! option is a tag-string (a tag character plus payload); in memory they are
//! [`Options`], a name-to-value map decoded through the [`OptionTable`].

mod codec;
mod table;
mod value;

pub use codec::{decode, decode_option, decode_payload, encode, encode_value};
pub use table::{OptionDef, OptionScope, OptionTable, ValueKind, BOOTSTRAP};
pub use value::{format_float, OptionValue, Options};

/// Unbounded maxLength / maxOccurs
pub const MAX_UNBOUNDED: i64 = -1;

/// Option names holding a reference to another type definition
pub const TYPE_REF_OPTIONS: [&str; 6] = ["ktype", "vtype", "extends", "restricts", "enum", "pointer"];

/// Strip a derived-type prefix (`#` enum, `>` pointer) from a type reference
pub fn strip_derived(name: &str) -> &str {
    name.strip_prefix('#')
        .or_else(|| name.strip_prefix('>'))
        .unwrap_or(name)
}
