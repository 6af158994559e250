//! Canonical form
//!
//! Removes size and multiplicity options that only restate their defaults, so
//! that schemas written with and without them compare equal.

use crate::core_type::CoreType;
use crate::model::Schema;
use crate::options::{OptionValue, Options, MAX_UNBOUNDED};

const DEFAULTS: [(&str, i64); 4] = [
    ("minLength", 0),
    ("maxLength", MAX_UNBOUNDED),
    ("minOccurs", 1),
    ("maxOccurs", 1),
];

/// Return a copy of the schema with default-valued size and multiplicity options removed
pub fn canonicalize(schema: &Schema) -> Schema {
    let mut out = schema.clone();
    for td in out.types_mut() {
        strip_defaults(&mut td.options);
        if td.core_type != CoreType::Enumerated {
            for field in &mut td.fields {
                strip_defaults(&mut field.options);
            }
        }
    }
    out
}

fn strip_defaults(options: &mut Options) {
    for (name, default) in DEFAULTS {
        if options.get(name) == Some(&OptionValue::Int(default)) {
            options.shift_remove(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDef, SchemaBuilder, TypeDef};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_removed() {
        let schema = SchemaBuilder::new()
            .add_type(
                TypeDef::new("Name", CoreType::String)
                    .with_option("minLength", 0i64)
                    .with_option("maxLength", 40i64),
            )
            .add_type(
                TypeDef::new("Rec", CoreType::Record).with_field(
                    FieldDef::new(1, "a", "Name")
                        .with_option("minOccurs", 1i64)
                        .with_option("maxOccurs", 1i64),
                ),
            )
            .build()
            .unwrap();

        let canonical = canonicalize(&schema);
        let name = canonical.get_type("Name").unwrap();
        assert_eq!(name.options.len(), 1);
        assert_eq!(name.options["maxLength"], OptionValue::Int(40));
        assert!(canonical.get_type("Rec").unwrap().fields[0].options.is_empty());

        // input untouched
        assert_eq!(schema.get_type("Name").unwrap().options.len(), 2);
        assert_eq!(canonicalize(&canonical), canonical);
    }

    #[test]
    fn test_unbounded_max_length() {
        let schema = SchemaBuilder::new()
            .add_type(
                TypeDef::new("List", CoreType::ArrayOf)
                    .with_option("vtype", OptionValue::Ref("String".into()))
                    .with_option("maxLength", MAX_UNBOUNDED),
            )
            .build()
            .unwrap();
        let canonical = canonicalize(&schema);
        assert!(!canonical.types()[0].options.contains_key("maxLength"));
        assert!(canonical.types()[0].options.contains_key("vtype"));
    }
}
