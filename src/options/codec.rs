//! Tag-string codec
//!
//! A tag-string is one tag character followed by a payload. Decoding maps a
//! list of tag-strings to [`Options`]; encoding maps back in canonical rank
//! order so `encode(decode(x))` is stable.

use super::table::{OptionDef, OptionTable, ValueKind};
use super::value::{OptionValue, Options};
use crate::error::{OptionError, Result};

/// Decode a list of tag-strings in the given context
pub fn decode<S: AsRef<str>>(table: &OptionTable, tags: &[S], context: &str) -> Result<Options> {
    let mut options = Options::new();
    for tag_string in tags {
        let tag_string = tag_string.as_ref();
        let (name, value) = decode_option(table, tag_string, context)?;
        if options.insert(name, value).is_some() {
            return Err(OptionError::new("repeated option")
                .with_tag(tag_string)
                .with_context(context)
                .into());
        }
    }
    Ok(options)
}

/// Decode one tag-string
pub fn decode_option(
    table: &OptionTable,
    tag_string: &str,
    context: &str,
) -> Result<(String, OptionValue)> {
    let mut chars = tag_string.chars();
    let tag = chars
        .next()
        .ok_or_else(|| OptionError::new("empty tag-string").with_context(context))?;
    let def = table.get(tag).ok_or_else(|| {
        OptionError::new("unknown option tag")
            .with_tag(tag_string)
            .with_context(context)
    })?;
    let value = decode_payload(def, chars.as_str(), context).map_err(|e| e.with_tag(tag_string))?;
    Ok((def.name.clone(), value))
}

/// Decode a payload for a known option
pub fn decode_payload(
    def: &OptionDef,
    payload: &str,
    context: &str,
) -> std::result::Result<OptionValue, OptionError> {
    let kind = def.value_kind(context);
    let fail = |what: &str| {
        OptionError::new(format!("invalid {} payload '{}'", what, payload)).with_context(context)
    };
    match kind {
        ValueKind::Flag => {
            if payload.is_empty() {
                Ok(OptionValue::Bool(true))
            } else {
                Err(fail("flag"))
            }
        }
        ValueKind::Boolean => match payload {
            "true" => Ok(OptionValue::Bool(true)),
            "false" => Ok(OptionValue::Bool(false)),
            _ => Err(fail("boolean")),
        },
        ValueKind::Integer => payload
            .parse::<i64>()
            .map(OptionValue::Int)
            .map_err(|_| fail("integer")),
        ValueKind::Number => match payload.parse::<f64>() {
            Ok(x) if x.is_finite() => Ok(OptionValue::Float(x)),
            _ => Err(fail("number")),
        },
        ValueKind::String => Ok(OptionValue::Text(payload.to_string())),
        ValueKind::Binary => hex::decode(payload)
            .map(OptionValue::Bytes)
            .map_err(|_| fail("binary")),
        ValueKind::TypeRef => {
            if payload.is_empty() {
                Err(fail("type reference"))
            } else {
                Ok(OptionValue::Ref(payload.to_string()))
            }
        }
    }
}

/// Encode options to tag-strings, sorted by rank
pub fn encode(table: &OptionTable, options: &Options, context: &str) -> Result<Vec<String>> {
    let mut ranked = Vec::with_capacity(options.len());
    for (name, value) in options {
        let def = table.by_name(name).ok_or_else(|| {
            OptionError::new("unknown option name")
                .with_tag(name.as_str())
                .with_context(context)
        })?;
        ranked.push((def, value));
    }
    ranked.sort_by_key(|(def, _)| def.rank);

    ranked
        .into_iter()
        .map(|(def, value)| encode_value(def, value, context))
        .collect()
}

/// Encode one option value
pub fn encode_value(def: &OptionDef, value: &OptionValue, context: &str) -> Result<String> {
    let kind = def.value_kind(context);
    if !value.matches(kind) {
        return Err(OptionError::new(format!("value {:?} is not a {}", value, kind))
            .with_tag(def.name.as_str())
            .with_context(context)
            .into());
    }
    if let OptionValue::Float(x) = value {
        if !x.is_finite() {
            return Err(OptionError::new("number is not finite")
                .with_tag(def.name.as_str())
                .with_context(context)
                .into());
        }
    }
    let mut out = String::new();
    out.push(def.tag);
    out.push_str(&value.payload(kind));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn table() -> &'static OptionTable {
        OptionTable::global().unwrap()
    }

    #[test]
    fn test_decode_string_options() {
        let opts = decode(table(), &["/email", "{1", "}255"], "String").unwrap();
        assert_eq!(opts["format"], OptionValue::Text("email".into()));
        assert_eq!(opts["minLength"], OptionValue::Int(1));
        assert_eq!(opts["maxLength"], OptionValue::Int(255));
    }

    #[test]
    fn test_decode_context_kinds() {
        let n = decode(table(), &["y-1.5", "z10"], "Number").unwrap();
        assert_eq!(n["minInclusive"], OptionValue::Float(-1.5));
        assert_eq!(n["maxInclusive"], OptionValue::Float(10.0));

        let i = decode(table(), &["y0"], "Integer").unwrap();
        assert_eq!(i["minInclusive"], OptionValue::Int(0));

        let b = decode(table(), &["vcafe"], "Binary").unwrap();
        assert_eq!(b["const"], OptionValue::Bytes(vec![0xca, 0xfe]));

        let s = decode(table(), &["uhello"], "String").unwrap();
        assert_eq!(s["default"], OptionValue::Text("hello".into()));
    }

    #[test]
    fn test_decode_rejects_bad_payloads() {
        assert!(decode(table(), &["{x"], "String").is_err());
        assert!(decode(table(), &["=x"], "Enumerated").is_err());
        assert!(decode(table(), &["yNaN"], "Number").is_err());
        assert!(decode(table(), &["uzz"], "Binary").is_err());
        assert!(decode(table(), &["?"], "String").is_err());
        assert!(decode(table(), &[""], "String").is_err());
    }

    #[test]
    fn test_decode_repeated_option_fails() {
        let err = decode(table(), &["/ipv4", "/d3"], "String").unwrap_err();
        assert!(matches!(err, Error::OptionDecode(_)));
    }

    #[test]
    fn test_encode_sorts_by_rank() {
        let mut opts = Options::new();
        opts.insert("maxLength".into(), OptionValue::Int(10));
        opts.insert("format".into(), OptionValue::Text("uri".into()));
        opts.insert("id".into(), OptionValue::Bool(true));
        let tags = encode(table(), &opts, "Map").unwrap();
        assert_eq!(tags, vec!["=", "/uri", "}10"]);
    }

    #[test]
    fn test_encode_rejects_kind_mismatch() {
        let mut opts = Options::new();
        opts.insert("minLength".into(), OptionValue::Text("3".into()));
        assert!(encode(table(), &opts, "String").is_err());

        let mut opts = Options::new();
        opts.insert("unknownThing".into(), OptionValue::Int(1));
        assert!(encode(table(), &opts, "String").is_err());
    }

    #[test]
    fn test_derived_type_refs() {
        let opts = decode(table(), &["+#Color", "*>Path"], "MapOf").unwrap();
        assert_eq!(opts["ktype"], OptionValue::Ref("#Color".into()));
        assert_eq!(opts["vtype"], OptionValue::Ref(">Path".into()));
    }

    #[test]
    fn test_encode_canonicalises_numeric_payloads() {
        let number = decode(table(), &["y10", "z1e3"], "Number").unwrap();
        assert_eq!(encode(table(), &number, "Number").unwrap(), vec!["y10.0", "z1000.0"]);

        let string = decode(table(), &["{+5", "}007"], "String").unwrap();
        assert_eq!(string["minLength"], OptionValue::Int(5));
        assert_eq!(encode(table(), &string, "String").unwrap(), vec!["{5", "}7"]);
    }

    proptest! {
        #[test]
        fn prop_integer_options_are_stable(min in -1000i64..1000, max in -1i64..100000) {
            let tags = vec![format!("{{{}", min), format!("}}{}", max)];
            let opts = decode(table(), &tags, "Array").unwrap();
            prop_assert_eq!(encode(table(), &opts, "Array").unwrap(), tags);
        }

        #[test]
        fn prop_number_bounds_are_stable(x in -1.0e9f64..1.0e9) {
            let tag = format!("w{}", x);
            let opts = decode(table(), &[tag], "Number").unwrap();
            let once = encode(table(), &opts, "Number").unwrap();
            let twice = encode(table(), &decode(table(), &once, "Number").unwrap(), "Number").unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
