//! Schema checker
//!
//! Structural invariants are enforced when a [`Schema`] is built. The checks
//! here cover what a well-formed schema may still get wrong: options used on
//! the wrong core type, names that break the configured patterns, and
//! references to types that are not defined anywhere.

use crate::core_type::{is_builtin, CoreType};
use crate::error::{Error, Result};
use crate::model::{Schema, TypeDef};
use crate::names::SchemaConfig;
use crate::namespaces::NamespaceContext;
use crate::options::{strip_derived, OptionScope, OptionTable, OptionValue, Options};

/// Check a schema, failing on the first problem found
pub fn check(table: &OptionTable, schema: &Schema) -> Result<()> {
    match diagnostics(table, schema).into_iter().next() {
        Some(first) => Err(Error::Invalid(first)),
        None => Ok(()),
    }
}

/// All problems found in a schema, in declaration order
pub fn diagnostics(table: &OptionTable, schema: &Schema) -> Vec<String> {
    let mut out = Vec::new();

    let config = SchemaConfig::from_meta(schema.meta()).unwrap_or_else(|e| {
        out.push(e.to_string());
        SchemaConfig::default()
    });
    let namespaces = NamespaceContext::from_meta(schema.meta(), config.sys.as_str()).unwrap_or_else(|e| {
        out.push(e.to_string());
        NamespaceContext::new(config.sys.as_str())
    });

    for (prefix, _) in namespaces.iter() {
        if !config.is_valid_nsid(prefix) {
            out.push(format!("namespace prefix '{}' does not match $NSID", prefix));
        }
    }
    for (prefix, uri) in namespaces.invalid_uris() {
        out.push(format!("namespace '{}' has invalid URI '{}'", prefix, uri));
    }

    for root in schema.meta().roots() {
        if schema.get_type(root).is_none() {
            out.push(format!("root '{}' is not defined", root));
        }
    }

    let checker = Checker {
        table,
        schema,
        config: &config,
        namespaces: &namespaces,
    };
    for td in schema.types() {
        checker.check_type(td, &mut out);
    }

    tracing::debug!(types = schema.types().len(), problems = out.len(), "checked schema");
    out
}

struct Checker<'a> {
    table: &'a OptionTable,
    schema: &'a Schema,
    config: &'a SchemaConfig,
    namespaces: &'a NamespaceContext,
}

impl Checker<'_> {
    fn check_type(&self, td: &TypeDef, out: &mut Vec<String>) {
        if !self.config.is_valid_type_name(&td.name) {
            out.push(format!("type name '{}' does not match $TypeName", td.name));
        }
        if is_builtin(&td.name) {
            out.push(format!("type name '{}' is a core type", td.name));
        }

        for name in td.options.keys() {
            match self.table.by_name(name) {
                Some(def) if def.scope == OptionScope::Field => {
                    out.push(format!("{}: field option '{}' in type options", td.name, name))
                }
                Some(def) if !def.is_legal_for(td.core_type) => out.push(format!(
                    "{}: option '{}' is not allowed for {}",
                    td.name, name, td.core_type
                )),
                Some(_) => {}
                None => out.push(format!("{}: unknown option '{}'", td.name, name)),
            }
        }

        match td.core_type {
            CoreType::ArrayOf if !td.options.contains_key("vtype") => {
                out.push(format!("{}: ArrayOf requires vtype", td.name))
            }
            CoreType::MapOf
                if !(td.options.contains_key("ktype") && td.options.contains_key("vtype")) =>
            {
                out.push(format!("{}: MapOf requires ktype and vtype", td.name))
            }
            _ => {}
        }

        self.check_refs(&td.name, &td.options, out);
        self.check_max_length(&td.name, td.core_type, &td.options, out);

        for field in &td.fields {
            let context = format!("{}.{}", td.name, field.name);
            let unlabeled = field.name.is_empty() && td.is_id_typed();
            if !unlabeled && !self.config.is_valid_field_name(&field.name) {
                out.push(format!("{}: field name does not match $FieldName", context));
            }
            if let Some(problem) = self.unresolved(&field.type_ref) {
                out.push(format!("{}: {}", context, problem));
            }
            self.check_refs(&context, &field.options, out);
            if let Some(core_type) = CoreType::parse(&field.type_ref) {
                self.check_max_length(&context, core_type, &field.options, out);
            }
        }
    }

    fn check_refs(&self, context: &str, options: &Options, out: &mut Vec<String>) {
        for name in crate::options::TYPE_REF_OPTIONS {
            let Some(OptionValue::Ref(target)) = options.get(name) else {
                continue;
            };
            let local = strip_derived(target);
            // Derived types enumerate the members of a local type
            let problem = if local.len() != target.len() || matches!(name, "enum" | "pointer") {
                match self.schema.get_type(local) {
                    Some(_) => None,
                    None => Some(format!("{} target '{}' is not defined", name, local)),
                }
            } else {
                self.unresolved(local)
            };
            if let Some(problem) = problem {
                out.push(format!("{}: {}", context, problem));
            }
        }
    }

    /// Why a type reference does not resolve, if it does not
    fn unresolved(&self, typeref: &str) -> Option<String> {
        let typeref = strip_derived(typeref);
        if is_builtin(typeref) || self.schema.get_type(typeref).is_some() {
            return None;
        }
        match self.namespaces.resolve(typeref) {
            Ok(qname) if qname.namespace.is_some() => None,
            Ok(qname) => Some(format!("type '{}' is not defined", qname)),
            Err(Error::Reference(message)) => Some(message),
            Err(e) => Some(e.to_string()),
        }
    }

    /// `maxLength` above the configured ceiling for its core type
    fn check_max_length(&self, context: &str, core_type: CoreType, options: &Options, out: &mut Vec<String>) {
        let (Some((key, ceiling)), Some(length)) = (
            self.config.max_length(core_type),
            options.get("maxLength").and_then(OptionValue::as_int),
        ) else {
            return;
        };
        if length > ceiling {
            out.push(format!("{}: maxLength {} exceeds {} {}", context, length, key, ceiling));
        }
    }
}
