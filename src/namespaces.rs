//! Namespace handling
//!
//! A schema declares namespaces in its metadata as `[prefix, uri]` pairs.
//! Type references of the form `prefix<sys>Name` resolve through them to a
//! qualified name; the empty prefix names the default namespace.

use crate::error::{Error, Result};
use crate::model::Meta;
use crate::names::split_typeref;
use indexmap::IndexMap;
use url::Url;

/// Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// Qualified type name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI (None for a local type)
    pub namespace: Option<NamespaceUri>,
    /// Type name within the namespace
    pub local_name: String,
}

impl QName {
    /// A type defined in this schema
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// A type defined in another namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}

/// Prefix to namespace mapping of one schema
#[derive(Debug, Clone, Default)]
pub struct NamespaceContext {
    prefixes: IndexMap<Prefix, NamespaceUri>,
    sys: String,
}

impl NamespaceContext {
    /// Create an empty context with the given prefix separator
    pub fn new(sys: impl Into<String>) -> Self {
        Self {
            prefixes: IndexMap::new(),
            sys: sys.into(),
        }
    }

    /// Build the context declared by schema metadata
    pub fn from_meta(meta: &Meta, sys: impl Into<String>) -> Result<Self> {
        let mut context = Self::new(sys);
        for (prefix, uri) in meta.namespaces() {
            if context.prefixes.contains_key(prefix) {
                return Err(Error::Duplicate(format!("namespace prefix '{}'", prefix)));
            }
            context.add_prefix(prefix, uri);
        }
        Ok(context)
    }

    /// Declare a prefix
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Namespace bound to a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Declared (prefix, uri) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    /// Whether a prefix is declared
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.prefixes.contains_key(prefix)
    }

    /// Resolve a type reference
    pub fn resolve(&self, typeref: &str) -> Result<QName> {
        match split_typeref(typeref, &self.sys) {
            (Some(prefix), local) => {
                let namespace = self.get_namespace(prefix).ok_or_else(|| {
                    Error::Reference(format!("namespace prefix '{}' is not declared", prefix))
                })?;
                Ok(QName::namespaced(namespace, local))
            }
            (None, local) => Ok(QName::local(local)),
        }
    }

    /// Namespace URIs that do not parse as absolute URLs
    pub fn invalid_uris(&self) -> Vec<(&str, &str)> {
        self.iter().filter(|(_, uri)| Url::parse(uri).is_err()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> NamespaceContext {
        let meta: Meta = [(
            "namespaces".to_string(),
            json!([["ex", "http://example.com/ex"], ["", "http://example.com/default"]]),
        )]
        .into_iter()
        .collect();
        NamespaceContext::from_meta(&meta, ".").unwrap()
    }

    #[test]
    fn test_namespace_context() {
        let ctx = context();
        assert_eq!(ctx.get_namespace("ex"), Some("http://example.com/ex"));
        assert_eq!(ctx.get_namespace(""), Some("http://example.com/default"));
        assert!(ctx.has_prefix("ex"));
        assert!(!ctx.has_prefix("other"));
        assert!(ctx.invalid_uris().is_empty());
    }

    #[test]
    fn test_resolve_prefixed_name() {
        let ctx = context();
        let q = ctx.resolve("ex.Person").unwrap();
        assert_eq!(q, QName::namespaced("http://example.com/ex", "Person"));
        assert_eq!(q.to_string(), "{http://example.com/ex}Person");
        assert_eq!(ctx.resolve("Person").unwrap(), QName::local("Person"));
        assert!(matches!(ctx.resolve("zz.Person"), Err(Error::Reference(_))));
    }

    #[test]
    fn test_duplicate_prefix_and_bad_uri() {
        let meta: Meta = [(
            "namespaces".to_string(),
            json!([["ex", "not a url"], ["ex", "http://example.com"]]),
        )]
        .into_iter()
        .collect();
        assert!(NamespaceContext::from_meta(&meta, ".").is_err());

        let mut ctx = NamespaceContext::new(".");
        ctx.add_prefix("ex", "not a url");
        assert_eq!(ctx.invalid_uris(), vec![("ex", "not a url")]);
    }
}
