//! Namespace prefix resolution.
//!
//! `XPath` has no syntax for an element test in a default namespace, so every
//! namespace used in a document needs a prefix before a path can name it.
//! [`resolve`] walks the namespace axis of the whole document and builds a
//! [`NamespaceMap`]: explicit prefixes are kept as declared, and each
//! anonymous (default) namespace gets a synthetic prefix `ns98`, `ns99`, ...
//!
//! # Examples
//!
//! ```
//! use xml2xpath::document::Document;
//! use xml2xpath::namespace;
//!
//! let doc = Document::parse_str(
//!     r#"<s:Envelope xmlns:s="urn:soap"><s:Body><a xmlns="urn:app"/></s:Body></s:Envelope>"#,
//! ).unwrap();
//! let map = namespace::resolve(&doc);
//! assert_eq!(map.prefix_for("urn:soap"), Some("s"));
//! assert_eq!(map.prefix_for("urn:app"), Some("ns98"));
//! ```

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::debug;

use crate::document::{Document, NamespaceBinding};

/// Number of the first synthetic prefix, `ns98`.
pub const SYNTHETIC_PREFIX_SEED: u32 = 98;

/// Prefix ↔ namespace URI bindings for one document.
///
/// Prefixes are unique. When two prefixes bind the same URI, the reverse
/// lookup [`prefix_for`](Self::prefix_for) returns the one seen last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceMap {
    by_prefix: IndexMap<String, String>,
    by_uri: IndexMap<String, String>,
}

impl NamespaceMap {
    /// Returns the prefix used for `uri`.
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.by_uri.get(uri).map(String::as_str)
    }

    /// Returns the URI bound to `prefix`.
    pub fn uri_for(&self, prefix: &str) -> Option<&str> {
        self.by_prefix.get(prefix).map(String::as_str)
    }

    /// Writes `local` as a qualified name for an element in namespace `uri`.
    ///
    /// Names in no namespace, or in a namespace without a prefix, are
    /// returned bare.
    pub fn qualified_name(&self, local: &str, uri: Option<&str>) -> String {
        match uri.and_then(|uri| self.prefix_for(uri)) {
            Some(prefix) => format!("{prefix}:{local}"),
            None => local.to_string(),
        }
    }

    /// Iterates over `(uri, prefix)` pairs of the reverse map.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_uri.iter().map(|(u, p)| (u.as_str(), p.as_str()))
    }

    /// Iterates over every `(prefix, uri)` binding, including prefixes that
    /// are shadowed in the reverse map.
    pub fn prefixes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_prefix.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    /// Number of distinct namespace URIs.
    pub fn len(&self) -> usize {
        self.by_uri.len()
    }

    /// Returns `true` if the document uses no namespaces.
    pub fn is_empty(&self) -> bool {
        self.by_uri.is_empty()
    }
}

/// Incrementally assigns prefixes to the namespace bindings of a document.
#[derive(Debug)]
pub struct NamespaceResolver {
    by_prefix: IndexMap<String, String>,
    reserved: HashSet<String>,
    counter: u32,
}

impl NamespaceResolver {
    /// Creates a resolver that never hands out any of `reserved` as a
    /// synthetic prefix.
    pub fn new<I, S>(reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            by_prefix: IndexMap::new(),
            reserved: reserved.into_iter().map(Into::into).collect(),
            counter: SYNTHETIC_PREFIX_SEED,
        }
    }

    /// Records one namespace node.
    pub fn observe(&mut self, prefix: Option<&str>, uri: &str) {
        if let Some(prefix) = prefix {
            self.by_prefix.insert(prefix.to_string(), uri.to_string());
            return;
        }
        if uri.is_empty() || self.by_prefix.values().any(|known| known == uri) {
            return;
        }

        let mut candidate = format!("ns{}", self.counter);
        while self.reserved.contains(&candidate) || self.by_prefix.contains_key(&candidate) {
            self.counter += 1;
            candidate = format!("ns{}", self.counter);
        }
        debug!(prefix = %candidate, uri, "assigned synthetic prefix");
        self.by_prefix.insert(candidate, uri.to_string());
    }

    /// Finishes resolution and builds the reverse map.
    pub fn finish(self) -> NamespaceMap {
        let mut by_uri = IndexMap::with_capacity(self.by_prefix.len());
        for (prefix, uri) in &self.by_prefix {
            by_uri.insert(uri.clone(), prefix.clone());
        }
        NamespaceMap {
            by_prefix: self.by_prefix,
            by_uri,
        }
    }
}

/// Builds the namespace map of `doc`.
///
/// Explicit prefixes are collected first so that no synthetic prefix can
/// collide with a prefix declared in the document.
pub fn resolve(doc: &Document) -> NamespaceMap {
    let bindings = doc.namespace_bindings();
    let reserved = bindings.iter().filter_map(|b| b.prefix.clone());
    let mut resolver = NamespaceResolver::new(reserved);
    for NamespaceBinding { prefix, uri } in &bindings {
        resolver.observe(prefix.as_deref(), uri);
    }
    resolver.finish()
}
