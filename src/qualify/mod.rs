//! Path qualification.
//!
//! Turns the positional paths of selected nodes (`/*/*[3]`) into
//! namespace-qualified expressions (`/ns98:root/ns98:item`) that can be fed
//! back into an `XPath` engine.
//!
//! A run goes through these stages:
//!
//! 1. [`namespace::resolve`] assigns a prefix to every namespace;
//! 2. the start expression selects the nodes to qualify;
//! 3. [`PathQualifier`] qualifies them in document order, reusing the
//!    qualified paths of ancestors already in the [`ResultTable`];
//! 4. optionally, every qualified path is counted against the document.
//!
//! # Examples
//!
//! ```
//! use xml2xpath::qualify::{qualify_str, QualifyOptions};
//!
//! let (_, run) = qualify_str(
//!     r#"<root xmlns="urn:x"><child/></root>"#,
//!     &QualifyOptions::default(),
//! ).unwrap();
//! let paths: Vec<_> = run.table.values().map(|r| r.qualified_path.as_str()).collect();
//! assert_eq!(paths, ["/ns98:root", "/ns98:root/ns98:child"]);
//! ```

mod segments;
mod table;

pub use table::{MatchCount, QualifiedRecord, ResultTable};

use std::path::Path;

use tracing::debug;

use crate::document::{Document, NodeId, NodeKind};
use crate::error::{Diagnostic, Error};
use crate::namespace::{self, NamespaceMap};
use crate::xpath;

/// Start expression selecting every element.
pub const XPATH_ALL: &str = "//*";

/// Start expression selecting every element, comment and processing
/// instruction.
pub const XPATH_ALL_NODES: &str = "//* | //processing-instruction() | //comment()";

/// Default cap on the number of selected nodes.
pub const DEFAULT_MAX_ITEMS: usize = 100_000;

/// Settings for a qualification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifyOptions {
    /// Expression selecting the nodes to qualify.
    pub start_expression: String,
    /// Count the matches of every qualified path.
    pub with_match_counts: bool,
    /// Only the first `max_items` selected nodes are qualified.
    pub max_items: usize,
}

impl Default for QualifyOptions {
    fn default() -> Self {
        Self {
            start_expression: XPATH_ALL.to_string(),
            with_match_counts: false,
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

impl QualifyOptions {
    /// Sets the start expression.
    #[must_use]
    pub fn start_expression(mut self, expression: impl Into<String>) -> Self {
        self.start_expression = expression.into();
        self
    }

    /// Enables or disables match counting.
    #[must_use]
    pub fn with_match_counts(mut self, enabled: bool) -> Self {
        self.with_match_counts = enabled;
        self
    }

    /// Sets the cap on selected nodes.
    #[must_use]
    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }
}

/// Everything a successful run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qualification {
    /// Prefix bindings used in the qualified paths.
    pub namespaces: NamespaceMap,
    /// Qualified records keyed by raw path, in document order.
    pub table: ResultTable,
    /// Non-fatal problems met along the way.
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds qualified paths for a sequence of nodes.
///
/// Nodes must be fed in document order so that ancestors are recorded
/// before their descendants.
#[derive(Debug)]
pub struct PathQualifier<'a> {
    doc: &'a Document,
    namespaces: &'a NamespaceMap,
    root_element: Option<NodeId>,
    table: ResultTable,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> PathQualifier<'a> {
    /// Creates a qualifier with an empty result table.
    pub fn new(doc: &'a Document, namespaces: &'a NamespaceMap) -> Self {
        Self {
            doc,
            namespaces,
            root_element: doc.root_element(),
            table: ResultTable::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Qualifies `node` and records it under its raw path.
    ///
    /// Nodes other than elements, comments and processing instructions are
    /// ignored.
    pub fn push(&mut self, node: NodeId) {
        let kind = self.doc.node_kind(node);
        if !kind.is_qualifiable() {
            return;
        }

        let raw = self.doc.node_path(node);
        if self.table.contains(&raw) {
            let diagnostic = Diagnostic::duplicate_path(&raw);
            debug!("{diagnostic}");
            self.diagnostics.push(diagnostic);
            return;
        }

        let record = if kind == NodeKind::Element {
            let qualified = self.qualified_path(node, &raw);
            QualifiedRecord::element(qualified, self.doc.attribute_names(node))
        } else {
            QualifiedRecord::unqualified(&raw)
        };
        self.table.insert(raw, record);
    }

    /// Returns the table built so far together with the diagnostics.
    pub fn finish(self) -> (ResultTable, Vec<Diagnostic>) {
        (self.table, self.diagnostics)
    }

    fn qualified_name(&self, node: NodeId) -> String {
        let local = self.doc.local_name(node).unwrap_or_default();
        self.namespaces
            .qualified_name(local, self.doc.namespace_uri(node))
    }

    fn qualified_path(&self, node: NodeId, raw: &str) -> String {
        if !raw.contains('*') {
            return raw.to_string();
        }

        let name = self.qualified_name(node);
        let Some(parent) = self.doc.parent_element(node) else {
            return segments::rebuild(raw, &name, &self.table);
        };

        let parent_raw = self.doc.node_path(parent);
        if let Some(parent_path) = self.table.qualified_path(&parent_raw) {
            return format!("{parent_path}/{name}");
        }

        // Ancestors above the start node-set are unknown.
        let axis = if Some(parent) == self.root_element {
            "/"
        } else {
            "//"
        };
        format!("{axis}{}/{name}", self.qualified_name(parent))
    }
}

/// Qualifies the nodes of `doc` selected by `options`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedNodeType`] if the start expression selects a
/// node with no positional path (text, attributes, ...), and
/// [`Error::XPath`] if selecting or counting fails. No table is produced in
/// either case.
pub fn qualify(doc: &mut Document, options: &QualifyOptions) -> Result<Qualification, Error> {
    debug!(
        start = %options.start_expression,
        with_match_counts = options.with_match_counts,
        max_items = options.max_items,
        "qualifying document"
    );

    let namespaces = namespace::resolve(doc);
    let mut nodes = xpath::select(doc, &options.start_expression, &namespaces)?;
    if nodes.len() > options.max_items {
        debug!(
            selected = nodes.len(),
            kept = options.max_items,
            "truncating selection"
        );
        nodes.truncate(options.max_items);
    }

    if let Some(kind) = nodes
        .iter()
        .map(|&node| doc.node_kind(node))
        .find(|kind| !kind.is_qualifiable())
    {
        return Err(Error::UnsupportedNodeType {
            expression: options.start_expression.clone(),
            kind,
        });
    }

    let mut qualifier = PathQualifier::new(doc, &namespaces);
    for node in nodes {
        qualifier.push(node);
    }
    let (mut table, mut diagnostics) = qualifier.finish();

    if options.with_match_counts {
        count_matches(doc, &namespaces, &mut table, &mut diagnostics)?;
    }

    Ok(Qualification {
        namespaces,
        table,
        diagnostics,
    })
}

/// Parses `input` and qualifies it.
///
/// # Errors
///
/// See [`Document::parse_str`] and [`qualify`].
pub fn qualify_str(
    input: &str,
    options: &QualifyOptions,
) -> Result<(Document, Qualification), Error> {
    let mut doc = Document::parse_str(input)?;
    let qualification = qualify(&mut doc, options)?;
    Ok((doc, qualification))
}

/// Decodes and parses `input` and qualifies it.
///
/// # Errors
///
/// See [`Document::parse_bytes`] and [`qualify`].
pub fn qualify_bytes(
    input: &[u8],
    options: &QualifyOptions,
) -> Result<(Document, Qualification), Error> {
    let mut doc = Document::parse_bytes(input)?;
    let qualification = qualify(&mut doc, options)?;
    Ok((doc, qualification))
}

/// Reads the document at `path` and qualifies it.
///
/// # Errors
///
/// See [`Document::parse_file`] and [`qualify`].
pub fn qualify_file(
    path: impl AsRef<Path>,
    options: &QualifyOptions,
) -> Result<(Document, Qualification), Error> {
    let mut doc = Document::parse_file(path)?;
    let qualification = qualify(&mut doc, options)?;
    Ok((doc, qualification))
}

fn count_matches(
    doc: &mut Document,
    namespaces: &NamespaceMap,
    table: &mut ResultTable,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<(), Error> {
    for (raw, record) in table.iter_mut() {
        if !record.is_element() {
            record.match_count = Some(MatchCount::NotApplicable);
            continue;
        }
        let matches = xpath::count(doc, &record.qualified_path, namespaces)?;
        record.match_count = Some(MatchCount::Found(matches));
        if matches == 0 {
            let diagnostic = Diagnostic::zero_match(raw, &record.qualified_path);
            debug!("{diagnostic}");
            diagnostics.push(diagnostic);
        }
    }
    Ok(())
}
