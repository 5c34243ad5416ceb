//! Result records and the ordered result table.

use std::fmt;

use indexmap::IndexMap;

/// Outcome of counting the matches of a qualified path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchCount {
    /// Number of nodes the qualified path matched in the document.
    Found(usize),
    /// The node is not an element, so its path is not counted.
    NotApplicable,
}

impl fmt::Display for MatchCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(n) => write!(f, "{n}"),
            Self::NotApplicable => write!(f, "n/a"),
        }
    }
}

/// The qualified form of one selected node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedRecord {
    /// Namespace-qualified path, or the raw path for comments and
    /// processing instructions.
    pub qualified_path: String,
    /// Set only when match counting was requested.
    pub match_count: Option<MatchCount>,
    /// Local names of the element's attributes in document order; `None`
    /// for non-elements.
    pub attribute_names: Option<Vec<String>>,
}

impl QualifiedRecord {
    pub(crate) fn element(qualified_path: String, attribute_names: Vec<String>) -> Self {
        Self {
            qualified_path,
            match_count: None,
            attribute_names: Some(attribute_names),
        }
    }

    pub(crate) fn unqualified(raw_path: &str) -> Self {
        Self {
            qualified_path: raw_path.to_string(),
            match_count: None,
            attribute_names: None,
        }
    }

    /// Returns `true` if the record belongs to an element.
    pub fn is_element(&self) -> bool {
        self.attribute_names.is_some()
    }

    /// Returns `false` only when the qualified path was counted and matched
    /// nothing.
    pub fn is_sound(&self) -> bool {
        self.match_count != Some(MatchCount::Found(0))
    }

    /// Iterates over the `path/@attr` expressions of the element's attributes.
    pub fn attribute_paths(&self) -> impl Iterator<Item = String> + '_ {
        self.attribute_names
            .iter()
            .flatten()
            .map(move |name| format!("{}/@{name}", self.qualified_path))
    }
}

impl fmt::Display for QualifiedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, ", self.qualified_path)?;
        match self.match_count {
            Some(count) => write!(f, "{count}, ")?,
            None => write!(f, "None, ")?,
        }
        match &self.attribute_names {
            Some(names) => write!(f, "{names:?})"),
            None => write!(f, "None)"),
        }
    }
}

/// Ordered mapping from raw path to [`QualifiedRecord`].
///
/// Entries keep the document order of the selected nodes. Two tables are
/// equal only if they hold the same entries in the same order.
#[derive(Debug, Clone, Default)]
pub struct ResultTable {
    entries: IndexMap<String, QualifiedRecord>,
}

impl ResultTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry. Returns `false`, leaving the table untouched, if
    /// `raw_path` is already present.
    pub(crate) fn insert(&mut self, raw_path: String, record: QualifiedRecord) -> bool {
        if self.entries.contains_key(&raw_path) {
            return false;
        }
        self.entries.insert(raw_path, record);
        true
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut QualifiedRecord)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the record stored under `raw_path`.
    pub fn get(&self, raw_path: &str) -> Option<&QualifiedRecord> {
        self.entries.get(raw_path)
    }

    /// Returns the qualified path stored under `raw_path`.
    pub fn qualified_path(&self, raw_path: &str) -> Option<&str> {
        self.get(raw_path).map(|r| r.qualified_path.as_str())
    }

    /// Returns `true` if `raw_path` is a key of the table.
    pub fn contains(&self, raw_path: &str) -> bool {
        self.entries.contains_key(raw_path)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(raw path, record)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &QualifiedRecord)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over the raw paths in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over the records in document order.
    pub fn values(&self) -> impl Iterator<Item = &QualifiedRecord> {
        self.entries.values()
    }

    /// Total number of attributes over all element records.
    pub fn attribute_count(&self) -> usize {
        self.values()
            .filter_map(|r| r.attribute_names.as_ref())
            .map(Vec::len)
            .sum()
    }
}

impl PartialEq for ResultTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

impl Eq for ResultTable {}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = (&'a String, &'a QualifiedRecord);
    type IntoIter = indexmap::map::Iter<'a, String, QualifiedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
