//! Segment-splitting fallback for nodes without a resolved parent.
//!
//! The raw path is cut at every `/*` and the pieces are replayed left to
//! right against the table of already-resolved paths. The fold carries an
//! anchor, the longest raw prefix known so far, and the path composed for
//! the node once one has been produced.

use super::table::ResultTable;

const WILDCARD_STEP: &str = "/*";

#[derive(Debug)]
struct Fold<'a> {
    raw: &'a str,
    anchor: String,
    composed: Option<String>,
}

impl<'a> Fold<'a> {
    fn new(raw: &'a str, first: &str) -> Self {
        Self {
            raw,
            anchor: first.to_string(),
            composed: None,
        }
    }

    /// Qualified form of the current anchor; empty when nothing is known.
    fn anchor_path<'t>(&'t self, table: &'t ResultTable) -> &'t str {
        if self.anchor == self.raw {
            if let Some(composed) = &self.composed {
                return composed;
            }
        }
        table.qualified_path(&self.anchor).unwrap_or_default()
    }

    fn compose(&mut self, name: &str, table: &ResultTable) {
        let composed = format!("{}/{name}", self.anchor_path(table));
        self.composed = Some(composed);
    }

    fn step(mut self, segment: &str, name: &str, table: &ResultTable) -> Self {
        let next = format!("{}{WILDCARD_STEP}{segment}", self.anchor);
        if !table.contains(&next) {
            self.compose(name, table);
            self.anchor = self.raw.to_string();
        } else if !self.raw.ends_with(['*', ']']) {
            let bracketed = self.raw.split("]/").next().unwrap_or(self.raw);
            self.anchor = format!("{bracketed}]");
            self.compose(name, table);
        } else {
            self.anchor = next;
        }
        self
    }
}

/// Rebuilds a qualified path for `raw` whose element is written `name`.
///
/// Falls back to `raw` itself when no segment produced a path.
pub(crate) fn rebuild(raw: &str, name: &str, table: &ResultTable) -> String {
    let mut segments = raw.split(WILDCARD_STEP);
    let first = segments.next().unwrap_or_default();
    segments
        .fold(Fold::new(raw, first), |fold, segment| {
            fold.step(segment, name, table)
        })
        .composed
        .unwrap_or_else(|| raw.to_string())
}
