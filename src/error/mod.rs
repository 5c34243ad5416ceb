//! Error types and diagnostics for path qualification.
//!
//! Failures come in two flavours. Fatal conditions abort a qualification run
//! and are returned as [`Error`]; the caller gets no result table. Non-fatal
//! conditions are collected as [`Diagnostic`]s next to a still-usable table,
//! much like a recovering parser collects warnings while producing a tree.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::document::NodeKind;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The run continued and the result table is complete.
    Warning,
    /// The run continued but an entry was dropped from the result table.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// The kinds of non-fatal problem a qualification run can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// The same raw path was produced twice. Raw paths are positionally
    /// unique, so this points at a defect in the tree engine.
    EngineDefect,
    /// A synthesized qualified path matched no node when counted.
    ZeroMatch,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EngineDefect => write!(f, "engine defect"),
            Self::ZeroMatch => write!(f, "zero match"),
        }
    }
}

/// A single non-fatal diagnostic emitted during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What went wrong.
    pub kind: DiagnosticKind,
    /// Raw path of the node the diagnostic is about.
    pub raw_path: String,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// A raw path that was already present in the result table.
    pub fn duplicate_path(raw_path: &str) -> Self {
        Self {
            kind: DiagnosticKind::EngineDefect,
            raw_path: raw_path.to_string(),
            message: "duplicated raw path, entry skipped".to_string(),
        }
    }

    /// A qualified path whose `count()` came back as zero.
    pub fn zero_match(raw_path: &str, qualified_path: &str) -> Self {
        Self {
            kind: DiagnosticKind::ZeroMatch,
            raw_path: raw_path.to_string(),
            message: format!("qualified path `{qualified_path}` matches no node"),
        }
    }

    /// Severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        match self.kind {
            DiagnosticKind::EngineDefect => Severity::Error,
            DiagnosticKind::ZeroMatch => Severity::Warning,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.severity(),
            self.message,
            self.raw_path
        )
    }
}

/// The XPath operation that was running when an evaluation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Locating the document node of freshly parsed input.
    Load,
    /// Selecting the start node-set.
    Select,
    /// Counting the matches of a qualified path.
    Count,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => write!(f, "document loading"),
            Self::Select => write!(f, "node selection"),
            Self::Count => write!(f, "match count"),
        }
    }
}

/// The error type returned when a qualification run fails.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input document does not exist.
    #[error("{}: no such file or directory", path.display())]
    InputNotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// The input document exists but could not be read.
    #[error("{}: failed to read: {source}", path.display())]
    Io {
        /// The path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The input bytes cannot be decoded to text.
    #[error("failed to decode document: {0}")]
    Encoding(String),

    /// The input is not well-formed XML.
    #[error("failed to load document: {0}")]
    Parse(#[from] xee_xpath::error::DocumentsError),

    /// The start expression selected nodes that have no positional path.
    #[error("cannot qualify {kind} nodes selected by `{expression}`")]
    UnsupportedNodeType {
        /// The offending start expression.
        expression: String,
        /// Kind of the first unsupported item.
        kind: NodeKind,
    },

    /// Any other failure while evaluating an expression.
    #[error("{operation} failed for `{expression}`: {source}")]
    XPath {
        /// What was being evaluated.
        operation: Operation,
        /// The expression that failed.
        expression: String,
        /// Error reported by the XPath engine.
        #[source]
        source: xee_xpath::error::Error,
    },
}

impl Error {
    /// Returns `true` if the input could not be located at all.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::InputNotFound { .. })
    }
}
