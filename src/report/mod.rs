//! Reporting modes.
//!
//! Each [`Mode`] is a pure projection of a [`ResultTable`] onto lines of
//! text. Report lines are meant for the primary output channel only; they
//! never carry diagnostics.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use crate::qualify::ResultTable;

/// What to print for every table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// The qualified path.
    #[default]
    Path,
    /// The qualified path followed by one `path/@attr` line per attribute.
    All,
    /// The raw path and the record.
    Raw,
    /// The record only.
    Values,
}

impl Mode {
    /// Every mode, in the order they are documented.
    pub const VARIANTS: [Mode; 4] = [Mode::Path, Mode::All, Mode::Raw, Mode::Values];

    /// The name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::All => "all",
            Self::Raw => "raw",
            Self::Values => "values",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown [`Mode`] name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode `{0}` (expected one of: path, all, raw, values)")]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" | "xpath" => Ok(Self::Path),
            "all" => Ok(Self::All),
            "raw" => Ok(Self::Raw),
            "values" => Ok(Self::Values),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

/// Totals printed after a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportSummary {
    /// Number of table entries.
    pub elements: usize,
    /// Number of attributes over all elements.
    pub attributes: usize,
}

impl ReportSummary {
    /// Computes the totals of `table`.
    pub fn of(table: &ResultTable) -> Self {
        Self {
            elements: table.len(),
            attributes: table.attribute_count(),
        }
    }
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Found {:3} xpath expressions for elements", self.elements)?;
        write!(
            f,
            "Found {:3} xpath expressions for attributes",
            self.attributes
        )
    }
}

/// Renders `table` as report lines.
pub fn render(table: &ResultTable, mode: Mode) -> Vec<String> {
    let mut lines = Vec::with_capacity(table.len());
    for (raw, record) in table.iter() {
        match mode {
            Mode::Path => lines.push(record.qualified_path.clone()),
            Mode::All => {
                lines.push(record.qualified_path.clone());
                lines.extend(record.attribute_paths());
            }
            Mode::Raw => lines.push(format!("{raw} {record}")),
            Mode::Values => lines.push(record.to_string()),
        }
    }
    lines
}

/// Writes the report for `table` to `out`, one line per entry.
///
/// # Errors
///
/// Propagates write failures.
pub fn write_report<W: Write>(
    out: &mut W,
    table: &ResultTable,
    mode: Mode,
) -> io::Result<ReportSummary> {
    for line in render(table, mode) {
        writeln!(out, "{line}")?;
    }
    Ok(ReportSummary::of(table))
}
