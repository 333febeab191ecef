//! Multi-tag aligned table produced by the merge engine.

use serde::{Deserialize, Serialize};

use crate::error::StrataError;
use crate::tag::TagId;
use crate::time::{TimeAxis, Timestamp};

/// Content of one table cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    /// A value observed at exactly this row's timestamp.
    Observed(f64),
    /// A value carried forward from an earlier observation.
    Filled(f64),
    /// No value available.
    Missing,
}

impl Cell {
    /// Numeric value, whether observed or filled.
    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        match self {
            Self::Observed(v) | Self::Filled(v) => Some(*v),
            Self::Missing => None,
        }
    }

    /// True for [`Cell::Missing`].
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// True for [`Cell::Filled`].
    #[must_use]
    pub const fn is_filled(&self) -> bool {
        matches!(self, Self::Filled(_))
    }

    /// True for [`Cell::Observed`].
    #[must_use]
    pub const fn is_observed(&self) -> bool {
        matches!(self, Self::Observed(_))
    }
}

/// One tag's column in a [`MergedTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Tag the column was pulled for.
    pub tag: TagId,
    /// Display label (tag name or description).
    pub label: String,
    /// One cell per table row.
    pub cells: Vec<Cell>,
}

impl Column {
    /// Numeric view of the column (`None` where missing).
    pub fn values(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.cells.iter().map(Cell::value)
    }

    /// Count of missing cells.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_missing()).count()
    }

    /// Count of forward-filled cells.
    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_filled()).count()
    }
}

/// A time-indexed table with one column per requested tag.
///
/// Produced once by the merge engine and never mutated afterwards. Column
/// order matches the caller's tag order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedTable {
    axis: TimeAxis,
    index: Vec<Timestamp>,
    columns: Vec<Column>,
}

impl MergedTable {
    /// Assemble a table from an index and columns of matching length.
    ///
    /// # Errors
    /// Returns `AlignmentInconsistency` if any column's length differs from the index.
    pub fn from_parts(
        axis: TimeAxis,
        index: Vec<Timestamp>,
        columns: Vec<Column>,
    ) -> Result<Self, StrataError> {
        if let Some(bad) = columns.iter().find(|c| c.cells.len() != index.len()) {
            return Err(StrataError::AlignmentInconsistency(format!(
                "column '{}' has {} cells for {} rows",
                bad.label,
                bad.cells.len(),
                index.len()
            )));
        }
        Ok(Self {
            axis,
            index,
            columns,
        })
    }

    /// Timestamp representation of the index.
    #[must_use]
    pub const fn axis(&self) -> TimeAxis {
        self.axis
    }

    /// Row timestamps.
    #[must_use]
    pub fn index(&self) -> &[Timestamp] {
        &self.index
    }

    /// Columns in caller order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column with the given display label.
    #[must_use]
    pub fn column(&self, label: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.label == label)
    }

    /// Column pulled for the given tag.
    #[must_use]
    pub fn column_for(&self, tag: &TagId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.tag == tag)
    }

    /// Display labels in column order.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|c| c.label.as_str())
    }

    /// Cell at (`row`, `col`).
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.columns.get(col).and_then(|c| c.cells.get(row))
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// True when every timestamp is strictly greater than the previous one.
    #[must_use]
    pub fn is_strictly_ascending(&self) -> bool {
        self.index.windows(2).all(|w| w[0] < w[1])
    }

    /// Consume the table, returning its parts.
    #[must_use]
    pub fn into_parts(self) -> (TimeAxis, Vec<Timestamp>, Vec<Column>) {
        (self.axis, self.index, self.columns)
    }
}
