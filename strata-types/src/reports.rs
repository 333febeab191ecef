//! Report envelopes produced alongside merged tables.

use serde::{Deserialize, Serialize};

use crate::error::StrataError;
use crate::tag::TagId;

/// Per-tag statistics gathered while merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagStats {
    /// Tag the statistics refer to.
    pub tag: TagId,
    /// Column label used in the table.
    pub label: String,
    /// Observations retrieved after per-series de-duplication.
    pub observations: usize,
    /// Records dropped because a later record shared their timestamp.
    pub duplicates_collapsed: usize,
    /// Representative spacing of the raw series, in seconds.
    pub estimated_step_seconds: Option<i64>,
    /// Cells populated by forward fill in this tag's column.
    pub cells_filled: usize,
    /// Cells left missing in this tag's column.
    pub cells_missing: usize,
}

/// Summary of a multi-tag merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AlignmentReport {
    /// Rows in the final table.
    pub rows: usize,
    /// Statistics per tag, in column order.
    pub tags: Vec<TagStats>,
    /// Index entries merged away by duplicate verification.
    pub duplicate_rows_collapsed: usize,
    /// Non-fatal issues (for example, metadata lookups that failed).
    pub warnings: Vec<StrataError>,
}

impl AlignmentReport {
    /// Total forward-filled cells across all columns.
    #[must_use]
    pub fn cells_filled(&self) -> usize {
        self.tags.iter().map(|t| t.cells_filled).sum()
    }
}
