use polars::prelude::{Column, DataFrame, PolarsResult};
use strata_types::{MergedTable, TagSeries};

/// Name of the index column in exported frames.
pub const TIME_COLUMN: &str = "time";

/// Conversion into a polars `DataFrame`.
///
/// Frames carry a `time` column (epoch seconds, `i64`) followed by one
/// nullable `f64` column per label.
pub trait ToDataFrame {
    /// Build the frame.
    ///
    /// # Errors
    /// Returns a polars error if column construction fails (for example two
    /// columns sharing a label).
    fn to_dataframe(&self) -> PolarsResult<DataFrame>;
}

impl ToDataFrame for MergedTable {
    fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let time: Vec<i64> = self.index().iter().map(|t| t.epoch_seconds()).collect();
        let mut cols = Vec::with_capacity(self.width() + 1);
        cols.push(Column::new(TIME_COLUMN.into(), time));
        for col in self.columns() {
            let values: Vec<Option<f64>> = col.values().collect();
            cols.push(Column::new(col.label.as_str().into(), values));
        }
        DataFrame::new(cols)
    }
}

impl ToDataFrame for TagSeries {
    /// Adds a `<label> Status` string column next to the values.
    fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let obs = self.observations();
        let time: Vec<i64> = obs.iter().map(|o| o.ts.epoch_seconds()).collect();
        let values: Vec<Option<f64>> = obs.iter().map(|o| o.value).collect();
        let status: Vec<&str> = obs.iter().map(|o| o.status.as_str()).collect();
        let label = self.label();
        DataFrame::new(vec![
            Column::new(TIME_COLUMN.into(), time),
            Column::new(label.into(), values),
            Column::new(format!("{label} Status").into(), status),
        ])
    }
}
