use strata_types::Cell;

/// Forward-fill missing cells from the most recent observed value.
///
/// A missing cell is filled only while it lies within the first `limit`
/// cells after the last `Observed` cell; later cells in the same run stay
/// missing. The run counter restarts only at an observed value, so applying
/// the fill twice with the same limit changes nothing, and `limit == 0`
/// leaves the column untouched.
///
/// Returns the number of cells filled.
pub fn forward_fill(cells: &mut [Cell], limit: usize) -> usize {
    if limit == 0 {
        return 0;
    }
    let mut filled = 0usize;
    let mut last: Option<f64> = None;
    let mut since = 0usize;
    for cell in cells.iter_mut() {
        match *cell {
            Cell::Observed(v) => {
                last = Some(v);
                since = 0;
            }
            Cell::Filled(_) => since += 1,
            Cell::Missing => {
                since += 1;
                if let Some(v) = last
                    && since <= limit
                {
                    *cell = Cell::Filled(v);
                    filled += 1;
                }
            }
        }
    }
    filled
}
