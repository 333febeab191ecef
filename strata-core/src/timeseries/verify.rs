use strata_types::{Cell, MergedTable, StrataError};

const fn strength(c: &Cell) -> u8 {
    match c {
        Cell::Observed(_) => 2,
        Cell::Filled(_) => 1,
        Cell::Missing => 0,
    }
}

/// Re-scan a table's index, collapsing rows that share a timestamp.
///
/// Within a group of equal timestamps each column keeps the later row's cell
/// unless it is weaker than what is already held (observed beats filled beats
/// missing), so a later gap never erases an earlier value. Returns the
/// collapsed table and the number of rows removed.
///
/// # Errors
/// Returns `AlignmentInconsistency` if the index ever decreases.
pub fn collapse_duplicate_rows(table: MergedTable) -> Result<(MergedTable, usize), StrataError> {
    let (axis, index, mut columns) = table.into_parts();
    if let Some(pos) = index.windows(2).position(|w| w[1] < w[0]) {
        return Err(StrataError::AlignmentInconsistency(format!(
            "index decreases at row {}: {} after {}",
            pos + 1,
            index[pos + 1],
            index[pos]
        )));
    }

    let mut keep: Vec<usize> = Vec::with_capacity(index.len());
    for row in 0..index.len() {
        match keep.last() {
            Some(&kept) if index[kept] == index[row] => {
                for col in &mut columns {
                    let later = col.cells[row];
                    if strength(&later) >= strength(&col.cells[kept]) {
                        col.cells[kept] = later;
                    }
                }
            }
            _ => keep.push(row),
        }
    }

    let removed = index.len() - keep.len();
    if removed == 0 {
        return Ok((MergedTable::from_parts(axis, index, columns)?, 0));
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(removed, "collapsed duplicate index rows");

    let new_index = keep.iter().map(|&r| index[r]).collect();
    for col in &mut columns {
        col.cells = keep.iter().map(|&r| col.cells[r]).collect();
    }
    Ok((MergedTable::from_parts(axis, new_index, columns)?, removed))
}
