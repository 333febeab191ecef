use std::cmp::Reverse;
use std::collections::BinaryHeap;

use strata_types::{Cell, Observation, StrataError, Timestamp};

/// Union index and one cell vector per input series.
#[derive(Debug, Clone, PartialEq)]
pub struct Aligned {
    /// Strictly ascending union of all input timestamps.
    pub index: Vec<Timestamp>,
    /// Cells per input series, in input order, each as long as `index`.
    pub columns: Vec<Vec<Cell>>,
}

/// Outer-join strictly ascending series onto the union of their timestamps.
///
/// Runs a k-way merge with a binary heap, so the cost is
/// `O(total observations * log k)` plus the output size. A cell is
/// `Observed` where its series has a valued observation at that row's
/// timestamp and `Missing` otherwise (including outage records).
///
/// # Errors
/// Returns `AlignmentInconsistency` if any input is not strictly ascending.
pub fn outer_join(series: &[&[Observation]]) -> Result<Aligned, StrataError> {
    for (col, s) in series.iter().enumerate() {
        if let Some(pos) = s.windows(2).position(|w| w[0].ts >= w[1].ts) {
            return Err(StrataError::AlignmentInconsistency(format!(
                "series {col} is not strictly ascending at position {}",
                pos + 1
            )));
        }
    }

    let mut heap: BinaryHeap<Reverse<(Timestamp, usize)>> = BinaryHeap::with_capacity(series.len());
    let mut cursor: Vec<usize> = vec![0; series.len()];
    for (col, s) in series.iter().enumerate() {
        if let Some(first) = s.first() {
            heap.push(Reverse((first.ts, col)));
        }
    }

    let mut index: Vec<Timestamp> = Vec::new();
    let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); series.len()];

    while let Some(Reverse((ts, col))) = heap.pop() {
        if index.last() != Some(&ts) {
            index.push(ts);
            for c in &mut columns {
                c.push(Cell::Missing);
            }
        }
        let obs = &series[col][cursor[col]];
        if let (Some(v), Some(slot)) = (obs.value, columns[col].last_mut()) {
            *slot = Cell::Observed(v);
        }
        cursor[col] += 1;
        if let Some(next) = series[col].get(cursor[col]) {
            heap.push(Reverse((next.ts, col)));
        }
    }

    Ok(Aligned { index, columns })
}
