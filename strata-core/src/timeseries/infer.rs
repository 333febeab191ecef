use std::collections::BTreeMap;

use strata_types::Timestamp;

/// Estimate a representative step (in seconds) between adjacent timestamps.
///
/// Historians store records only on change, so spacing is uneven; this picks
/// the most frequent positive gap, or the lower median when no single gap is
/// most frequent.
///
/// ```
/// use strata_core::estimate_step_seconds;
/// use strata_core::Timestamp;
///
/// let ts: Vec<Timestamp> = [0, 60, 120, 180, 300, 480].into_iter().map(Timestamp::Epoch).collect();
/// assert_eq!(estimate_step_seconds(&ts), Some(60));
///
/// // gaps 60, 60, 120, 120: no unique mode, lower median is 60
/// let ts: Vec<Timestamp> = [0, 60, 120, 240, 360].into_iter().map(Timestamp::Epoch).collect();
/// assert_eq!(estimate_step_seconds(&ts), Some(60));
/// ```
///
/// Input order does not matter and duplicates are ignored. Returns `None`
/// with fewer than two distinct timestamps.
#[must_use]
pub fn estimate_step_seconds(timestamps: &[Timestamp]) -> Option<i64> {
    let mut secs: Vec<i64> = timestamps.iter().map(Timestamp::epoch_seconds).collect();
    secs.sort_unstable();
    secs.dedup();

    let mut deltas: Vec<i64> = secs.windows(2).map(|w| w[1] - w[0]).collect();
    if deltas.is_empty() {
        return None;
    }
    deltas.sort_unstable();

    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for &d in &deltas {
        *counts.entry(d).or_default() += 1;
    }
    let best = counts.values().copied().max().unwrap_or(0);
    let mut leaders = counts.iter().filter(|(_, c)| **c == best).map(|(d, _)| *d);
    if let (Some(only), None) = (leaders.next(), leaders.next()) {
        return Some(only);
    }

    let mid = deltas.len() / 2;
    if deltas.len() % 2 == 1 {
        Some(deltas[mid])
    } else {
        Some(deltas[mid - 1])
    }
}
