//! Reference semantics for every pull mode.
//!
//! Historian bindings normally compute aggregates server-side. These
//! functions define the behavior the in-memory historians in this workspace
//! follow, treating stored records as a step function (each value holds
//! until the next record):
//!
//! - The window `[start, end]` is cut into `n = ceil((end - start) / period)`
//!   sub-intervals. Sub-interval `k` spans `(b[k-1], b[k]]` with
//!   `b[k] = min(start + k * period, end)`; each yields one record stamped `b[k]`.
//! - `snap`: the last record at or before `b[k]`, including records from
//!   before the window. Long gaps therefore repeat one value (a flat line).
//! - `interpolate`: linear interpolation between the records around `b[k]`;
//!   after the last record the value is held.
//! - `average`: time-weighted mean of the step function over the sub-interval.
//! - `minimum` / `maximum`: extremes of the step function over the
//!   sub-interval, including the value carried in from before it.
//! - `raw`: stored records with `start <= ts <= end`, unchanged. The bounds
//!   are compared as full instants, so a fractional `start` excludes the
//!   whole second it falls in.
//!
//! Sub-intervals with no usable value yield an outage record (`value: None`).

use chrono::DateTime;
use strata_types::{PullMode, RawObservation, RetrievalQuery, Status};

/// Apply `query`'s mode to `records` (in any order).
#[must_use]
pub fn sample(records: &[RawObservation], query: &RetrievalQuery) -> Vec<RawObservation> {
    let start = query.start.timestamp();
    let end = query.end.timestamp();
    let mut sorted: Vec<RawObservation> = records.to_vec();
    sorted.sort_by_key(|r| r.ts);

    let period = match (query.mode, query.period) {
        (PullMode::Raw, _) => {
            let window = query.start..=query.end;
            return sorted
                .into_iter()
                .filter(|r| {
                    DateTime::from_timestamp(r.ts, 0).is_some_and(|at| window.contains(&at))
                })
                .collect();
        }
        (_, Some(p)) if p.num_seconds() > 0 => p.num_seconds(),
        _ => return Vec::new(),
    };

    boundaries(start, end, period)
        .map(|(lo, hi)| {
            let value = match query.mode {
                PullMode::Snap => last_at_or_before(&sorted, hi).and_then(|r| r.value),
                PullMode::Interpolate => interpolate_at(&sorted, hi),
                PullMode::Average => time_weighted_mean(&sorted, lo, hi),
                PullMode::Minimum => extreme(&sorted, lo, hi, f64::min),
                PullMode::Maximum => extreme(&sorted, lo, hi, f64::max),
                PullMode::Raw => None,
            };
            let status = if value.is_some() {
                Status::good()
            } else {
                Status::missing()
            };
            RawObservation {
                ts: hi,
                value,
                status,
            }
        })
        .collect()
}

/// Sub-interval bounds `(b[k-1], b[k])` for `k = 1..=n`.
pub fn boundaries(start: i64, end: i64, period: i64) -> impl Iterator<Item = (i64, i64)> {
    let span = (end - start).max(0);
    let n = if period > 0 { (span + period - 1) / period } else { 0 };
    (1..=n).map(move |k| {
        let lo = start + (k - 1) * period;
        let hi = (start + k * period).min(end);
        (lo, hi)
    })
}

fn last_at_or_before(sorted: &[RawObservation], t: i64) -> Option<&RawObservation> {
    let idx = sorted.partition_point(|r| r.ts <= t);
    idx.checked_sub(1).map(|i| &sorted[i])
}

fn interpolate_at(sorted: &[RawObservation], t: i64) -> Option<f64> {
    let idx = sorted.partition_point(|r| r.ts <= t);
    let prev = sorted[..idx].iter().rev().find(|r| r.value.is_some())?;
    let pv = prev.value?;
    if prev.ts == t {
        return Some(pv);
    }
    let Some(next) = sorted[idx..].iter().find(|r| r.value.is_some()) else {
        return Some(pv);
    };
    let nv = next.value?;
    #[allow(clippy::cast_precision_loss)]
    let frac = (t - prev.ts) as f64 / (next.ts - prev.ts) as f64;
    Some(pv + (nv - pv) * frac)
}

/// Step-function pieces over `[lo, hi]`: the carried-in value at `lo` followed
/// by every record in `(lo, hi]`, each paired with the time it takes effect.
fn pieces(sorted: &[RawObservation], lo: i64, hi: i64) -> Vec<(i64, Option<f64>)> {
    let mut out: Vec<(i64, Option<f64>)> = Vec::new();
    if let Some(carry) = last_at_or_before(sorted, lo) {
        out.push((lo, carry.value));
    }
    let from = sorted.partition_point(|r| r.ts <= lo);
    let to = sorted.partition_point(|r| r.ts <= hi);
    out.extend(sorted[from..to].iter().map(|r| (r.ts, r.value)));
    out
}

fn time_weighted_mean(sorted: &[RawObservation], lo: i64, hi: i64) -> Option<f64> {
    let p = pieces(sorted, lo, hi);
    let mut weighted = 0.0;
    let mut covered: i64 = 0;
    for (i, (t, v)) in p.iter().enumerate() {
        let until = p.get(i + 1).map_or(hi, |(n, _)| *n);
        if let Some(v) = v {
            let dt = until - t;
            #[allow(clippy::cast_precision_loss)]
            {
                weighted += v * dt as f64;
            }
            covered += dt;
        }
    }
    if covered > 0 {
        #[allow(clippy::cast_precision_loss)]
        return Some(weighted / covered as f64);
    }
    // only zero-length pieces (e.g. a single record exactly at `hi`)
    let vals: Vec<f64> = p.iter().filter_map(|(_, v)| *v).collect();
    if vals.is_empty() {
        None
    } else {
        #[allow(clippy::cast_precision_loss)]
        Some(vals.iter().sum::<f64>() / vals.len() as f64)
    }
}

fn extreme(sorted: &[RawObservation], lo: i64, hi: i64, pick: fn(f64, f64) -> f64) -> Option<f64> {
    pieces(sorted, lo, hi)
        .into_iter()
        .filter_map(|(_, v)| v)
        .reduce(pick)
}
