use chrono::{DateTime, TimeDelta, Utc};
use strata_types::{Observation, Status, TimeAxis, Timestamp};

/// Fixed grid `start + k * step` for every `k >= 0` with the point at or before `end`.
///
/// The grid depends only on the window and step, so every series resampled
/// with the same arguments lands on identical timestamps. Returns an empty
/// grid when `step` is not positive.
#[must_use]
pub fn grid(start: DateTime<Utc>, end: DateTime<Utc>, step: TimeDelta, axis: TimeAxis) -> Vec<Timestamp> {
    if step <= TimeDelta::zero() || end < start {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut t = start;
    while t <= end {
        let ts = match axis {
            TimeAxis::Epoch => Timestamp::Epoch(t.timestamp()),
            TimeAxis::Calendar => Timestamp::Calendar(t),
        };
        out.push(ts);
        match t.checked_add_signed(step) {
            Some(next) => t = next,
            None => break,
        }
    }
    out
}

/// Place a strictly ascending series onto `grid`.
///
/// Grid point `g[k]` takes the last observation in `(g[k-1], g[k]]` (for the
/// first point, any observation at or before it), keeping that observation's
/// value and status. Points whose step holds no observation become outage
/// records so the gap can be handled by forward fill. Observations after the
/// last grid point are dropped.
#[must_use]
pub fn resample_to_grid(series: &[Observation], grid: &[Timestamp]) -> Vec<Observation> {
    let mut out = Vec::with_capacity(grid.len());
    let mut i = 0usize;
    for g in grid {
        let mut last: Option<&Observation> = None;
        while i < series.len() && series[i].ts <= *g {
            last = Some(&series[i]);
            i += 1;
        }
        out.push(match last {
            Some(o) => Observation {
                ts: *g,
                value: o.value,
                status: o.status.clone(),
            },
            None => Observation {
                ts: *g,
                value: None,
                status: Status::missing(),
            },
        });
    }
    out
}
