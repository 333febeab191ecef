use strata_core::{RawObservation, Status, TagId};

use super::{DAY_END, DAY_START};

/// Stored records for `tag` in storage order, or `None` for unknown points.
///
/// The fixture deliberately mixes cadences: a regular 60 s load, a 300 s
/// flow, a change-only setpoint with long flat stretches, and a pump speed
/// whose archive holds rewritten (duplicate) timestamps.
pub fn records(tag: &TagId) -> Option<Vec<RawObservation>> {
    let out = match tag.as_str() {
        "MDSSCSC1.ANVCALC.ADE1CA02" => every(60, |k| 50.0 + (k % 30) as f64),
        "MDSSCSC1.ANVCALC.ADE1CA03" => every(300, |k| 100.0 + k as f64 * 0.5),
        "MDSSCSC1.ANVCALC.ADE1SP01" => vec![
            RawObservation::new(DAY_START + 5, 40.0, Status::good()),
            RawObservation::new(DAY_START + 65, 42.0, Status::good()),
            RawObservation::new(DAY_START + 7_200, 45.0, Status::good()),
            RawObservation::new(DAY_START + 43_200, 38.5, Status::good()),
        ],
        "MDSSCSC1.ANVCALC.ADE1.STATE" => vec![
            RawObservation::new(DAY_START, 1.0, Status::good()),
            RawObservation::outage(DAY_START + 3_600, Status::bad()),
            RawObservation::new(DAY_START + 3_900, 1.0, Status::good()),
            RawObservation::new(DAY_START + 50_000, 0.0, Status::good()),
        ],
        "MDSSCSC1.SCADA.PUMP01" => {
            let mut v = every(10, |k| 1_450.0 + (k % 7) as f64);
            // archive rewrites: a second record at the same instant supersedes the first
            let rewrites: Vec<RawObservation> = (0..)
                .map(|k| DAY_START + k * 120)
                .take_while(|ts| *ts <= DAY_END)
                .map(|ts| RawObservation::new(ts, 1_500.0, Status::stale()))
                .collect();
            v.extend(rewrites);
            v
        }
        _ => return None,
    };
    Some(out)
}

fn every(step: i64, value: impl Fn(i64) -> f64) -> Vec<RawObservation> {
    (0..)
        .map(|k| (k, DAY_START + k * step))
        .take_while(|(_, ts)| *ts <= DAY_END)
        .map(|(k, ts)| RawObservation::new(ts, value(k), Status::good()))
        .collect()
}
