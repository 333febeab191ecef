use strata::{Cell, Strata, TagId};
use strata_mock::{DAY_START, MockHistorian};

use std::sync::Arc;

use crate::helpers::{FLOW, LOAD, PUMP, SETPOINT, at, m_table, rec, tag};

fn twelve_tags() -> (Vec<TagId>, Strata) {
    let names: Vec<String> = (1..=12)
        .map(|k| format!("MDSSCSC1.ANVCALC.ADE{k:02}CA02"))
        .collect();
    let table = names
        .iter()
        .enumerate()
        .map(|(k, n)| {
            // every tag shares ts=600; the rest are staggered per tag
            let k = k as i64;
            (n.clone(), vec![rec(k, k as f64), rec(600, 100.0 + k as f64)])
        })
        .collect();
    let strata = Strata::builder()
        .with_connector(m_table("hist", table))
        .build()
        .unwrap();
    (names.iter().map(|n| tag(n)).collect(), strata)
}

#[tokio::test]
async fn shared_timestamp_produces_one_row() {
    let (tags, strata) = twelve_tags();
    let (table, report) = strata
        .merge()
        .tags(&tags)
        .unwrap()
        .window(at(0), at(600))
        .fill_limit(0)
        .utc(true)
        .run_with_report()
        .await
        .unwrap();

    assert_eq!(table.width(), 12);
    assert_eq!(table.len(), 13);
    assert!(table.is_strictly_ascending());
    assert_eq!(report.duplicate_rows_collapsed, 0);

    let last = table.len() - 1;
    assert_eq!(table.index()[last].epoch_seconds(), 600);
    for col in 0..12 {
        assert_eq!(
            table.cell(last, col),
            Some(&Cell::Observed(100.0 + col as f64))
        );
    }
}

#[tokio::test]
async fn verification_does_not_change_a_unique_index() {
    let (tags, strata) = twelve_tags();
    let verified = strata
        .merge()
        .tags(&tags)
        .unwrap()
        .window(at(0), at(600))
        .run()
        .await
        .unwrap();
    let unverified = strata
        .merge()
        .tags(&tags)
        .unwrap()
        .window(at(0), at(600))
        .verify_time(false)
        .run()
        .await
        .unwrap();
    assert_eq!(verified, unverified);
}

#[tokio::test]
async fn duplicates_inside_a_tag_resolve_to_the_last_record() {
    let dup = vec![rec(0, 1.0), rec(60, 2.0), rec(60, 3.0), rec(120, 4.0)];
    let strata = Strata::builder()
        .with_connector(m_table("hist", vec![(LOAD, dup), (FLOW, vec![rec(60, 9.0)])]))
        .build()
        .unwrap();

    let (table, report) = strata
        .merge()
        .tags(&[tag(LOAD), tag(FLOW)])
        .unwrap()
        .window(at(0), at(120))
        .fill_limit(0)
        .run_with_report()
        .await
        .unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(table.cell(1, 0), Some(&Cell::Observed(3.0)));
    assert_eq!(table.cell(1, 1), Some(&Cell::Observed(9.0)));
    assert_eq!(report.tags[0].duplicates_collapsed, 1);
    assert_eq!(report.tags[0].observations, 3);
}

#[tokio::test]
async fn duplicates_collapse_the_same_way_without_time_verification() {
    let dup = vec![rec(0, 1.0), rec(60, 2.0), rec(60, 3.0), rec(120, 4.0)];
    let strata = Strata::builder()
        .with_connector(m_table("hist", vec![(LOAD, dup), (FLOW, vec![rec(60, 9.0)])]))
        .build()
        .unwrap();

    let (table, report) = strata
        .merge()
        .tags(&[tag(LOAD), tag(FLOW)])
        .unwrap()
        .window(at(0), at(120))
        .fill_limit(0)
        .verify_time(false)
        .run_with_report()
        .await
        .unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(table.cell(1, 0), Some(&Cell::Observed(3.0)));
    assert_eq!(table.cell(1, 1), Some(&Cell::Observed(9.0)));
    assert_eq!(report.tags[0].duplicates_collapsed, 1);
    assert_eq!(report.tags[0].observations, 3);
}

#[tokio::test]
async fn mixed_cadence_fixture_day() {
    let strata = Strata::builder()
        .with_connector(Arc::new(MockHistorian::new()))
        .build()
        .unwrap();

    let start = at(DAY_START);
    let end = at(DAY_START + 3_600);
    let (table, report) = strata
        .merge()
        .tags(&[tag(LOAD), tag(FLOW), tag(SETPOINT), tag(PUMP)])
        .unwrap()
        .window(start, end)
        .sampling_rate(chrono::TimeDelta::seconds(60))
        .fill_limit(10)
        .desc_as_label(true)
        .utc(true)
        .run_with_report()
        .await
        .unwrap();

    // 00:00 through 01:00 inclusive on a one-minute grid
    assert_eq!(table.len(), 61);
    let labels: Vec<&str> = table.labels().collect();
    assert_eq!(
        labels,
        vec![
            "ADE1 Percent Load",
            "ADE1 Inlet Flow",
            "ADE1 Load Setpoint",
            "Pump 01 Speed"
        ]
    );

    // load is stored every minute, so nothing is filled
    assert_eq!(report.tags[0].cells_filled, 0);
    assert_eq!(report.tags[0].estimated_step_seconds, Some(60));
    // flow lands every fifth grid point and the four between are filled
    let flow = table.column("ADE1 Inlet Flow").unwrap();
    assert!(flow.cells.iter().all(|c| !c.is_missing()));
    assert_eq!(report.tags[1].estimated_step_seconds, Some(300));
    // the setpoint changed twice early, then stayed flat past the fill horizon
    let sp = table.column("ADE1 Load Setpoint").unwrap();
    assert_eq!(sp.cells[0], Cell::Missing);
    assert_eq!(sp.cells[1], Cell::Observed(40.0));
    assert_eq!(sp.cells[2], Cell::Observed(42.0));
    assert!(sp.cells[3..13].iter().all(Cell::is_filled));
    assert!(sp.cells[13..].iter().all(Cell::is_missing));
    // rewritten pump records collapse before alignment
    assert!(report.tags[3].duplicates_collapsed > 0);
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn short_gap_is_filled_long_gap_is_cut() {
    let strata = Strata::builder()
        .with_connector(m_table(
            "hist",
            vec![
                (LOAD, vec![rec(0, 1.0), rec(10, 2.0), rec(20, 3.0), rec(30, 4.0)]),
                (FLOW, vec![rec(0, 7.0)]),
                (SETPOINT, vec![rec(0, 5.0), rec(20, 6.0)]),
            ],
        ))
        .build()
        .unwrap();

    let table = strata
        .merge()
        .tags(&[tag(LOAD), tag(FLOW), tag(SETPOINT)])
        .unwrap()
        .window(at(0), at(30))
        .fill_limit(2)
        .run()
        .await
        .unwrap();

    let flow = &table.column(FLOW).unwrap().cells;
    assert_eq!(
        flow,
        &vec![
            Cell::Observed(7.0),
            Cell::Filled(7.0),
            Cell::Filled(7.0),
            Cell::Missing
        ]
    );
    let sp = &table.column(SETPOINT).unwrap().cells;
    assert_eq!(sp[1], Cell::Filled(5.0));
    assert_eq!(sp[2], Cell::Observed(6.0));
    assert_eq!(sp[3], Cell::Filled(6.0));
}
