use std::sync::Arc;

use chrono::TimeDelta;
use strata::{Cell, MergedTable, Strata, StrataError, TagId, TimeAxis};

use crate::helpers::{FLOW, LOAD, MockConnector, at, info, m_table, rec, tag};

fn fast_and_slow() -> Strata {
    let fast = (0..=10).map(|k| rec(k * 10, k as f64)).collect();
    let slow = vec![rec(0, 100.0), rec(100, 200.0)];
    Strata::builder()
        .with_connector(m_table("hist", vec![(LOAD, fast), (FLOW, slow)]))
        .build()
        .unwrap()
}

fn cells(table: &MergedTable, label: &str) -> Vec<Cell> {
    table.column(label).unwrap().cells.clone()
}

#[tokio::test]
async fn fill_stops_at_the_horizon() {
    let strata = fast_and_slow();
    let (table, report) = strata
        .merge()
        .tags(&[tag(LOAD), tag(FLOW)])
        .unwrap()
        .window(at(0), at(100))
        .fill_limit(3)
        .utc(true)
        .run_with_report()
        .await
        .unwrap();

    assert_eq!(table.len(), 11);
    let slow = cells(&table, FLOW);
    assert_eq!(slow[0], Cell::Observed(100.0));
    assert_eq!(&slow[1..4], &[Cell::Filled(100.0); 3]);
    assert!(slow[4..10].iter().all(Cell::is_missing));
    assert_eq!(slow[10], Cell::Observed(200.0));

    assert_eq!(report.rows, 11);
    assert_eq!(report.cells_filled(), 3);
    assert_eq!(report.tags[1].cells_missing, 6);
    assert_eq!(report.tags[0].estimated_step_seconds, Some(10));
}

#[tokio::test]
async fn zero_fill_limit_keeps_gaps() {
    let strata = fast_and_slow();
    let table = strata
        .merge()
        .tags(&[tag(LOAD), tag(FLOW)])
        .unwrap()
        .window(at(0), at(100))
        .fill_limit(0)
        .run()
        .await
        .unwrap();

    let slow = cells(&table, FLOW);
    assert_eq!(slow.iter().filter(|c| c.is_missing()).count(), 9);
    assert!(slow.iter().all(|c| !c.is_filled()));
}

#[tokio::test]
async fn default_fill_limit_covers_the_gap() {
    let strata = fast_and_slow();
    let table = strata
        .merge()
        .tags(&[tag(LOAD), tag(FLOW)])
        .unwrap()
        .window(at(0), at(100))
        .run()
        .await
        .unwrap();

    assert!(cells(&table, FLOW).iter().all(|c| !c.is_missing()));
}

#[tokio::test]
async fn columns_follow_caller_order() {
    let strata = fast_and_slow();
    let table = strata
        .merge()
        .add_tag(tag(FLOW))
        .unwrap()
        .add_tag(tag(LOAD))
        .unwrap()
        .window(at(0), at(100))
        .run()
        .await
        .unwrap();

    let labels: Vec<&str> = table.labels().collect();
    assert_eq!(labels, vec![FLOW, LOAD]);
    assert_eq!(table.axis(), TimeAxis::Calendar);
    assert!(table.is_strictly_ascending());
}

#[tokio::test]
async fn one_failed_tag_fails_the_merge() {
    let strata = fast_and_slow();
    let err = strata
        .merge()
        .tags(&[tag(LOAD), tag("MDSSCSC1.ANVCALC.MISSING")])
        .unwrap()
        .window(at(0), at(100))
        .run()
        .await
        .unwrap_err();
    assert_eq!(err, StrataError::invalid_tag("MDSSCSC1.ANVCALC.MISSING"));
}

#[tokio::test]
async fn input_errors_are_reported_before_fetching() {
    let strata = fast_and_slow();

    let err = strata.merge().window(at(0), at(10)).run().await.unwrap_err();
    assert!(matches!(err, StrataError::InvalidArg(_)));

    let err = strata.merge().tags(&[tag(LOAD), tag(LOAD)]).err().unwrap();
    assert!(matches!(err, StrataError::InvalidArg(_)));

    let err = strata
        .merge()
        .add_tag(tag(LOAD))
        .unwrap()
        .add_tag(tag(LOAD))
        .err()
        .unwrap();
    assert!(matches!(err, StrataError::InvalidArg(_)));

    let err = strata
        .merge()
        .tags(&[tag(LOAD)])
        .unwrap()
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, StrataError::InvalidWindow(_)));

    let err = strata
        .merge()
        .tags(&[tag(LOAD)])
        .unwrap()
        .window(at(100), at(100))
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, StrataError::InvalidWindow(_)));

    let err = strata
        .merge()
        .tags(&[tag(LOAD)])
        .unwrap()
        .window(at(0), at(100))
        .sampling_rate(TimeDelta::zero())
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, StrataError::InvalidWindow(_)));
}

#[tokio::test]
async fn sub_second_sampling_rate_is_rejected() {
    let c = Arc::new(MockConnector {
        name: "hist",
        records: Some(vec![rec(0, 1.0), rec(1, 2.0), rec(2, 3.0)]),
        ..Default::default()
    });
    let strata = Strata::builder().with_connector(c.clone()).build().unwrap();

    for ms in [500, 1_500] {
        let err = strata
            .merge()
            .tags(&[tag(LOAD)])
            .unwrap()
            .window(at(0), at(2))
            .sampling_rate(TimeDelta::milliseconds(ms))
            .utc(true)
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, StrataError::InvalidWindow(_)), "{ms}ms: {err:?}");
    }
    assert_eq!(c.history_calls(), 0);
}

#[tokio::test]
async fn sampling_rate_puts_every_column_on_one_grid() {
    let a = vec![rec(5, 1.0), rec(65, 2.0), rec(170, 3.0)];
    let b = vec![rec(30, 10.0), rec(200, 20.0)];
    let strata = Strata::builder()
        .with_connector(m_table("hist", vec![(LOAD, a), (FLOW, b)]))
        .build()
        .unwrap();

    let table = strata
        .merge()
        .tags(&[tag(LOAD), tag(FLOW)])
        .unwrap()
        .window(at(0), at(240))
        .sampling_rate(TimeDelta::seconds(60))
        .fill_limit(0)
        .utc(true)
        .run()
        .await
        .unwrap();

    let index: Vec<i64> = table.index().iter().map(|t| t.epoch_seconds()).collect();
    assert_eq!(index, vec![0, 60, 120, 180, 240]);
    assert_eq!(
        cells(&table, LOAD),
        vec![
            Cell::Missing,
            Cell::Observed(1.0),
            Cell::Observed(2.0),
            Cell::Observed(3.0),
            Cell::Missing,
        ]
    );
    assert_eq!(
        cells(&table, FLOW),
        vec![
            Cell::Missing,
            Cell::Observed(10.0),
            Cell::Missing,
            Cell::Missing,
            Cell::Observed(20.0),
        ]
    );
}

#[tokio::test]
async fn description_labels_and_report_warnings() {
    let c = Arc::new(MockConnector {
        name: "described",
        records: Some(vec![rec(10, 1.0), rec(20, 2.0)]),
        info_fn: Some(Arc::new(|t: &TagId| {
            if t.point() == "ADE1CA02" {
                Ok(info(t, "ADE1 Percent Load", "%"))
            } else {
                Err(StrataError::connection("described", "directory offline"))
            }
        })),
        ..Default::default()
    });
    let strata = Strata::builder().with_connector(c).build().unwrap();

    let (table, report) = strata
        .merge()
        .tags(&[tag(LOAD), tag(FLOW)])
        .unwrap()
        .window(at(0), at(60))
        .desc_as_label(true)
        .run_with_report()
        .await
        .unwrap();

    let labels: Vec<&str> = table.labels().collect();
    assert_eq!(labels, vec!["ADE1 Percent Load", FLOW]);
    assert_eq!(report.tags[0].label, "ADE1 Percent Load");
    assert_eq!(report.tags[0].observations, 2);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].is_connection());
}

#[tokio::test]
async fn window_accepts_historian_time_strings() {
    let strata = fast_and_slow();
    let table = strata
        .merge()
        .tags(&[tag(LOAD)])
        .unwrap()
        .window_str("01/01/70 00:00", "01/01/70 00:01:00", chrono_tz::UTC)
        .unwrap()
        .utc(true)
        .run()
        .await
        .unwrap();

    let index: Vec<i64> = table.index().iter().map(|t| t.epoch_seconds()).collect();
    assert_eq!(index, vec![0, 10, 20, 30, 40, 50, 60]);
}

#[tokio::test]
async fn report_survives_json() {
    let strata = fast_and_slow();
    let (_, report) = strata
        .merge()
        .tags(&[tag(LOAD), tag(FLOW)])
        .unwrap()
        .window(at(0), at(100))
        .fill_limit(2)
        .run_with_report()
        .await
        .unwrap();

    let json = serde_json::to_string(&report).unwrap();
    let back: strata::AlignmentReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
    assert_eq!(back.cells_filled(), 2);
}
