use std::sync::Arc;

use chrono::TimeDelta;
use strata::{PullMode, PullRequest, RawObservation, RetrievalQuery, Strata, StrataError, TimeAxis, Timestamp};
use strata_core::TagId;

use crate::helpers::{LOAD, MockConnector, at, info, m_fail, m_hist, rec, tag};

fn strata_with(c: Arc<MockConnector>) -> Strata {
    Strata::builder().with_connector(c).build().unwrap()
}

#[tokio::test]
async fn raw_is_clipped_to_window_and_deduplicated() {
    let c = m_hist(
        "hist",
        &[(50, 0.0), (100, 1.0), (500, 2.0), (500, 3.0), (1_000, 4.0), (1_001, 5.0)],
    );
    let strata = strata_with(c);
    let req = PullRequest::builder(tag(LOAD))
        .window(at(100), at(1_000))
        .utc(true)
        .build()
        .unwrap();

    let series = strata.fetch(&req).await.unwrap();
    let got: Vec<(i64, Option<f64>)> = series
        .observations()
        .iter()
        .map(|o| (o.ts.epoch_seconds(), o.value))
        .collect();
    assert_eq!(got, vec![(100, Some(1.0)), (500, Some(3.0)), (1_000, Some(4.0))]);
    assert_eq!(series.duplicates_collapsed(), 1);
    assert_eq!(series.mode(), PullMode::Raw);
}

#[tokio::test]
async fn fractional_start_excludes_the_second_it_falls_in() {
    let c = m_hist("hist", &[(10, 1.0), (15, 2.0)]);
    let strata = strata_with(c);
    let req = PullRequest::builder(tag(LOAD))
        .window(at(10) + TimeDelta::milliseconds(500), at(20))
        .utc(true)
        .build()
        .unwrap();

    let series = strata.fetch(&req).await.unwrap();
    let ts: Vec<i64> = series.timestamps().map(|t| t.epoch_seconds()).collect();
    assert_eq!(ts, vec![15]);
}

#[tokio::test]
async fn out_of_order_records_are_sorted() {
    let c = m_hist("hist", &[(30, 3.0), (10, 1.0), (20, 2.0)]);
    let strata = strata_with(c);
    let req = PullRequest::builder(tag(LOAD))
        .window(at(0), at(100))
        .build()
        .unwrap();

    let series = strata.fetch(&req).await.unwrap();
    let ts: Vec<i64> = series.timestamps().map(|t| t.epoch_seconds()).collect();
    assert_eq!(ts, vec![10, 20, 30]);
}

#[tokio::test]
async fn utc_flag_selects_time_axis() {
    let c = m_hist("hist", &[(10, 1.0), (20, 2.0)]);
    let strata = strata_with(c);
    let base = PullRequest::builder(tag(LOAD)).window(at(0), at(100));

    let epoch = strata.fetch(&base.clone().utc(true).build().unwrap()).await.unwrap();
    let calendar = strata.fetch(&base.utc(false).build().unwrap()).await.unwrap();

    assert_eq!(epoch.axis(), TimeAxis::Epoch);
    assert_eq!(calendar.axis(), TimeAxis::Calendar);
    assert!(matches!(epoch.observations()[0].ts, Timestamp::Epoch(10)));
    assert!(matches!(calendar.observations()[0].ts, Timestamp::Calendar(_)));
    // same instants either way
    for (e, c) in epoch.observations().iter().zip(calendar.observations()) {
        assert_eq!(e.ts, c.ts);
    }
}

#[tokio::test]
async fn request_fields_reach_the_binding() {
    let seen: Arc<std::sync::Mutex<Vec<RetrievalQuery>>> = Arc::default();
    let log = Arc::clone(&seen);
    let c = Arc::new(MockConnector {
        name: "logging",
        history_fn: Some(Arc::new(move |q: &RetrievalQuery| {
            log.lock().unwrap().push(q.clone());
            Ok(Vec::<RawObservation>::new())
        })),
        ..Default::default()
    });
    let strata = strata_with(c);
    let req = PullRequest::builder(tag(LOAD))
        .window(at(0), at(3_600))
        .mode(PullMode::Average)
        .period_str("00:15:00")
        .unwrap()
        .high_speed(true)
        .build()
        .unwrap();

    let series = strata.fetch(&req).await.unwrap();
    assert!(series.is_empty());
    let q = seen.lock().unwrap()[0].clone();
    assert_eq!(q.mode, PullMode::Average);
    assert_eq!(q.period.map(|p| p.num_seconds()), Some(900));
    assert!(q.high_speed);
}

#[tokio::test]
async fn connector_lacking_mode_is_skipped() {
    let raw_only = Arc::new(MockConnector {
        name: "raw_only",
        modes: &[PullMode::Raw],
        records: Some(vec![rec(60, 1.0)]),
        ..Default::default()
    });
    let strata = strata_with(raw_only.clone());
    let req = PullRequest::builder(tag(LOAD))
        .window(at(0), at(600))
        .mode(PullMode::Snap)
        .period_str("00:01:00")
        .unwrap()
        .build()
        .unwrap();

    let err = strata.fetch(&req).await.unwrap_err();
    assert!(matches!(err, StrataError::Unsupported { .. }));
    assert_eq!(raw_only.history_calls(), 0);
}

#[tokio::test]
async fn connection_loss_is_an_error_not_an_empty_series() {
    let strata = strata_with(m_fail("down", StrataError::connection("down", "socket reset")));
    let req = PullRequest::builder(tag(LOAD))
        .window(at(0), at(600))
        .build()
        .unwrap();

    let err = strata.fetch(&req).await.unwrap_err();
    assert!(err.is_connection());
}

#[tokio::test]
async fn empty_window_yields_empty_series() {
    let strata = strata_with(m_hist("hist", &[(5_000, 1.0)]));
    let req = PullRequest::builder(tag(LOAD))
        .window(at(0), at(600))
        .build()
        .unwrap();

    let series = strata.fetch(&req).await.unwrap();
    assert!(series.is_empty());
}

fn described(name: &'static str) -> Arc<MockConnector> {
    Arc::new(MockConnector {
        name,
        records: Some(vec![rec(10, 1.0)]),
        info_fn: Some(Arc::new(|t: &TagId| Ok(info(t, "ADE1 Percent Load", "%")))),
        ..Default::default()
    })
}

#[tokio::test]
async fn label_defaults_to_tag_name() {
    let strata = strata_with(described("d"));
    let req = PullRequest::builder(tag(LOAD))
        .window(at(0), at(60))
        .build()
        .unwrap();

    let series = strata.fetch(&req).await.unwrap();
    assert_eq!(series.label(), LOAD);
    assert_eq!(series.description(), Some("ADE1 Percent Load"));
    assert_eq!(series.units(), Some("%"));
}

#[tokio::test]
async fn description_label_when_requested() {
    let strata = strata_with(described("d"));
    let req = PullRequest::builder(tag(LOAD))
        .window(at(0), at(60))
        .desc_as_label(true)
        .build()
        .unwrap();

    let series = strata.fetch(&req).await.unwrap();
    assert_eq!(series.label(), "ADE1 Percent Load");
}

#[tokio::test]
async fn explicit_label_overrides_description() {
    let strata = strata_with(described("d"));
    let req = PullRequest::builder(tag(LOAD))
        .window(at(0), at(60))
        .desc_as_label(true)
        .label("Unit 1 Load")
        .build()
        .unwrap();

    let series = strata.fetch(&req).await.unwrap();
    assert_eq!(series.label(), "Unit 1 Load");
}

#[tokio::test]
async fn description_label_falls_back_to_tag_name() {
    let strata = strata_with(m_hist("plain", &[(10, 1.0)]));
    let req = PullRequest::builder(tag(LOAD))
        .window(at(0), at(60))
        .desc_as_label(true)
        .build()
        .unwrap();

    let series = strata.fetch(&req).await.unwrap();
    assert_eq!(series.label(), LOAD);
    assert_eq!(series.description(), None);
}

#[tokio::test]
async fn metadata_failure_does_not_fail_fetch() {
    let c = Arc::new(MockConnector {
        name: "flaky_meta",
        records: Some(vec![rec(10, 1.0)]),
        info_fn: Some(Arc::new(|_: &TagId| {
            Err(StrataError::connection("flaky_meta", "directory offline"))
        })),
        ..Default::default()
    });
    let strata = strata_with(c);
    let req = PullRequest::builder(tag(LOAD))
        .window(at(0), at(60))
        .desc_as_label(true)
        .build()
        .unwrap();

    let series = strata.fetch(&req).await.unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series.label(), LOAD);
}
