use std::sync::Arc;
use std::time::Duration;

use strata::{HistorianConnector, PullRequest, RoutingPolicyBuilder, Strata, StrataError};

use crate::helpers::{
    CALC, LOAD, MockConnector, at, m_fail, m_hist, m_table, rec, tag,
};

fn raw_request() -> PullRequest {
    PullRequest::builder(tag(LOAD))
        .window(at(0), at(1_000))
        .utc(true)
        .build()
        .unwrap()
}

fn values(series: &strata::TagSeries) -> Vec<Option<f64>> {
    series.observations().iter().map(|o| o.value).collect()
}

#[tokio::test]
async fn registration_order_decides_by_default() {
    let a = m_hist("a", &[(10, 1.0)]);
    let b = m_hist("b", &[(10, 2.0)]);
    let strata = Strata::builder()
        .with_connector(a.clone())
        .with_connector(b.clone())
        .build()
        .unwrap();

    let series = strata.fetch(&raw_request()).await.unwrap();
    assert_eq!(values(&series), vec![Some(1.0)]);
    assert_eq!(b.history_calls(), 0);
}

#[tokio::test]
async fn per_service_policy_reorders_connectors() {
    let a = m_hist("a", &[(10, 1.0)]);
    let b = m_hist("b", &[(10, 2.0)]);
    let policy = RoutingPolicyBuilder::new()
        .providers_for_service(CALC, &[b.key(), a.key()])
        .build();
    let strata = Strata::builder()
        .with_connector(a.clone())
        .with_connector(b.clone())
        .routing_policy(policy)
        .build()
        .unwrap();

    let series = strata.fetch(&raw_request()).await.unwrap();
    assert_eq!(values(&series), vec![Some(2.0)]);
    assert_eq!(a.history_calls(), 0);
}

#[tokio::test]
async fn strict_policy_excludes_unlisted_connectors() {
    let a = m_hist("a", &[(10, 1.0)]);
    let b = m_fail("b", StrataError::connection("b", "link down"));
    let policy = RoutingPolicyBuilder::new()
        .strict_for_service(CALC, &[b.key()])
        .build();
    let strata = Strata::builder()
        .with_connector(a.clone())
        .with_connector(b.clone())
        .routing_policy(policy)
        .build()
        .unwrap();

    let err = strata.fetch(&raw_request()).await.unwrap_err();
    assert!(err.is_connection());
    assert_eq!(a.history_calls(), 0);
}

#[tokio::test]
async fn unknown_tag_falls_through_to_next_connector() {
    let a = m_table::<&str>("a", vec![]);
    let b = m_hist("b", &[(10, 7.0)]);
    let strata = Strata::builder()
        .with_connector(a.clone())
        .with_connector(b)
        .build()
        .unwrap();

    let series = strata.fetch(&raw_request()).await.unwrap();
    assert_eq!(values(&series), vec![Some(7.0)]);
}

#[tokio::test]
async fn failure_falls_through_to_next_connector() {
    let a = m_fail("a", StrataError::connection("a", "link down"));
    let b = m_hist("b", &[(10, 7.0)]);
    let strata = Strata::builder()
        .with_connector(a.clone())
        .with_connector(b)
        .build()
        .unwrap();

    let series = strata.fetch(&raw_request()).await.unwrap();
    assert_eq!(values(&series), vec![Some(7.0)]);
    assert_eq!(a.history_calls(), 1);
}

#[tokio::test]
async fn every_connector_not_found_is_invalid_tag() {
    let a = m_fail("a", StrataError::invalid_tag(LOAD));
    let b = m_fail("b", StrataError::not_found(format!("point {LOAD}")));
    let strata = Strata::builder()
        .with_connector(a)
        .with_connector(b)
        .build()
        .unwrap();

    let err = strata.fetch(&raw_request()).await.unwrap_err();
    assert_eq!(err, StrataError::invalid_tag(LOAD));
}

#[tokio::test]
async fn mixed_failures_are_aggregated() {
    let a = m_fail("a", StrataError::connection("a", "link down"));
    let b = m_fail("b", StrataError::Data("garbled record".into()));
    let strata = Strata::builder()
        .with_connector(a)
        .with_connector(b)
        .build()
        .unwrap();

    let err = strata.fetch(&raw_request()).await.unwrap_err();
    match err {
        StrataError::AllConnectorsFailed(errs) => {
            assert_eq!(errs.len(), 2);
            assert!(errs[0].is_connection());
            // untagged errors are attributed to the connector
            assert!(matches!(&errs[1], StrataError::Connector { connector, .. } if connector == "b"));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn all_connectors_timing_out_is_reported() {
    let slow = |name| {
        Arc::new(MockConnector {
            name,
            delay_ms: 500,
            records: Some(vec![rec(10, 1.0)]),
            ..Default::default()
        })
    };
    let strata = Strata::builder()
        .with_connector(slow("a"))
        .with_connector(slow("b"))
        .provider_timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let err = strata.fetch(&raw_request()).await.unwrap_err();
    assert!(matches!(err, StrataError::AllConnectorsTimedOut { .. }));
    assert!(err.is_connection());
}

#[tokio::test]
async fn no_history_capability_is_unsupported() {
    let points_only = Arc::new(MockConnector {
        name: "points_only",
        exists_fn: Some(Arc::new(|_: &strata::TagId| Ok(true))),
        ..Default::default()
    });
    let strata = Strata::builder()
        .with_connector(points_only)
        .build()
        .unwrap();

    let err = strata.fetch(&raw_request()).await.unwrap_err();
    assert!(matches!(err, StrataError::Unsupported { .. }));
}

#[tokio::test]
async fn connector_not_serving_the_service_is_skipped() {
    let elsewhere = Arc::new(MockConnector {
        name: "elsewhere",
        services: Some(vec!["OTHER.SITE"]),
        records: Some(vec![rec(10, 1.0)]),
        ..Default::default()
    });
    let local = m_hist("local", &[(10, 2.0)]);
    let strata = Strata::builder()
        .with_connector(elsewhere.clone())
        .with_connector(local)
        .build()
        .unwrap();

    let series = strata.fetch(&raw_request()).await.unwrap();
    assert_eq!(values(&series), vec![Some(2.0)]);
    assert_eq!(elsewhere.history_calls(), 0);
}
