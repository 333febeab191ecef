use std::sync::Arc;
use std::time::Duration;

use strata::{PointInfo, Strata, StrataError, TagId};
use strata_mock::MockHistorian;

use crate::helpers::{CALC, FLOW, LOAD, MockConnector, m_table, rec, tag};

fn historian() -> Strata {
    Strata::builder()
        .with_connector(Arc::new(MockHistorian::new()))
        .build()
        .unwrap()
}

#[tokio::test]
async fn registered_point_exists() {
    let strata = historian();
    assert!(strata.exists(&tag(LOAD)).await);
    assert!(strata.exists_str("MDSSCSC1.SCADA.PUMP01").await);
}

#[tokio::test]
async fn unregistered_point_does_not_exist() {
    let strata = historian();
    assert!(!strata.exists(&tag("MDSSCSC1.ANVCALC.NOPE")).await);
    assert!(!strata.exists(&tag("MDSSCSC1.OTHER.ADE1CA02")).await);
}

#[tokio::test]
async fn matching_is_exact() {
    let strata = historian();
    assert!(!strata.exists_str("mdsscsc1.anvcalc.ade1ca02").await);
    assert!(!strata.exists_str(" MDSSCSC1.ANVCALC.ADE1CA02").await);
    assert!(!strata.exists_str("MDSSCSC1.ANVCALC.ADE1CA02 ").await);
}

#[tokio::test]
async fn malformed_identifiers_do_not_exist() {
    let strata = historian();
    assert!(!strata.exists_str("").await);
    assert!(!strata.exists_str(CALC).await);
    assert!(!strata.exists_str("MDSSCSC1..ADE1CA02").await);
}

#[tokio::test]
async fn directory_listing_answers_without_a_point_provider() {
    let listed = Arc::new(MockConnector {
        name: "dir",
        points_fn: Some(Arc::new(|svc: &str| -> Result<Vec<PointInfo>, StrataError> {
            Ok(vec![PointInfo {
                tag: TagId::parse(format!("{svc}.ADE1CA02"))?,
                description: None,
                units: None,
            }])
        })),
        ..Default::default()
    });
    let strata = Strata::builder().with_connector(listed).build().unwrap();

    assert!(strata.exists(&tag(LOAD)).await);
    assert!(!strata.exists(&tag(FLOW)).await);
}

#[tokio::test]
async fn unreachable_historian_reports_absent() {
    let down = Arc::new(MockConnector {
        name: "down",
        exists_fn: Some(Arc::new(|_: &TagId| {
            Err(StrataError::connection("down", "socket closed"))
        })),
        ..Default::default()
    });
    let strata = Strata::builder().with_connector(down).build().unwrap();
    assert!(!strata.exists(&tag(LOAD)).await);
}

#[tokio::test(start_paused = true)]
async fn slow_lookup_times_out_to_absent() {
    let slow = Arc::new(MockConnector {
        name: "slow",
        delay_ms: 500,
        exists_fn: Some(Arc::new(|_: &TagId| Ok(true))),
        ..Default::default()
    });
    let strata = Strata::builder()
        .with_connector(slow)
        .provider_timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    assert!(!strata.exists(&tag(LOAD)).await);
}

#[tokio::test]
async fn second_connector_can_confirm_a_point() {
    let empty = m_table::<&str>("empty", vec![]);
    let full = m_table("full", vec![(LOAD, vec![rec(0, 1.0)])]);
    let strata = Strata::builder()
        .with_connector(empty)
        .with_connector(full)
        .build()
        .unwrap();
    assert!(strata.exists(&tag(LOAD)).await);
    assert!(!strata.exists(&tag(FLOW)).await);
}

#[tokio::test]
async fn connector_without_lookup_is_not_proof_of_absence() {
    let blind = Arc::new(MockConnector {
        name: "blind",
        records: Some(vec![rec(0, 1.0)]),
        ..Default::default()
    });
    let strata = Strata::builder().with_connector(blind).build().unwrap();
    assert!(!strata.exists(&tag(LOAD)).await);
}
