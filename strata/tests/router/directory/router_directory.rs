use std::sync::Arc;

use strata::{Capability, ServiceInfo, Status, Strata, StrataError};
use strata_mock::MockHistorian;

use crate::helpers::{CALC, LOAD, MockConnector, SCADA, SETPOINT, tag};

fn svc(name: &str, kind: &str) -> ServiceInfo {
    ServiceInfo {
        name: name.to_string(),
        description: String::new(),
        kind: kind.to_string(),
    }
}

fn listing(name: &'static str, services: Vec<ServiceInfo>) -> Arc<MockConnector> {
    Arc::new(MockConnector {
        name,
        services_fn: Some(Arc::new(move || Ok(services.clone()))),
        ..Default::default()
    })
}

#[tokio::test]
async fn services_are_the_union_across_connectors() {
    let a = listing("a", vec![svc(CALC, "SSERVER"), svc(SCADA, "SCADA")]);
    let b = listing("b", vec![svc(SCADA, "DUPLICATE"), svc("PLANT2.HIST", "HISTORY")]);
    let strata = Strata::builder()
        .with_connector(a)
        .with_connector(b)
        .build()
        .unwrap();

    let services = strata.services().await.unwrap();
    let names: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec![CALC, SCADA, "PLANT2.HIST"]);
    // first registration wins for a shared name
    assert_eq!(services[1].kind, "SCADA");
}

#[tokio::test]
async fn one_failing_directory_is_tolerated() {
    let ok = listing("ok", vec![svc(CALC, "SSERVER")]);
    let down = Arc::new(MockConnector {
        name: "down",
        services_fn: Some(Arc::new(|| {
            Err(StrataError::connection("down", "no route to host"))
        })),
        ..Default::default()
    });
    let strata = Strata::builder()
        .with_connector(down)
        .with_connector(ok)
        .build()
        .unwrap();

    let services = strata.services().await.unwrap();
    assert_eq!(services.len(), 1);
}

#[tokio::test]
async fn services_without_a_directory_is_unsupported() {
    let strata = Strata::builder()
        .with_connector(Arc::new(MockConnector {
            name: "history_only",
            records: Some(vec![]),
            ..Default::default()
        }))
        .build()
        .unwrap();

    let err = strata.services().await.unwrap_err();
    assert_eq!(err, StrataError::unsupported(Capability::Directory.as_str()));
}

#[tokio::test]
async fn points_on_a_known_service() {
    let strata = Strata::builder()
        .with_connector(Arc::new(MockHistorian::new()))
        .build()
        .unwrap();

    let points = strata.points(CALC).await.unwrap();
    assert!(points.iter().any(|p| p.tag == tag(LOAD)));
    assert!(points.iter().all(|p| p.tag.site_service() == CALC));

    let services = strata.services().await.unwrap();
    assert_eq!(services.len(), 2);
}

#[tokio::test]
async fn points_on_an_unknown_service_is_not_found() {
    let strata = Strata::builder()
        .with_connector(Arc::new(MockHistorian::new()))
        .build()
        .unwrap();

    let err = strata.points("MDSSCSC1.NOWHERE").await.unwrap_err();
    assert!(matches!(err, StrataError::NotFound { .. }));
}

#[tokio::test]
async fn snapshot_returns_the_latest_stored_value() {
    let strata = Strata::builder()
        .with_connector(Arc::new(MockHistorian::new()))
        .build()
        .unwrap();

    let snap = strata.snapshot(&tag(SETPOINT)).await.unwrap();
    assert_eq!(snap.value, Some(38.5));
    assert_eq!(snap.status, Status::good());
    assert_eq!(snap.units.as_deref(), Some("%"));

    let err = strata
        .snapshot(&tag("MDSSCSC1.ANVCALC.NOPE"))
        .await
        .unwrap_err();
    assert_eq!(err, StrataError::invalid_tag("MDSSCSC1.ANVCALC.NOPE"));
}

#[tokio::test]
async fn snapshot_falls_through_to_a_capable_connector() {
    let no_snap = Arc::new(MockConnector {
        name: "history_only",
        records: Some(vec![]),
        ..Default::default()
    });
    let strata = Strata::builder()
        .with_connector(no_snap)
        .with_connector(Arc::new(MockHistorian::new()))
        .build()
        .unwrap();

    let snap = strata.snapshot(&tag(SETPOINT)).await.unwrap();
    assert_eq!(snap.tag, tag(SETPOINT));
}

#[tokio::test]
async fn point_info_carries_description_and_units() {
    let strata = Strata::builder()
        .with_connector(Arc::new(MockHistorian::new()))
        .build()
        .unwrap();

    let info = strata.point_info(&tag(LOAD)).await.unwrap();
    assert_eq!(info.description.as_deref(), Some("ADE1 Percent Load"));
    assert_eq!(info.units.as_deref(), Some("%"));

    let err = strata.point_info(&tag("MDSSCSC1.SCADA.NOPE")).await.unwrap_err();
    assert_eq!(err, StrataError::invalid_tag("MDSSCSC1.SCADA.NOPE"));
}
