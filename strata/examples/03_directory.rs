use std::sync::Arc;

use strata::{HistorianConnector, RoutingPolicyBuilder, Strata, TagId};
use strata_mock::MockHistorian;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let historian = Arc::new(MockHistorian::new());
    let routing = RoutingPolicyBuilder::new()
        .providers_for_service("MDSSCSC1.SCADA", &[historian.key()])
        .build();

    let strata = Strata::builder()
        .with_connector(historian)
        .routing_policy(routing)
        .build()?;

    for svc in strata.services().await? {
        println!("{} [{}] {}", svc.name, svc.kind, svc.description);
        for p in strata.points(&svc.name).await? {
            println!(
                "    {:<32} {:<24} {}",
                p.tag.as_str(),
                p.description.as_deref().unwrap_or(""),
                p.units.as_deref().unwrap_or("")
            );
        }
    }

    let tag = TagId::parse("MDSSCSC1.ANVCALC.ADE1CA02")?;
    println!();
    println!("exists({tag}) = {}", strata.exists(&tag).await);
    println!(
        "exists(mdsscsc1.anvcalc.ade1ca02) = {}",
        strata.exists_str("mdsscsc1.anvcalc.ade1ca02").await
    );

    let snap = strata.snapshot(&tag).await?;
    println!("snapshot: {:?} at {} ({})", snap.value, snap.ts, snap.status.as_str());

    Ok(())
}
