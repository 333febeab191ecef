use std::sync::Arc;

use strata::{PullMode, PullRequest, Strata, TagId};
use strata_mock::MockHistorian;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 1. Register the in-memory historian.
    let strata = Strata::builder()
        .with_connector(Arc::new(MockHistorian::new()))
        .build()?;

    // 2. Ask for one value per minute over the first ten minutes of the fixture day.
    let tag = TagId::parse("MDSSCSC1.ANVCALC.ADE1SP01")?;
    let req = PullRequest::builder(tag)
        .window_str("12/01/16 00:00", "12/01/16 00:10", chrono_tz::UTC)?
        .mode(PullMode::Snap)
        .period_str("00:01:00")?
        .desc_as_label(true)
        .build()?;

    // 3. Fetch. Unknown tags fail here instead of returning an empty series.
    let series = strata.fetch(&req).await?;

    println!(
        "{} ({}), {} values",
        series.label(),
        series.units().unwrap_or("-"),
        series.len()
    );
    for obs in series.observations() {
        println!("  {}  {:?}  {}", obs.ts, obs.value, obs.status.as_str());
    }

    Ok(())
}
