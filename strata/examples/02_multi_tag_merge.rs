use std::sync::Arc;

use chrono::TimeDelta;
use strata::{Strata, TagId};
use strata_mock::MockHistorian;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let strata = Strata::builder()
        .with_connector(Arc::new(MockHistorian::new()))
        .fetch_concurrency(4)
        .request_timeout(std::time::Duration::from_secs(10))
        .build()?;

    // Tags with very different cadences: 60 s, 300 s, change-only and 10 s.
    let tags = [
        "MDSSCSC1.ANVCALC.ADE1CA02",
        "MDSSCSC1.ANVCALC.ADE1CA03",
        "MDSSCSC1.ANVCALC.ADE1SP01",
        "MDSSCSC1.SCADA.PUMP01",
    ]
    .into_iter()
    .map(TagId::parse)
    .collect::<Result<Vec<_>, _>>()?;

    let (table, report) = strata
        .merge()
        .tags(&tags)?
        .window_str("12/01/16 00:00", "12/01/16 01:00", chrono_tz::UTC)?
        .sampling_rate(TimeDelta::minutes(1))
        .fill_limit(5)
        .desc_as_label(true)
        .run_with_report()
        .await?;

    let header: Vec<&str> = table.labels().collect();
    println!("time | {}", header.join(" | "));
    for (row, ts) in table.index().iter().enumerate().take(12) {
        let cells: Vec<String> = (0..table.width())
            .map(|col| match table.cell(row, col).and_then(|c| c.value()) {
                Some(v) => format!("{v:.1}"),
                None => "-".to_string(),
            })
            .collect();
        println!("{ts} | {}", cells.join(" | "));
    }

    println!();
    println!(
        "{} rows, {} cells filled, {} duplicate rows collapsed",
        report.rows,
        report.cells_filled(),
        report.duplicate_rows_collapsed
    );
    for t in &report.tags {
        println!(
            "  {:<20} obs={:<4} dup={:<3} step={:?}s missing={}",
            t.label, t.observations, t.duplicates_collapsed, t.estimated_step_seconds, t.cells_missing
        );
    }

    Ok(())
}
