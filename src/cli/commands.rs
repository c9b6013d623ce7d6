use crate::cli::output::{format_analysis, print_items, OddsRow, OutputMode};
use crate::services::{AnalysisService, SnapshotOrigin};
use tracing::info;

/// `matchday odds`
pub async fn run_odds(service: &AnalysisService, force: bool, json: bool) -> anyhow::Result<()> {
    let outcome = service.refresh_odds(force).await?;
    if outcome.origin == SnapshotOrigin::Cache {
        info!("Serving odds captured at {}", outcome.snapshot.captured_at);
    }

    let rows: Vec<OddsRow> = outcome.snapshot.matches.iter().map(OddsRow::from).collect();
    print_items(&rows, OutputMode::from_json_flag(json))
}

/// `matchday analyze`
pub async fn run_analyze(
    service: &AnalysisService,
    home: &str,
    away: &str,
    force: bool,
    json: bool,
) -> anyhow::Result<()> {
    let entry = service.analyze(home, away, force).await?;
    match OutputMode::from_json_flag(json) {
        OutputMode::Json => println!("{}", serde_json::to_string_pretty(&entry)?),
        OutputMode::Table => print!("{}", format_analysis(&entry)),
    }
    Ok(())
}
