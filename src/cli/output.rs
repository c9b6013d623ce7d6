//! Output formatting for one-shot commands.
//!
//! Supports two modes: human-readable tables (default) and JSON (--json).

use serde::Serialize;
use tabled::{Table, Tabled};

use crate::domain::{AnalysisEntry, MatchOdds};

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

/// One line of the odds board.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct OddsRow {
    #[tabled(rename = "Kickoff")]
    pub kickoff: String,
    #[tabled(rename = "Competition")]
    pub competition: String,
    #[tabled(rename = "Match")]
    pub fixture: String,
    #[tabled(rename = "1")]
    pub home: String,
    #[tabled(rename = "X")]
    pub draw: String,
    #[tabled(rename = "2")]
    pub away: String,
}

impl From<&MatchOdds> for OddsRow {
    fn from(m: &MatchOdds) -> Self {
        Self {
            kickoff: m.kickoff.clone(),
            competition: m.competition.clone(),
            fixture: m.title(),
            home: format!("{:.2}", m.odds.home),
            draw: format!("{:.2}", m.odds.draw),
            away: format!("{:.2}", m.odds.away),
        }
    }
}

/// Print a vec of Tabled + Serialize items in the chosen mode.
pub fn print_items<T: Tabled + Serialize>(items: &[T], mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Table => {
            if items.is_empty() {
                println!("(no results)");
            } else {
                let table = Table::new(items).to_string();
                println!("{table}");
            }
        }
        OutputMode::Json => {
            let json = serde_json::to_string_pretty(items)?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Plain-text report of one analysis run.
pub fn format_analysis(entry: &AnalysisEntry) -> String {
    let mut out = format!("{}\n", entry.title());

    match &entry.odds {
        Some(odds) => {
            out.push_str(&format!(
                "Odds{}: 1 {:.2} | X {:.2} | 2 {:.2}\n",
                if entry.odds_stale { " (cached)" } else { "" },
                odds.odds.home,
                odds.odds.draw,
                odds.odds.away
            ));
        }
        None => out.push_str("Odds: no odds data available for this match\n"),
    }
    if let Some(err) = &entry.odds_error {
        out.push_str(&format!("Odds refresh failed: {}\n", err));
    }

    match (&entry.prediction, &entry.prediction_error) {
        (Some(p), _) => {
            out.push_str(&format!(
                "Prediction: {}\n",
                p.outcome.describe(&p.home_team, &p.away_team)
            ));
            if let Some(c) = p.confidence {
                out.push_str(&format!("Confidence: {}%\n", c));
            }
            out.push_str(&format!("Risk: {}\n", p.risk));
            if let Some(bet) = &p.recommended_bet {
                out.push_str(&format!("Recommended bet: {}\n", bet));
            }
            out.push_str(&format!("\n{}\n", p.rationale));
        }
        (None, Some(err)) => out.push_str(&format!("Prediction unavailable: {}\n", err)),
        (None, None) => {}
    }
    out
}
