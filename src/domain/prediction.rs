//! AI prediction types and the parsing of free-text model answers.

use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use serde::{Deserialize, Serialize};

/// Predicted match result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictedOutcome {
    HomeWin,
    Draw,
    AwayWin,
    Unknown,
}

impl PredictedOutcome {
    pub fn describe(&self, home_team: &str, away_team: &str) -> String {
        match self {
            PredictedOutcome::HomeWin => format!("{} win", home_team),
            PredictedOutcome::Draw => "Draw".to_string(),
            PredictedOutcome::AwayWin => format!("{} win", away_team),
            PredictedOutcome::Unknown => "No clear call".to_string(),
        }
    }
}

/// Qualitative risk attached to a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Fallback when the model does not state a risk level
    pub fn from_confidence(confidence: Option<u8>) -> Self {
        match confidence {
            Some(c) if c >= 70 => RiskLevel::Low,
            Some(c) if c >= 50 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Home and away team for one analysis request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRequest {
    pub home_team: String,
    pub away_team: String,
}

impl MatchRequest {
    pub fn new(home_team: &str, away_team: &str) -> Self {
        Self {
            home_team: home_team.trim().to_string(),
            away_team: away_team.trim().to_string(),
        }
    }

    pub fn title(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }
}

/// Full output of the analysis chain for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub home_team: String,
    pub away_team: String,
    pub team_stats: String,
    pub sentiment_analysis: String,
    pub match_context: String,
    pub outcome: PredictedOutcome,
    /// Percent, 0..=100
    pub confidence: Option<u8>,
    pub risk: RiskLevel,
    pub recommended_bet: Option<String>,
    /// Final free-text answer
    pub rationale: String,
    pub generated_at: DateTime<Utc>,
}

/// Structured fields pulled out of the final answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub outcome: PredictedOutcome,
    pub confidence: Option<u8>,
    pub risk: RiskLevel,
    pub recommended_bet: Option<String>,
}

impl Verdict {
    pub fn parse(text: &str, home_team: &str, away_team: &str) -> Self {
        let confidence = parse_confidence(text);
        let risk = parse_risk(text).unwrap_or_else(|| RiskLevel::from_confidence(confidence));
        Self {
            outcome: parse_outcome(text, home_team, away_team),
            confidence,
            risk,
            recommended_bet: parse_recommended_bet(text),
        }
    }
}

/// Strip list markers and markdown emphasis from a line
fn clean_line(line: &str) -> String {
    line.trim()
        .trim_start_matches(|c: char| c == '-' || c == '*' || c == '#' || c == '•' || c == '>')
        .replace("**", "")
        .trim()
        .to_string()
}

fn value_after_colon(line: &str) -> Option<&str> {
    line.split_once(':')
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}

pub fn parse_outcome(text: &str, home_team: &str, away_team: &str) -> PredictedOutcome {
    let home = home_team.trim().to_lowercase();
    let away = away_team.trim().to_lowercase();

    let classify = |s: &str| -> PredictedOutcome {
        // (position, length, outcome); "Inter" and "Inter Miami" both hit at
        // the same position, the longer name wins
        let mut hits: Vec<(usize, usize, PredictedOutcome)> = Vec::new();
        if let Some(i) = s.find("draw") {
            hits.push((i, "draw".len(), PredictedOutcome::Draw));
        }
        if !home.is_empty() {
            if let Some(i) = s.find(&home) {
                hits.push((i, home.len(), PredictedOutcome::HomeWin));
            }
        }
        if !away.is_empty() {
            if let Some(i) = s.find(&away) {
                hits.push((i, away.len(), PredictedOutcome::AwayWin));
            }
        }
        hits.into_iter()
            .min_by_key(|(i, len, _)| (*i, Reverse(*len)))
            .map(|(_, _, o)| o)
            .unwrap_or(PredictedOutcome::Unknown)
    };

    // Labelled line first, e.g. "Predicted outcome: Liverpool win"
    for line in text.lines() {
        let cleaned = clean_line(line).to_lowercase();
        let labelled = ["predicted outcome", "prediction", "outcome", "result"]
            .iter()
            .any(|label| cleaned.starts_with(label));
        if !labelled {
            continue;
        }
        if let Some(value) = value_after_colon(&cleaned) {
            let outcome = classify(value);
            if outcome != PredictedOutcome::Unknown {
                return outcome;
            }
        }
    }

    classify(&text.to_lowercase())
}

/// First percentage in a confidence line, else the first percentage anywhere
pub fn parse_confidence(text: &str) -> Option<u8> {
    text.lines()
        .filter(|l| l.to_lowercase().contains("confidence"))
        .find_map(first_percentage)
        .or_else(|| first_percentage(text))
}

fn first_percentage(s: &str) -> Option<u8> {
    let chars: Vec<char> = s.chars().collect();
    for (idx, c) in chars.iter().enumerate() {
        if *c != '%' {
            continue;
        }
        let mut start = idx;
        while start > 0 && (chars[start - 1].is_ascii_digit() || chars[start - 1] == '.') {
            start -= 1;
        }
        let number: String = chars[start..idx].iter().collect();
        if let Ok(value) = number.trim_start_matches('.').parse::<f64>() {
            if (0.0..=100.0).contains(&value) {
                return Some(value.round() as u8);
            }
        }
    }
    None
}

/// Explicit risk wording: a "Risk level: moderate" line, else "high risk"
/// / "low-risk" anywhere. Whole words only.
pub fn parse_risk(text: &str) -> Option<RiskLevel> {
    let labelled = text.lines().find_map(|line| {
        let line = clean_line(line).to_lowercase();
        if !(line.starts_with("risk level") || line.starts_with("risk:")) {
            return None;
        }
        value_after_colon(&line).and_then(|v| words(v).find_map(risk_word))
    });

    labelled.or_else(|| {
        text.lines().find_map(|line| {
            let lower = line.to_lowercase();
            let tokens: Vec<&str> = words(&lower).collect();
            tokens
                .windows(2)
                .find_map(|w| if w[1] == "risk" { risk_word(w[0]) } else { None })
        })
    })
}

fn words<'a>(s: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}

fn risk_word(word: &str) -> Option<RiskLevel> {
    match word {
        "low" => Some(RiskLevel::Low),
        "medium" | "moderate" => Some(RiskLevel::Medium),
        "high" => Some(RiskLevel::High),
        _ => None,
    }
}

pub fn parse_recommended_bet(text: &str) -> Option<String> {
    text.lines().map(clean_line).find_map(|line| {
        let lower = line.to_lowercase();
        if lower.starts_with("recommended bet") || lower.starts_with("recommendation") {
            value_after_colon(&line).map(|v| v.to_string())
        } else {
            None
        }
    })
}
