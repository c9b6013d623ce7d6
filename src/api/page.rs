//! Server-rendered dashboard page.
//!
//! Layout: sidebar form on the left, match analysis in the wide column,
//! odds comparison and the cached board in the narrow one.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt::Write;

use crate::api::types::{FormState, Notice, NoticeLevel};
use crate::domain::{AnalysisEntry, MatchOdds, OddsSnapshot, Outcome, Prediction, RiskLevel};

const BAR_COLORS: [&str; 3] = ["#1f77b4", "#ff7f0e", "#2ca02c"];
const CHART_HEIGHT_PX: u32 = 160;

/// Everything the page needs for one render
#[derive(Debug, Clone, Default)]
pub struct PageView {
    pub form: FormState,
    pub notice: Option<Notice>,
    pub snapshot: Option<OddsSnapshot>,
    pub latest: Option<AnalysisEntry>,
    pub history: Vec<AnalysisEntry>,
    pub predictor_configured: bool,
}

pub fn render(view: &PageView) -> String {
    let mut html = String::with_capacity(16 * 1024);
    html.push_str(HEAD);

    html.push_str("<h1>⚽ AI Football Betting Assistant</h1><hr>");
    html.push_str("<div class=\"layout\">");
    render_sidebar(&mut html, view);

    html.push_str("<main>");
    if let Some(notice) = &view.notice {
        render_notice(&mut html, notice);
    }
    if !view.predictor_configured {
        html.push_str(
            "<div class=\"banner error\">PPLX_API_KEY is not set: odds are available, \
             AI predictions are disabled.</div>",
        );
    }

    html.push_str("<div class=\"columns\"><section class=\"wide\">");
    html.push_str("<h2>Match Analysis</h2>");
    match &view.latest {
        Some(entry) => render_analysis(&mut html, entry),
        None => html.push_str("<p class=\"muted\">Pick two teams and press Analyze Match.</p>"),
    }
    html.push_str("</section><section class=\"narrow\">");
    html.push_str("<h2>Live Odds Comparison</h2>");
    render_odds_panel(&mut html, view.latest.as_ref());
    html.push_str("</section></div>");

    render_snapshot(&mut html, view.snapshot.as_ref());
    render_history(&mut html, &view.history);

    html.push_str("</main></div></body></html>");
    html
}

fn render_sidebar(html: &mut String, view: &PageView) {
    let _ = write!(
        html,
        "<aside><h3>Match Parameters</h3>\
         <form method=\"post\" action=\"/analyze\">\
         <label>Home Team<input name=\"home_team\" value=\"{}\" required></label>\
         <label>Away Team<input name=\"away_team\" value=\"{}\" required></label>\
         <label class=\"inline\"><input type=\"checkbox\" name=\"force_refresh\" value=\"on\"> Force odds refresh</label>\
         <button type=\"submit\">Analyze Match</button></form>\
         <form method=\"post\" action=\"/refresh\"><button type=\"submit\" class=\"secondary\">Refresh odds</button></form>\
         </aside>",
        escape_html(&view.form.home_team),
        escape_html(&view.form.away_team),
    );
}

fn render_notice(html: &mut String, notice: &Notice) {
    let class = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Error => "error",
    };
    let _ = write!(
        html,
        "<div class=\"banner {}\">{}</div>",
        class,
        escape_html(&notice.message)
    );
}

fn render_analysis(html: &mut String, entry: &AnalysisEntry) {
    let _ = write!(
        html,
        "<p class=\"muted\">{} &middot; requested {}</p>",
        escape_html(&entry.title()),
        format_time(entry.requested_at)
    );

    let Some(prediction) = &entry.prediction else {
        let reason = entry
            .prediction_error
            .as_deref()
            .unwrap_or("no prediction available");
        let _ = write!(
            html,
            "<div class=\"banner error\">Prediction unavailable: {}</div>",
            escape_html(reason)
        );
        return;
    };

    render_verdict(html, prediction);
    render_section(html, "Team Statistics", &prediction.team_stats, true);
    render_section(html, "Sentiment Analysis", &prediction.sentiment_analysis, false);
    render_section(html, "Match Context", &prediction.match_context, false);
    render_section(html, "AI Prediction", &prediction.rationale, false);
}

fn render_verdict(html: &mut String, prediction: &Prediction) {
    let risk_class = match prediction.risk {
        RiskLevel::Low => "risk-low",
        RiskLevel::Medium => "risk-medium",
        RiskLevel::High => "risk-high",
    };
    let confidence = prediction
        .confidence
        .map(|c| format!("{}%", c))
        .unwrap_or_else(|| "n/a".to_string());

    let _ = write!(
        html,
        "<div class=\"verdict\">\
         <div class=\"metric\"><span>Predicted outcome</span><strong>{}</strong></div>\
         <div class=\"metric\"><span>Confidence</span><strong>{}</strong></div>\
         <div class=\"metric\"><span>Risk</span><strong class=\"{}\">{}</strong></div>",
        escape_html(
            &prediction
                .outcome
                .describe(&prediction.home_team, &prediction.away_team)
        ),
        confidence,
        risk_class,
        prediction.risk,
    );
    if let Some(bet) = &prediction.recommended_bet {
        let _ = write!(
            html,
            "<div class=\"metric\"><span>Recommended bet</span><strong>{}</strong></div>",
            escape_html(bet)
        );
    }
    html.push_str("</div>");
}

fn render_section(html: &mut String, title: &str, body: &str, open: bool) {
    let _ = write!(
        html,
        "<details{}><summary>{}</summary><pre>{}</pre></details>",
        if open { " open" } else { "" },
        title,
        escape_html(body)
    );
}

fn render_odds_panel(html: &mut String, latest: Option<&AnalysisEntry>) {
    let Some(entry) = latest else {
        html.push_str("<p class=\"info-box\">No odds data available for this match</p>");
        return;
    };

    if let Some(err) = &entry.odds_error {
        let _ = write!(
            html,
            "<div class=\"banner error\">Odds refresh failed: {}</div>",
            escape_html(err)
        );
    }

    let Some(odds) = &entry.odds else {
        html.push_str("<p class=\"info-box\">No odds data available for this match</p>");
        return;
    };

    if entry.odds_stale {
        let when = entry
            .snapshot_captured_at
            .map(format_time)
            .unwrap_or_default();
        let _ = write!(
            html,
            "<p class=\"muted\">Showing cached odds from {}</p>",
            when
        );
    }

    render_metrics(html, odds);
    render_chart(html, odds);
}

/// Labels follow the bookmaker's listing, which may be the reverse of
/// the order the teams were typed in
fn render_metrics(html: &mut String, odds: &MatchOdds) {
    html.push_str("<div class=\"metrics\">");
    let labels = [
        format!("{} Win", odds.home_team),
        "Draw".to_string(),
        format!("{} Win", odds.away_team),
    ];
    for ((_, price), label) in odds.odds.iter().zip(labels.iter()) {
        let _ = write!(
            html,
            "<div class=\"metric\"><span>{}</span><strong>{}</strong></div>",
            escape_html(label),
            format_odds(price)
        );
    }
    html.push_str("</div>");

    let fav = odds.odds.favourite();
    let _ = write!(
        html,
        "<p class=\"muted\">{} &middot; {} &middot; favourite: {} &middot; margin {}%</p>",
        escape_html(&odds.competition),
        escape_html(&odds.kickoff),
        fav.label(),
        (odds.odds.overround() * Decimal::from(100)).round_dp(1)
    );
}

fn render_chart(html: &mut String, odds: &MatchOdds) {
    let max = odds
        .odds
        .iter()
        .map(|(_, p)| p)
        .max()
        .unwrap_or(Decimal::ONE)
        .max(Decimal::ONE);

    html.push_str("<div class=\"chart\" title=\"Live Odds Comparison\">");
    for (idx, (outcome, price)) in odds.odds.iter().enumerate() {
        let height = bar_height(price, max);
        let _ = write!(
            html,
            "<div class=\"bar-wrap\"><div class=\"bar\" style=\"height:{}px;background:{}\"></div>\
             <span>{}</span></div>",
            height,
            BAR_COLORS[idx % BAR_COLORS.len()],
            outcome_label(outcome)
        );
    }
    html.push_str("</div>");
}

fn bar_height(price: Decimal, max: Decimal) -> u32 {
    if max <= Decimal::ZERO || price <= Decimal::ZERO {
        return 0;
    }
    let ratio = (price / max).min(Decimal::ONE);
    (ratio * Decimal::from(CHART_HEIGHT_PX)).round().to_u32().unwrap_or(0)
}

fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Home => "Home",
        Outcome::Draw => "Draw",
        Outcome::Away => "Away",
    }
}

fn render_snapshot(html: &mut String, snapshot: Option<&OddsSnapshot>) {
    html.push_str("<section><h2>Cached Odds Board</h2>");
    let Some(snapshot) = snapshot else {
        html.push_str("<p class=\"muted\">No cached odds yet. Press Refresh odds.</p></section>");
        return;
    };

    let _ = write!(
        html,
        "<p class=\"muted\">{} matches captured {}</p>",
        snapshot.matches.len(),
        format_time(snapshot.captured_at)
    );
    html.push_str(
        "<table><thead><tr><th>Kickoff</th><th>Competition</th><th>Match</th>\
         <th>1</th><th>X</th><th>2</th></tr></thead><tbody>",
    );
    for m in &snapshot.matches {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&m.kickoff),
            escape_html(&m.competition),
            escape_html(&m.title()),
            format_odds(m.odds.home),
            format_odds(m.odds.draw),
            format_odds(m.odds.away),
        );
    }
    html.push_str("</tbody></table></section>");
}

fn render_history(html: &mut String, history: &[AnalysisEntry]) {
    if history.len() < 2 {
        return;
    }
    html.push_str("<section><h2>Earlier Analyses</h2><ul class=\"history\">");
    for entry in history.iter().rev().skip(1) {
        let summary = match &entry.prediction {
            Some(p) => format!(
                "{} ({} risk)",
                p.outcome.describe(&p.home_team, &p.away_team),
                p.risk
            ),
            None => "no prediction".to_string(),
        };
        let _ = write!(
            html,
            "<li>{} &middot; {} &middot; {}</li>",
            format_time(entry.requested_at),
            escape_html(&entry.title()),
            escape_html(&summary)
        );
    }
    html.push_str("</ul></section>");
}

fn format_odds(price: Decimal) -> String {
    format!("{:.2}", price)
}

fn format_time(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en"><head><meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>AI Football Betting Assistant</title>
<style>
body{font-family:system-ui,sans-serif;margin:0 1.5rem;color:#222}
.layout{display:flex;gap:1.5rem}
aside{width:16rem;flex-shrink:0;background:#f4f5f7;padding:1rem;border-radius:6px;height:fit-content}
aside label{display:block;margin-bottom:.75rem;font-size:.9rem}
aside label.inline{display:flex;gap:.4rem;align-items:center}
aside input[name]{display:block;width:100%;padding:.4rem;margin-top:.2rem;box-sizing:border-box}
button{width:100%;padding:.5rem;margin-top:.5rem;background:#ff4b4b;color:#fff;border:0;border-radius:4px;cursor:pointer}
button.secondary{background:#555}
main{flex:1;min-width:0}
.columns{display:flex;gap:1.5rem}
.wide{flex:2}.narrow{flex:1}
.banner{padding:.6rem .8rem;border-radius:4px;margin:.5rem 0}
.banner.info{background:#e7f3fe;color:#0b4f8a}
.banner.error{background:#fdecea;color:#8a1c1c}
.info-box{background:#e7f3fe;padding:.6rem;border-radius:4px}
.muted{color:#777;font-size:.85rem}
.metrics,.verdict{display:flex;gap:1rem;flex-wrap:wrap;margin:.5rem 0}
.metric span{display:block;font-size:.8rem;color:#666}
.metric strong{font-size:1.4rem}
.risk-low{color:#2ca02c}.risk-medium{color:#ff7f0e}.risk-high{color:#d62728}
details{border:1px solid #ddd;border-radius:4px;margin:.5rem 0;padding:.4rem .8rem}
summary{cursor:pointer;font-weight:600}
pre{white-space:pre-wrap;font-family:inherit}
.chart{display:flex;align-items:flex-end;gap:1rem;height:180px;border-bottom:1px solid #ccc;padding:0 .5rem}
.bar-wrap{flex:1;text-align:center;font-size:.8rem}
.bar{width:100%;border-radius:3px 3px 0 0}
table{border-collapse:collapse;width:100%;font-size:.9rem}
th,td{border-bottom:1px solid #eee;padding:.3rem .5rem;text-align:left}
.history{font-size:.9rem}
</style></head><body>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MatchOdds, MatchRequest, OutcomeOdds};
    use rust_decimal_macros::dec;

    fn odds() -> MatchOdds {
        MatchOdds::new(
            "Manchester City",
            "Liverpool",
            OutcomeOdds {
                home: dec!(2.1),
                draw: dec!(3.4),
                away: dec!(3.25),
            },
            "Sat 17:30",
            "Premier League",
        )
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"Spurs\" & 'Gunners'</b>"),
            "&lt;b&gt;&quot;Spurs&quot; &amp; &#39;Gunners&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_empty_page_shows_defaults() {
        let html = render(&PageView::default());
        assert!(html.contains("value=\"Manchester City\""));
        assert!(html.contains("No odds data available for this match"));
        assert!(html.contains("No cached odds yet"));
        assert!(html.contains("PPLX_API_KEY is not set"));
    }

    #[test]
    fn test_odds_shown_when_prediction_failed() {
        let mut entry = AnalysisEntry::new(&MatchRequest::new("Manchester City", "Liverpool"));
        entry.odds = Some(odds());
        entry.prediction_error = Some("Prediction service rate limited the request".into());

        let view = PageView {
            latest: Some(entry),
            predictor_configured: true,
            ..PageView::default()
        };
        let html = render(&view);
        assert!(html.contains("Prediction unavailable"));
        assert!(html.contains("Manchester City Win"));
        assert!(html.contains("<strong>2.10</strong>"));
        assert!(html.contains("<strong>3.25</strong>"));
        assert!(!html.contains("PPLX_API_KEY is not set"));
    }

    #[test]
    fn test_reversed_fixture_keeps_prices_with_their_teams() {
        let mut entry = AnalysisEntry::new(&MatchRequest::new("Liverpool", "Manchester City"));
        entry.odds = Some(odds());

        let view = PageView {
            latest: Some(entry),
            predictor_configured: true,
            ..PageView::default()
        };
        let html = render(&view);
        assert!(html.contains("<span>Manchester City Win</span><strong>2.10</strong>"));
        assert!(html.contains("<span>Liverpool Win</span><strong>3.25</strong>"));
        assert!(!html.contains("<span>Liverpool Win</span><strong>2.10</strong>"));
    }

    #[test]
    fn test_bar_height_scales_to_longest_price() {
        assert_eq!(bar_height(dec!(4), dec!(4)), CHART_HEIGHT_PX);
        assert_eq!(bar_height(dec!(2), dec!(4)), CHART_HEIGHT_PX / 2);
        assert_eq!(bar_height(Decimal::ZERO, dec!(4)), 0);
    }
}
