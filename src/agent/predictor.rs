//! Match prediction chain
//!
//! Workflow:
//! 1. Team statistics (recent form, head-to-head, key players)
//! 2. Social media sentiment around the fixture
//! 3. Contextual factors (injuries, schedule, stakes)
//! 4. Final call combining 1-3 with the bookmaker line when we have one
//!
//! Steps 1-3 are independent and run concurrently.

use crate::agent::perplexity::CompletionClient;
use crate::domain::{MatchOdds, MatchRequest, Outcome, Prediction, Verdict};
use crate::error::PredictionError;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// Anything that can turn a fixture into a prediction
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(
        &self,
        request: &MatchRequest,
        odds: Option<MatchOdds>,
    ) -> Result<Prediction, PredictionError>;
}

pub struct MatchPredictor {
    llm: Arc<dyn CompletionClient>,
}

impl MatchPredictor {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }

    async fn team_stats(&self, req: &MatchRequest) -> Result<String, PredictionError> {
        self.llm.complete(&team_stats_prompt(req)).await
    }

    async fn sentiment(&self, req: &MatchRequest) -> Result<String, PredictionError> {
        self.llm
            .complete(&format!(
                "Analyze social media sentiment around {} vs {} match.",
                req.home_team, req.away_team
            ))
            .await
    }

    async fn context(&self, req: &MatchRequest) -> Result<String, PredictionError> {
        self.llm
            .complete(&format!(
                "Identify key contextual factors for {} vs {} match.",
                req.home_team, req.away_team
            ))
            .await
    }
}

#[async_trait]
impl Predictor for MatchPredictor {
    async fn predict(
        &self,
        request: &MatchRequest,
        odds: Option<MatchOdds>,
    ) -> Result<Prediction, PredictionError> {
        info!("Analyzing {}", request.title());

        let (team_stats, sentiment_analysis, match_context) = tokio::try_join!(
            self.team_stats(request),
            self.sentiment(request),
            self.context(request)
        )?;
        debug!(
            "Chain inputs ready: stats {} chars, sentiment {} chars, context {} chars",
            team_stats.len(),
            sentiment_analysis.len(),
            match_context.len()
        );

        let prompt = final_prompt(
            request,
            &team_stats,
            &sentiment_analysis,
            &match_context,
            odds.as_ref(),
        );
        let rationale = self.llm.complete(&prompt).await?;

        let verdict = Verdict::parse(&rationale, &request.home_team, &request.away_team);
        info!(
            "Prediction for {}: {:?} (confidence {:?}, risk {})",
            request.title(),
            verdict.outcome,
            verdict.confidence,
            verdict.risk
        );

        Ok(Prediction {
            home_team: request.home_team.clone(),
            away_team: request.away_team.clone(),
            team_stats,
            sentiment_analysis,
            match_context,
            outcome: verdict.outcome,
            confidence: verdict.confidence,
            risk: verdict.risk,
            recommended_bet: verdict.recommended_bet,
            rationale,
            generated_at: Utc::now(),
        })
    }
}

fn team_stats_prompt(req: &MatchRequest) -> String {
    format!(
        "Analyze these football teams: {} vs {}.\n\
         Consider their last 5 matches, head-to-head history, and key player statistics.\n\
         Provide detailed analysis in bullet points.",
        req.home_team, req.away_team
    )
}

fn odds_section(odds: &MatchOdds) -> String {
    let pct = |o: Outcome| {
        (odds.odds.implied_probability(o) * rust_decimal::Decimal::from(100)).round_dp(1)
    };
    format!(
        "Current bookmaker odds ({}, kickoff {}):\n\
         - {} win: {} (implied {}%)\n\
         - Draw: {} (implied {}%)\n\
         - {} win: {} (implied {}%)\n",
        odds.competition,
        odds.kickoff,
        odds.home_team,
        odds.odds.home,
        pct(Outcome::Home),
        odds.odds.draw,
        pct(Outcome::Draw),
        odds.away_team,
        odds.odds.away,
        pct(Outcome::Away),
    )
}

fn final_prompt(
    req: &MatchRequest,
    team_stats: &str,
    sentiment: &str,
    context: &str,
    odds: Option<&MatchOdds>,
) -> String {
    let odds_block = odds.map(odds_section).unwrap_or_default();
    format!(
        "Based on the following analysis of {home} vs {away}:\n\
         {team_stats}\n\
         {sentiment}\n\
         {context}\n\
         {odds_block}\n\
         Provide a predicted outcome with confidence percentage and recommended bet.\n\
         Start your answer with these lines:\n\
         Predicted outcome: <{home} win | Draw | {away} win>\n\
         Confidence: <0-100>%\n\
         Risk level: <low | medium | high>\n\
         Recommended bet: <bet>\n\
         Then explain your reasoning.",
        home = req.home_team,
        away = req.away_team,
    )
}
