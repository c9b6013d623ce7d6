//! Odds snapshot types shared by the scraper, the cache and the dashboard.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Outcome of a 1X2 market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Home => "home",
            Outcome::Draw => "draw",
            Outcome::Away => "away",
        }
    }
}

/// Decimal odds for home win / draw / away win
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeOdds {
    pub home: Decimal,
    pub draw: Decimal,
    pub away: Decimal,
}

impl OutcomeOdds {
    pub fn get(&self, outcome: Outcome) -> Decimal {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Outcome, Decimal)> + '_ {
        [Outcome::Home, Outcome::Draw, Outcome::Away]
            .into_iter()
            .map(move |o| (o, self.get(o)))
    }

    /// Convert decimal odds to implied probability
    pub fn implied_probability(&self, outcome: Outcome) -> Decimal {
        let odds = self.get(outcome);
        if odds > Decimal::ZERO {
            Decimal::ONE / odds
        } else {
            Decimal::ZERO
        }
    }

    /// Bookmaker margin: sum of implied probabilities minus one
    pub fn overround(&self) -> Decimal {
        self.iter()
            .map(|(o, _)| self.implied_probability(o))
            .sum::<Decimal>()
            - Decimal::ONE
    }

    /// Outcome with the shortest price
    pub fn favourite(&self) -> Outcome {
        self.iter()
            .min_by(|a, b| a.1.cmp(&b.1))
            .map(|(o, _)| o)
            .unwrap_or(Outcome::Home)
    }
}

/// One match as listed by the bookmaker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOdds {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub odds: OutcomeOdds,
    /// Kickoff as displayed by the source page
    pub kickoff: String,
    pub competition: String,
}

impl MatchOdds {
    pub fn new(
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        odds: OutcomeOdds,
        kickoff: impl Into<String>,
        competition: impl Into<String>,
    ) -> Self {
        let home_team = home_team.into();
        let away_team = away_team.into();
        Self {
            id: match_id(&home_team, &away_team),
            home_team,
            away_team,
            odds,
            kickoff: kickoff.into(),
            competition: competition.into(),
        }
    }

    pub fn teams(&self) -> [&str; 2] {
        [&self.home_team, &self.away_team]
    }

    /// Case-insensitive exact team match
    pub fn involves(&self, team: &str) -> bool {
        let team = team.trim().to_lowercase();
        self.teams().iter().any(|t| t.to_lowercase() == team)
    }

    /// Looser match: either name contains the other
    pub fn loosely_involves(&self, team: &str) -> bool {
        let team = team.trim().to_lowercase();
        if team.is_empty() {
            return false;
        }
        self.teams().iter().any(|t| {
            let t = t.to_lowercase();
            t.contains(&team) || team.contains(&t)
        })
    }

    pub fn title(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }
}

/// Stable id derived from the two team names
pub fn match_id(home_team: &str, away_team: &str) -> String {
    format!("{}-vs-{}", slug(home_team), slug(away_team))
}

fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

/// Query parameters sent to the events page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OddsQuery {
    #[serde(rename = "marketId")]
    pub market_id: String,
    pub competitions: String,
    #[serde(rename = "categoryId")]
    pub category_id: String,
}

impl OddsQuery {
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("marketId", self.market_id.as_str()),
            ("competitions", self.competitions.as_str()),
            ("categoryId", self.category_id.as_str()),
        ]
    }

    /// Hex SHA-256 of the key-sorted JSON of the parameters
    pub fn cache_key(&self) -> String {
        let sorted: BTreeMap<&str, &str> = self.params().into_iter().collect();
        let canonical = serde_json::to_string(&sorted).unwrap_or_default();
        hex::encode(Sha256::digest(canonical.as_bytes()))
    }
}

impl From<&crate::config::ScraperConfig> for OddsQuery {
    fn from(cfg: &crate::config::ScraperConfig) -> Self {
        Self {
            market_id: cfg.market_id.clone(),
            competitions: cfg.competitions.clone(),
            category_id: cfg.category_id.clone(),
        }
    }
}

/// Point-in-time capture of the bookmaker's listed matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OddsSnapshot {
    pub query_key: String,
    pub captured_at: DateTime<Utc>,
    pub matches: Vec<MatchOdds>,
}

impl OddsSnapshot {
    pub fn new(query: &OddsQuery, matches: Vec<MatchOdds>) -> Self {
        Self {
            query_key: query.cache_key(),
            captured_at: Utc::now(),
            matches,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.captured_at
    }

    /// Valid for `query_key` and younger than `ttl_secs`
    pub fn is_fresh(&self, query_key: &str, ttl_secs: u64, now: DateTime<Utc>) -> bool {
        self.query_key == query_key
            && self.age(now) < Duration::seconds(ttl_secs.min(u32::MAX as u64) as i64)
    }

    /// Find a listed match between the two teams, order-insensitive
    pub fn find_match(&self, home_team: &str, away_team: &str) -> Option<&MatchOdds> {
        self.matches
            .iter()
            .find(|m| m.involves(home_team) && m.involves(away_team))
            .or_else(|| {
                self.matches
                    .iter()
                    .find(|m| m.loosely_involves(home_team) && m.loosely_involves(away_team))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn odds(home: Decimal, draw: Decimal, away: Decimal) -> OutcomeOdds {
        OutcomeOdds { home, draw, away }
    }

    fn sample_query() -> OddsQuery {
        OddsQuery {
            market_id: "1X2".to_string(),
            competitions: "11965,12541".to_string(),
            category_id: "2".to_string(),
        }
    }

    #[test]
    fn test_implied_probability_and_overround() {
        let o = odds(dec!(2.00), dec!(4.00), dec!(4.00));
        assert_eq!(o.implied_probability(Outcome::Home), dec!(0.5));
        assert_eq!(o.implied_probability(Outcome::Draw), dec!(0.25));
        assert_eq!(o.overround(), Decimal::ZERO);

        let o = odds(dec!(1.80), dec!(3.50), dec!(4.20));
        assert!(o.overround() > Decimal::ZERO);
    }

    #[test]
    fn test_zero_odds_have_no_probability() {
        let o = odds(Decimal::ZERO, dec!(3), dec!(3));
        assert_eq!(o.implied_probability(Outcome::Home), Decimal::ZERO);
    }

    #[test]
    fn test_favourite_is_shortest_price() {
        assert_eq!(odds(dec!(3.1), dec!(3.3), dec!(2.2)).favourite(), Outcome::Away);
        assert_eq!(odds(dec!(1.5), dec!(4.0), dec!(6.0)).favourite(), Outcome::Home);
    }

    #[test]
    fn test_match_id_slug() {
        assert_eq!(
            match_id("Manchester City", "Brighton & Hove Albion"),
            "manchester-city-vs-brighton-hove-albion"
        );
        assert_eq!(match_id("  Simba SC ", "Young Africans"), "simba-sc-vs-young-africans");
    }

    #[test]
    fn test_cache_key_is_stable_and_query_sensitive() {
        let a = sample_query();
        let mut b = sample_query();
        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key().len(), 64);

        b.competitions = "11965".to_string();
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_freshness_by_key_and_ttl() {
        let query = sample_query();
        let snapshot = OddsSnapshot::new(&query, vec![]);
        let key = query.cache_key();

        let now = snapshot.captured_at + Duration::seconds(60);
        assert!(snapshot.is_fresh(&key, 900, now));
        assert!(!snapshot.is_fresh("other", 900, now));

        let later = snapshot.captured_at + Duration::seconds(901);
        assert!(!snapshot.is_fresh(&key, 900, later));
        assert!(!snapshot.is_fresh(&key, 0, snapshot.captured_at));
    }

    #[test]
    fn test_find_match_exact_then_loose() {
        let query = sample_query();
        let snapshot = OddsSnapshot::new(
            &query,
            vec![
                MatchOdds::new("Manchester City", "Liverpool", odds(dec!(2.1), dec!(3.4), dec!(3.3)), "Sat 19:30", "Premier League"),
                MatchOdds::new("Arsenal FC", "Chelsea FC", odds(dec!(1.9), dec!(3.6), dec!(4.0)), "Sun 16:00", "Premier League"),
            ],
        );

        let exact = snapshot.find_match("liverpool", "MANCHESTER CITY").unwrap();
        assert_eq!(exact.id, "manchester-city-vs-liverpool");

        let loose = snapshot.find_match("Arsenal", "Chelsea").unwrap();
        assert_eq!(loose.home_team, "Arsenal FC");

        assert!(snapshot.find_match("Arsenal", "Liverpool").is_none());
    }
}
