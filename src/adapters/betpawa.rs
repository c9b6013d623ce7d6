// Betpawa events page scraper
// Pulls the 1X2 football board and turns it into MatchOdds

use crate::config::ScraperConfig;
use crate::domain::{MatchOdds, OddsQuery, OutcomeOdds};
use crate::error::{FetchError, MatchdayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

const EVENT_CONTAINER: &str = ".event-list-group-container";
const TEAM_NAME: &str = ".event-name-team";
const ODDS_BUTTON: &str = ".button-odds";
const EVENT_TIME: &str = ".event-time";
const EVENT_COMPETITION: &str = ".event-competition";

/// Anything that can produce the current list of matches with odds
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OddsSource: Send + Sync {
    async fn fetch(&self, query: &OddsQuery) -> std::result::Result<Vec<MatchOdds>, FetchError>;
}

/// HTTP scraper for the Betpawa events page
pub struct BetpawaScraper {
    client: Client,
    config: ScraperConfig,
}

impl BetpawaScraper {
    pub fn new(config: ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| MatchdayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    async fn fetch_page(&self, query: &OddsQuery) -> std::result::Result<String, FetchError> {
        debug!("Fetching odds page: {}", self.config.base_url);

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&query.params())
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| self.map_transport_error(e))
    }

    fn map_transport_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                elapsed_ms: self.config.timeout_secs * 1000,
            }
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl OddsSource for BetpawaScraper {
    async fn fetch(&self, query: &OddsQuery) -> std::result::Result<Vec<MatchOdds>, FetchError> {
        let attempts = self.config.max_retries + 1;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let result = match self.fetch_page(query).await {
                Ok(body) => parse_events(&body),
                Err(e) => Err(e),
            };

            match result {
                Ok(matches) => {
                    info!("Scraped {} matches from Betpawa", matches.len());
                    return Ok(matches);
                }
                Err(e) if e.is_retryable() && attempt < attempts => {
                    warn!("Odds fetch attempt {}/{} failed: {}", attempt, attempts, e);
                    tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
                }
                Err(e) => {
                    warn!("Odds fetch failed: {}", e);
                    return Err(e);
                }
            }
        }
    }
}

struct EventSelectors {
    container: Selector,
    team: Selector,
    odds: Selector,
    time: Selector,
    competition: Selector,
}

impl EventSelectors {
    fn build() -> std::result::Result<Self, FetchError> {
        let parse = |s: &str| {
            Selector::parse(s).map_err(|e| FetchError::Layout(format!("bad selector {}: {:?}", s, e)))
        };
        Ok(Self {
            container: parse(EVENT_CONTAINER)?,
            team: parse(TEAM_NAME)?,
            odds: parse(ODDS_BUTTON)?,
            time: parse(EVENT_TIME)?,
            competition: parse(EVENT_COMPETITION)?,
        })
    }
}

/// Parse the events page. Malformed event blocks are skipped; a page
/// with no usable block at all means the layout changed.
pub fn parse_events(html: &str) -> std::result::Result<Vec<MatchOdds>, FetchError> {
    let selectors = EventSelectors::build()?;
    let document = Html::parse_document(html);

    let mut seen = 0usize;
    let mut matches = Vec::new();
    for container in document.select(&selectors.container) {
        seen += 1;
        match parse_event(container, &selectors) {
            Some(m) => matches.push(m),
            None => debug!("Skipping malformed event block #{}", seen),
        }
    }

    if seen == 0 {
        return Err(FetchError::Layout(format!(
            "no {} elements on page",
            EVENT_CONTAINER
        )));
    }
    if matches.is_empty() {
        return Err(FetchError::Layout(format!(
            "{} event blocks found but none could be parsed",
            seen
        )));
    }

    Ok(matches)
}

fn parse_event(event: ElementRef<'_>, sel: &EventSelectors) -> Option<MatchOdds> {
    let teams: Vec<String> = event
        .select(&sel.team)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();
    if teams.len() < 2 {
        return None;
    }

    let prices: Vec<Decimal> = event
        .select(&sel.odds)
        .take(3)
        .map(|o| Decimal::from_str(&element_text(o)).ok())
        .collect::<Option<Vec<_>>>()?;
    if prices.len() < 3 {
        return None;
    }

    let kickoff = event.select(&sel.time).next().map(element_text)?;
    let competition = event.select(&sel.competition).next().map(element_text)?;

    Some(MatchOdds::new(
        teams[0].clone(),
        teams[1].clone(),
        OutcomeOdds {
            home: prices[0],
            draw: prices[1],
            away: prices[2],
        },
        kickoff,
        competition,
    ))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(|t| t.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}
