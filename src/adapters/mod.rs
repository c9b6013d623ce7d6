pub mod betpawa;

pub use betpawa::{parse_events, BetpawaScraper, OddsSource};
