//! Command line surface.
//!
//! `serve` (the default) runs the dashboard; `odds` and `analyze` are
//! one-shot commands against the same service.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "matchday")]
#[command(version)]
#[command(about = "Football odds dashboard with AI match predictions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config directory (default.toml + $MATCHDAY_ENV.toml)
    #[arg(short, long, global = true, default_value = "config")]
    pub config: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the web dashboard
    Serve {
        /// Override server.host
        #[arg(long)]
        host: Option<String>,
        /// Override server.port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the current odds board
    Odds {
        /// Ignore the cache and scrape now
        #[arg(long)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Analyze one fixture
    Analyze {
        /// Home team name
        #[arg(long)]
        home: String,
        /// Away team name
        #[arg(long)]
        away: String,
        /// Ignore the cache and scrape now
        #[arg(long)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve {
            host: None,
            port: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_serve() {
        let cli = Cli::parse_from(["matchday"]);
        assert_eq!(cli.config, "config");
        assert!(matches!(
            cli.command_or_default(),
            Commands::Serve {
                host: None,
                port: None
            }
        ));
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::parse_from([
            "matchday",
            "analyze",
            "--home",
            "Arsenal",
            "--away",
            "Chelsea",
            "--json",
            "--config",
            "/etc/matchday",
        ]);
        assert_eq!(cli.config, "/etc/matchday");
        match cli.command_or_default() {
            Commands::Analyze {
                home,
                away,
                force,
                json,
            } => {
                assert_eq!(home, "Arsenal");
                assert_eq!(away, "Chelsea");
                assert!(!force);
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
