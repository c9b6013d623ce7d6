use anyhow::Context;
use clap::Parser;
use matchday::api::{start_api_server, AppState};
use matchday::cli::{commands, Cli, Commands};
use matchday::config::AppConfig;
use matchday::services::AnalysisService;
use std::sync::Arc;
use tracing::{error, info};

mod main_runtime;

use main_runtime::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // PPLX_API_KEY usually lives in .env
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let cfg = AppConfig::load_from(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config))?;
    init_logging(&cfg.logging);

    if let Err(errors) = cfg.validate() {
        for e in &errors {
            error!("Config: {}", e);
        }
        anyhow::bail!("invalid configuration ({} problems)", errors.len());
    }

    let service = Arc::new(AnalysisService::from_config(&cfg)?);

    match cli.command_or_default() {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| cfg.server.host.clone());
            let port = port.unwrap_or(cfg.server.port);
            info!(
                "Starting dashboard (cache: {}, ttl {}s)",
                cfg.cache.path.display(),
                cfg.cache.ttl_secs
            );
            start_api_server(AppState::new(service), &host, port).await?;
        }
        Commands::Odds { force, json } => {
            commands::run_odds(&service, force, json).await?;
        }
        Commands::Analyze {
            home,
            away,
            force,
            json,
        } => {
            commands::run_analyze(&service, &home, &away, force, json).await?;
        }
    }

    Ok(())
}
