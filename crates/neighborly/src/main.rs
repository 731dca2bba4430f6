//! `neighborlyd` - Proximity search server for a community directory
//!
//! This binary serves the nearby-search HTTP API and provides configuration
//! management commands.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use neighborly::auth::StaticSessionAuth;
use neighborly::cli::{Cli, Command, ConfigCommand};
use neighborly::directory::SqliteDirectory;
use neighborly::http::{self, AppState};
use neighborly::search::ProximityService;
use neighborly::{init_logging, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Serve { bind } => serve(config, bind).await,
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

async fn serve(mut config: Config, bind_override: Option<String>) -> anyhow::Result<()> {
    if let Some(bind) = bind_override {
        config.server.bind = bind;
        config.validate()?;
    }

    let database_path = config.database_path();
    info!(path = %database_path.display(), "opening directory database");
    let store = Arc::new(SqliteDirectory::open(&database_path)?);

    if config.auth.tokens.is_empty() {
        info!("no session tokens configured; every request will be rejected");
    }

    let state = AppState {
        service: Arc::new(ProximityService::new(store, config.search.clone())),
        auth: Arc::new(StaticSessionAuth::from_config(&config.auth)),
    };

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    http::serve(listener, state).await?;
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Bind address:        {}", config.server.bind);
                println!();
                println!("[Directory]");
                println!("  Database path:       {}", config.database_path().display());
                println!();
                println!("[Search]");
                println!(
                    "  Default radius (mi): {}",
                    config.search.default_radius_miles
                );
                println!(
                    "  Max results/kind:    {}",
                    config.search.max_results_per_kind
                );
                println!(
                    "  Max concurrent:      {}",
                    config.search.max_concurrent_scans
                );
                println!("  Timeout (ms):        {}", config.search.request_timeout_ms);
                println!();
                println!("[Auth]");
                println!("  Session tokens:      {}", config.auth.tokens.len());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
