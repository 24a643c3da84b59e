use std::sync::Arc;

use bingo_sdk::{BingoClient, FilePreferences, PreferenceStore};
use tracing::debug;

use crate::config;
use crate::terminal::cli::{Cli, Command};
use crate::terminal::error::CliError;
use crate::terminal::{board_watch, host_console, player_console, settings};

/// Shared handles for the role commands.
pub struct AppContext {
    pub client: Arc<BingoClient>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub public_url: String,
}

impl AppContext {
    fn connect(cli: &Cli, preferences: Arc<dyn PreferenceStore>) -> Result<Self, CliError> {
        let endpoint = config::resolve_base_url(cli.api_base_url.as_deref(), preferences.clone());
        endpoint.ensure_configured()?;
        debug!(
            target: "bingo::config",
            base_url = %endpoint.base_url(),
            source = endpoint.source().unwrap_or("unknown"),
            "using backend"
        );
        Ok(Self {
            client: Arc::new(BingoClient::new(endpoint.clone())?),
            preferences,
            public_url: cli.public_url.clone(),
        })
    }
}

pub async fn run(cli: Cli) -> Result<(), CliError> {
    let preferences: Arc<dyn PreferenceStore> = Arc::new(FilePreferences::open_default()?);

    match &cli.command {
        Command::Config(command) => settings::run(
            command.clone(),
            cli.api_base_url.as_deref(),
            preferences,
            &mut std::io::stdout(),
        ),
        Command::Host(args) => {
            host_console::run(&AppContext::connect(&cli, preferences)?, args.clone()).await
        }
        Command::Player(args) => {
            player_console::run(&AppContext::connect(&cli, preferences)?, args.clone()).await
        }
        Command::Board(args) => {
            board_watch::run(&AppContext::connect(&cli, preferences)?, args.clone()).await
        }
    }
}
