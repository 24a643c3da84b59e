use std::io::Write;
use std::sync::Arc;

use bingo_sdk::{
    API_BASE_URL_KEY, BOARD_REFRESH_SEC_KEY, MIN_POLL_INTERVAL_SECS, PreferenceStore,
};
use tracing::info;
use url::Url;

use crate::config;
use crate::terminal::cli::ConfigCommand;
use crate::terminal::error::CliError;

pub fn run<W: Write>(
    command: ConfigCommand,
    cli_override: Option<&str>,
    preferences: Arc<dyn PreferenceStore>,
    out: &mut W,
) -> Result<(), CliError> {
    match command {
        ConfigCommand::Show => {
            let endpoint = config::resolver(cli_override, preferences.clone()).resolve();
            if endpoint.is_configured() {
                writeln!(
                    out,
                    "backend: {} (from {})",
                    endpoint.base_url(),
                    endpoint.source().unwrap_or("unknown")
                )?;
            } else {
                writeln!(out, "backend: not configured")?;
            }
            let refresh = config::poll_interval(None, preferences.as_ref());
            writeln!(out, "board refresh: {}s", refresh.as_secs_f64())?;
            for key in [API_BASE_URL_KEY, BOARD_REFRESH_SEC_KEY] {
                match preferences.get(key) {
                    Some(value) => writeln!(out, "  {key} = {value}")?,
                    None => writeln!(out, "  {key} (unset)")?,
                }
            }
        }
        ConfigCommand::SetBaseUrl { url } => {
            let url = url.trim();
            Url::parse(url)
                .map_err(|err| CliError::InvalidArgument(format!("'{url}' is not a url: {err}")))?;
            preferences.set(API_BASE_URL_KEY, url)?;
            info!(target: "bingo::config", base_url = %url, "saved backend base url");
            writeln!(out, "saved {API_BASE_URL_KEY} = {url}")?;
        }
        ConfigCommand::SetRefresh { seconds } => {
            if !seconds.is_finite() || seconds < MIN_POLL_INTERVAL_SECS {
                return Err(CliError::InvalidArgument(format!(
                    "refresh must be at least {MIN_POLL_INTERVAL_SECS} seconds"
                )));
            }
            preferences.set(BOARD_REFRESH_SEC_KEY, &seconds.to_string())?;
            writeln!(out, "saved {BOARD_REFRESH_SEC_KEY} = {seconds}")?;
        }
        ConfigCommand::Clear => {
            preferences.remove(API_BASE_URL_KEY)?;
            preferences.remove(BOARD_REFRESH_SEC_KEY)?;
            writeln!(out, "cleared stored settings")?;
        }
    }
    Ok(())
}
