use bingo_client_core::telemetry::logging;
use bingo_client_core::terminal::{app, cli::Cli};
use clap::Parser;

#[tokio::main]
async fn main() {
    // Env-backed flags read values loaded from `.env`.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(err) = logging::init(&cli.logging.to_config()) {
        eprintln!("❌ logging initialization failed: {err}");
        std::process::exit(1);
    }

    if let Err(err) = app::run(cli).await {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
}
