use std::io::Write;

use bingo_proto::BoardSnapshot;
use bingo_sdk::start_polling;
use tokio::sync::mpsc;
use tracing::debug;

use crate::board::BoardView;
use crate::config;
use crate::terminal::app::AppContext;
use crate::terminal::cli::BoardArgs;
use crate::terminal::error::CliError;

const SEPARATOR: &str = "────────────────────────────────────────";

pub async fn run(ctx: &AppContext, args: BoardArgs) -> Result<(), CliError> {
    let mut out = std::io::stdout();
    if args.once {
        let snapshot = ctx.client.fetch_board(&args.game_id).await?;
        write!(out, "{}", BoardView::project(&snapshot))?;
        return Ok(());
    }

    let interval = config::poll_interval(args.interval, ctx.preferences.as_ref());
    let (tx, mut updates) = mpsc::unbounded_channel();
    let handle = start_polling(ctx.client.clone(), args.game_id.clone(), interval, move |snapshot| {
        let _ = tx.send(snapshot);
    });
    writeln!(out, "📺 Watching {} (Ctrl-C to stop)", args.game_id)?;

    let result = tokio::select! {
        result = render(&mut updates, &mut out) => result,
        _ = tokio::signal::ctrl_c() => {
            debug!(target: "bingo::board", "interrupted");
            Ok(())
        }
    };
    handle.cancel();
    result
}

/// Prints a fresh board for every delivered snapshot.
pub async fn render<W: Write>(
    updates: &mut mpsc::UnboundedReceiver<BoardSnapshot>,
    out: &mut W,
) -> Result<(), CliError> {
    while let Some(snapshot) = updates.recv().await {
        writeln!(out, "{SEPARATOR}")?;
        write!(out, "{}", BoardView::project(&snapshot))?;
        out.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test_timeout::tokio_timeout_test]
    async fn renders_each_delivered_snapshot() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        for marker in ["T1", "T2"] {
            let snapshot: BoardSnapshot = serde_json::from_value(json!({
                "game": {"name": "Door Prizes", "status": "STARTED", "type": "RAFFLE"},
                "lastUpdatedAt": marker,
                "winners": [{"rank": 1, "displayName": "Pat", "pattern": "RAFFLE"}]
            }))
            .unwrap();
            tx.send(snapshot).unwrap();
        }
        drop(tx);

        let mut out = Vec::new();
        render(&mut rx, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches(SEPARATOR).count(), 2);
        assert_eq!(text.matches("Door Prizes — STARTED").count(), 2);
    }
}
