use std::io::Write;

use bingo_proto::BoardSnapshot;
use bingo_sdk::{BoardPoller, PlayerApi};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use crate::config;
use crate::player::{self, PlayerSession};
use crate::terminal::app::AppContext;
use crate::terminal::cli::PlayerArgs;
use crate::terminal::error::CliError;

const HELP: &str = "commands: card, claim [PATTERN], help, quit";

pub async fn run(ctx: &AppContext, args: PlayerArgs) -> Result<(), CliError> {
    let mut out = std::io::stdout();
    let session = match (&args.participant_id, &args.display_name) {
        (Some(participant_id), _) => {
            player::resume(ctx.client.as_ref(), &args.game_id, participant_id).await?
        }
        (None, Some(name)) => player::join(ctx.client.as_ref(), &args.game_id, name).await?,
        (None, None) => {
            return Err(CliError::InvalidArgument(
                "either --name or --participant-id is required".into(),
            ));
        }
    };
    print_session(&session, &mut out)?;
    writeln!(out, "{HELP}")?;

    // Polling starts only once the join has resolved.
    let interval = config::poll_interval(args.interval, ctx.preferences.as_ref());
    let poller = BoardPoller::new(ctx.client.clone());
    let (tx, mut updates) = mpsc::unbounded_channel();
    poller.start(&session.game_id, interval, move |snapshot| {
        let _ = tx.send(snapshot);
    });

    let input = BufReader::new(tokio::io::stdin());
    let result = tokio::select! {
        result = drive(ctx.client.as_ref(), &session, input, &mut updates, &mut out) => result,
        _ = tokio::signal::ctrl_c() => {
            debug!(target: "bingo::player", "interrupted");
            Ok(())
        }
    };
    poller.stop();
    result
}

pub fn print_session<W: Write>(session: &PlayerSession, out: &mut W) -> Result<(), CliError> {
    writeln!(out, "🎟️  Joined game {}", session.game_id)?;
    writeln!(out, "  participant: {}", session.participant_id())?;
    match session.card() {
        Some(card) => {
            if let Some(card_id) = &card.card_id {
                writeln!(out, "  card: {card_id}")?;
            }
            write!(out, "{card}")?;
        }
        None => writeln!(out, "  no card for this game")?,
    }
    Ok(())
}

/// Interleaves live board updates with player commands until `quit`, or until
/// both the input and the update stream are exhausted.
pub async fn drive<R, W>(
    api: &dyn PlayerApi,
    session: &PlayerSession,
    input: R,
    updates: &mut mpsc::UnboundedReceiver<BoardSnapshot>,
    out: &mut W,
) -> Result<(), CliError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut input_open = true;
    let mut updates_open = true;
    while input_open || updates_open {
        tokio::select! {
            update = updates.recv(), if updates_open => {
                let Some(snapshot) = update else {
                    updates_open = false;
                    continue;
                };
                let last = snapshot
                    .last_value
                    .map_or_else(|| "-".to_string(), |value| value.to_string());
                writeln!(out, "📣 {last}")?;
            }
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    input_open = false;
                    continue;
                };
                let mut words = line.split_whitespace();
                match words.next().map(str::to_ascii_lowercase).as_deref() {
                    None => {}
                    Some("quit" | "q" | "exit") => return Ok(()),
                    Some("help" | "?") => writeln!(out, "{HELP}")?,
                    Some("card") => print_session(session, out)?,
                    Some("claim") => {
                        match player::claim(api, session, words.next()).await {
                            Ok(reply) => writeln!(out, "claim sent: {reply}")?,
                            Err(err) => writeln!(out, "❌ {err}")?,
                        }
                    }
                    Some(other) => writeln!(out, "unknown command '{other}'; {HELP}")?,
                }
            }
        }
    }
    Ok(())
}
