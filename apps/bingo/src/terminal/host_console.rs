use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::host::{
    ControlOutcome, END_PROMPT, GameSession, HostSequencer, RESET_PROMPT, ShareLinks,
};
use crate::terminal::app::AppContext;
use crate::terminal::cli::HostArgs;
use crate::terminal::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    Draw,
    Undo,
    End,
    Reset,
    Status,
    Help,
    Quit,
}

impl HostCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "draw" | "d" | "next" => Some(Self::Draw),
            "undo" | "u" => Some(Self::Undo),
            "end" => Some(Self::End),
            "reset" => Some(Self::Reset),
            "status" | "s" => Some(Self::Status),
            "help" | "?" => Some(Self::Help),
            "quit" | "q" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

const HELP: &str = "commands: draw, undo, end, reset, status, help, quit";

pub async fn run(ctx: &AppContext, args: HostArgs) -> Result<(), CliError> {
    let links = ShareLinks::new(&ctx.public_url)?;
    let mut host = HostSequencer::new(ctx.client.clone(), links);
    let mut out = std::io::stdout();

    let session = host.start(&args.to_game_config()).await?;
    print_started(session, &mut out)?;
    writeln!(out, "{HELP}")?;

    let input = BufReader::new(tokio::io::stdin());
    tokio::select! {
        result = drive(&mut host, input, &mut out) => result,
        _ = tokio::signal::ctrl_c() => {
            debug!(target: "bingo::host", "interrupted");
            Ok(())
        }
    }
}

fn print_started<W: Write>(session: &GameSession, out: &mut W) -> Result<(), CliError> {
    writeln!(out, "🎱 Game started: {}", session.game_id)?;
    writeln!(out, "  join url:  {}", session.join_url)?;
    writeln!(out, "  board url: {}", session.board_url)?;
    match &session.qr_image {
        Some(image) => writeln!(out, "  qr: {image}")?,
        None => writeln!(out, "  qr: (no QR image)")?,
    }
    Ok(())
}

/// Reads host commands until `quit` or end of input. Backend failures are
/// reported and the console keeps going.
pub async fn drive<R, W>(
    host: &mut HostSequencer,
    input: R,
    out: &mut W,
) -> Result<(), CliError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }
        let Some(command) = HostCommand::parse(&line) else {
            writeln!(out, "unknown command '{}'; {HELP}", line.trim())?;
            continue;
        };

        let outcome = match command {
            HostCommand::Quit => return Ok(()),
            HostCommand::Help => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            HostCommand::Status => {
                print_status(host, out)?;
                continue;
            }
            HostCommand::Draw => host.draw().await,
            HostCommand::Undo => host.undo().await,
            HostCommand::End | HostCommand::Reset => {
                let prompt = if command == HostCommand::End {
                    END_PROMPT
                } else {
                    RESET_PROMPT
                };
                write!(out, "{prompt} [y/N] ")?;
                out.flush()?;
                let answer = lines.next_line().await?.unwrap_or_default();
                let confirmed = matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes");
                if command == HostCommand::End {
                    host.end(|_| confirmed).await
                } else {
                    host.reset(|_| confirmed).await
                }
            }
        };

        match outcome {
            Ok(ControlOutcome::Applied) => report(command, host, out)?,
            Ok(ControlOutcome::NoGame) => writeln!(out, "no game started")?,
            Ok(ControlOutcome::Declined) => writeln!(out, "cancelled")?,
            Ok(ControlOutcome::Inactive(status)) => {
                writeln!(out, "not available while the game is {status}")?
            }
            Err(err) => writeln!(out, "❌ {err}")?,
        }
    }
}

fn report<W: Write>(command: HostCommand, host: &HostSequencer, out: &mut W) -> Result<(), CliError> {
    let Some(session) = host.session() else {
        return Ok(());
    };
    match command {
        HostCommand::Draw | HostCommand::Undo => {
            writeln!(out, "{}", format_called(session))?;
        }
        HostCommand::End => writeln!(out, "Game ended.")?,
        HostCommand::Reset => writeln!(out, "Game reset.")?,
        _ => {}
    }
    Ok(())
}

fn print_status<W: Write>(host: &HostSequencer, out: &mut W) -> Result<(), CliError> {
    writeln!(out, "status: {}", host.status())?;
    if let Some(session) = host.session() {
        writeln!(out, "game: {} ({})", session.game_id, session.game_type.as_str())?;
        writeln!(out, "{}", format_called(session))?;
        for winner in &session.winners {
            writeln!(
                out,
                "  #{} {} — {}",
                winner.rank, winner.display_name, winner.pattern
            )?;
        }
    }
    Ok(())
}

pub fn format_called(session: &GameSession) -> String {
    let last = session
        .last_value
        .map_or_else(|| "-".to_string(), |value| value.to_string());
    let called: Vec<String> = session.called.iter().map(i64::to_string).collect();
    format!("last: {last}  called: [{}]", called.join(", "))
}
