//! Host control sequencer.
//!
//! Local status only gates which controls act; the backend stays authoritative
//! for everything else. Controls issued before a game is known are skipped
//! rather than treated as errors.

use std::fmt;
use std::sync::Arc;

use bingo_proto::{BoardSnapshot, DrawResponse, GameConfig, GameType, Winner};
use bingo_sdk::{ClientError, HostApi};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::FlowError;

pub const END_PROMPT: &str = "End this game?";
pub const RESET_PROMPT: &str = "Reset this game to DRAFT and clear sub-data?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStatus {
    None,
    Started,
    Ended,
    Draft,
}

impl HostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HostStatus::None => "NONE",
            HostStatus::Started => "STARTED",
            HostStatus::Ended => "ENDED",
            HostStatus::Draft => "DRAFT",
        }
    }
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a control did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    Applied,
    /// No game has been started yet.
    NoGame,
    /// The confirmation prompt was declined.
    Declined,
    /// The control does not apply in the game's current status.
    Inactive(HostStatus),
}

const DRAWING: &[HostStatus] = &[HostStatus::Started];
const RESETTABLE: &[HostStatus] = &[HostStatus::Started, HostStatus::Ended];

/// Picks the session a control may act on, or the outcome that skips it.
fn gate<'a>(
    session: &'a mut Option<GameSession>,
    allowed: &[HostStatus],
) -> Result<&'a mut GameSession, ControlOutcome> {
    match session {
        None => Err(ControlOutcome::NoGame),
        Some(session) if !allowed.contains(&session.status) => {
            Err(ControlOutcome::Inactive(session.status))
        }
        Some(session) => Ok(session),
    }
}

/// Turns a URL into an image payload (e.g. a data URL) for the join QR code.
pub trait QrEncoder: Send + Sync {
    fn encode(&self, url: &str) -> Result<String, String>;
}

/// Builds the player and board links for a game from the public web address.
#[derive(Debug, Clone)]
pub struct ShareLinks {
    base: String,
}

impl ShareLinks {
    /// Keeps origin and path; any query or fragment is dropped.
    pub fn new(public_url: &str) -> Result<Self, FlowError> {
        let mut url = Url::parse(public_url).map_err(|err| FlowError::InvalidPublicUrl {
            url: public_url.to_string(),
            reason: err.to_string(),
        })?;
        url.set_query(None);
        url.set_fragment(None);
        Ok(Self {
            base: url.to_string(),
        })
    }

    pub fn join_url(&self, game_id: &str) -> String {
        format!(
            "{}#/player?gameId={}",
            self.base,
            urlencoding::encode(game_id)
        )
    }

    pub fn board_url(&self, game_id: &str) -> String {
        format!(
            "{}#/board?gameId={}",
            self.base,
            urlencoding::encode(game_id)
        )
    }
}

/// Host-side view of the running game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSession {
    pub game_id: String,
    pub game_type: GameType,
    pub status: HostStatus,
    pub last_value: Option<i64>,
    /// Most recent first.
    pub called: Vec<i64>,
    pub winners: Vec<Winner>,
    pub join_url: String,
    pub board_url: String,
    pub qr_image: Option<String>,
}

impl GameSession {
    fn apply_draw(&mut self, drawn: DrawResponse) {
        self.last_value = drawn.value;
        match drawn.called {
            Some(mut called) => {
                called.reverse();
                self.called = called;
            }
            None => {
                if let Some(value) = drawn.value {
                    self.called.insert(0, value);
                }
            }
        }
    }

    /// Replaces local state wholesale with the snapshot's.
    pub fn resync(&mut self, snapshot: &BoardSnapshot) {
        self.last_value = snapshot.last_value;
        self.called = snapshot.called.iter().rev().copied().collect();
        self.winners = snapshot.winners.clone();
    }
}

pub fn validate_config(config: &GameConfig) -> Result<(), FlowError> {
    let invalid = |reason: String| Err(FlowError::InvalidConfig(reason));
    if config.name.trim().is_empty() {
        return invalid("name must not be empty".into());
    }
    if !(3..=5).contains(&config.grid_size) {
        return invalid(format!("grid size {} is outside 3..=5", config.grid_size));
    }
    if config.number_min > config.number_max {
        return invalid(format!(
            "number range {}..{} is empty",
            config.number_min, config.number_max
        ));
    }
    if config.max_winners < 1 {
        return invalid("max winners must be at least 1".into());
    }
    if config.board_refresh_sec == 0 {
        return invalid("board refresh must be positive".into());
    }
    Ok(())
}

pub struct HostSequencer {
    api: Arc<dyn HostApi>,
    links: ShareLinks,
    qr: Option<Arc<dyn QrEncoder>>,
    session: Option<GameSession>,
}

impl HostSequencer {
    pub fn new(api: Arc<dyn HostApi>, links: ShareLinks) -> Self {
        Self {
            api,
            links,
            qr: None,
            session: None,
        }
    }

    pub fn with_qr_encoder(mut self, encoder: Arc<dyn QrEncoder>) -> Self {
        self.qr = Some(encoder);
        self
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn status(&self) -> HostStatus {
        self.session
            .as_ref()
            .map_or(HostStatus::None, |session| session.status)
    }

    /// Starts a new game. Any previous local session is replaced.
    pub async fn start(&mut self, config: &GameConfig) -> Result<&GameSession, FlowError> {
        validate_config(config)?;
        let started = self.api.start(config).await?;
        let game_id = started
            .game_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ClientError::InvalidResponse("start reply has no gameId".into()))?;

        let join_url = self.links.join_url(&game_id);
        let qr_image = self.qr.as_ref().and_then(|encoder| {
            encoder
                .encode(&join_url)
                .map_err(|err| warn!(target: "bingo::host", error = %err, "QR error"))
                .ok()
        });
        info!(target: "bingo::host", game_id = %game_id, "game started");

        let session = GameSession {
            board_url: self.links.board_url(&game_id),
            game_id,
            game_type: config.game_type,
            status: HostStatus::Started,
            last_value: None,
            called: Vec::new(),
            winners: Vec::new(),
            join_url,
            qr_image,
        };
        Ok(self.session.insert(session))
    }

    pub async fn draw(&mut self) -> Result<ControlOutcome, FlowError> {
        let session = match gate(&mut self.session, DRAWING) {
            Ok(session) => session,
            Err(skipped) => return Ok(skipped),
        };
        let drawn = self.api.draw(&session.game_id).await?;
        debug!(target: "bingo::host", game_id = %session.game_id, value = ?drawn.value, "drew");
        session.apply_draw(drawn);
        Ok(ControlOutcome::Applied)
    }

    /// Undo, then an immediate board query whose result replaces local state.
    pub async fn undo(&mut self) -> Result<ControlOutcome, FlowError> {
        let session = match gate(&mut self.session, DRAWING) {
            Ok(session) => session,
            Err(skipped) => return Ok(skipped),
        };
        self.api.undo(&session.game_id).await?;
        let snapshot = self.api.fetch_board(&session.game_id).await?;
        session.resync(&snapshot);
        debug!(
            target: "bingo::host",
            game_id = %session.game_id,
            called = session.called.len(),
            "resynced after undo"
        );
        Ok(ControlOutcome::Applied)
    }

    pub async fn end<C>(&mut self, confirm: C) -> Result<ControlOutcome, FlowError>
    where
        C: FnOnce(&str) -> bool,
    {
        let session = match gate(&mut self.session, DRAWING) {
            Ok(session) => session,
            Err(skipped) => return Ok(skipped),
        };
        if !confirm(END_PROMPT) {
            return Ok(ControlOutcome::Declined);
        }
        self.api.end(&session.game_id).await?;
        session.status = HostStatus::Ended;
        info!(target: "bingo::host", game_id = %session.game_id, "game ended");
        Ok(ControlOutcome::Applied)
    }

    /// Returns the backend game to draft. Local called numbers and winners are
    /// left as they were; a fresh start is expected.
    pub async fn reset<C>(&mut self, confirm: C) -> Result<ControlOutcome, FlowError>
    where
        C: FnOnce(&str) -> bool,
    {
        let session = match gate(&mut self.session, RESETTABLE) {
            Ok(session) => session,
            Err(skipped) => return Ok(skipped),
        };
        if !confirm(RESET_PROMPT) {
            return Ok(ControlOutcome::Declined);
        }
        self.api.reset(&session.game_id).await?;
        session.status = HostStatus::Draft;
        info!(target: "bingo::host", game_id = %session.game_id, "game reset to draft");
        Ok(ControlOutcome::Applied)
    }
}
