//! Player session bootstrap: join (or resume) a game and hold the issued card.

use std::fmt;

use bingo_proto::{CardCell, ClaimRequest, JoinRequest};
use bingo_sdk::{ClientError, PlayerApi};
use serde_json::Value;
use tracing::info;

use crate::error::FlowError;

/// A card exactly as issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantCard {
    pub card_id: Option<String>,
    pub cells: Vec<Vec<CardCell>>,
    pub grid_size: usize,
    pub free_center: bool,
}

impl ParticipantCard {
    /// Grid size and free-center flag come from the backend when given. The
    /// matrix must be square with that many rows.
    pub fn from_parts(
        card_id: Option<String>,
        cells: Vec<Vec<CardCell>>,
        grid_size: Option<i64>,
        free_center: Option<bool>,
    ) -> Result<Self, ClientError> {
        let grid_size = match grid_size {
            Some(size) => usize::try_from(size)
                .map_err(|_| ClientError::InvalidResponse(format!("grid size {size}")))?,
            None => cells.len(),
        };
        if grid_size == 0
            || cells.len() != grid_size
            || cells.iter().any(|row| row.len() != grid_size)
        {
            return Err(ClientError::InvalidResponse(format!(
                "card is not a {grid_size}x{grid_size} grid"
            )));
        }
        Ok(Self {
            card_id,
            cells,
            grid_size,
            free_center: free_center.unwrap_or(false),
        })
    }

    /// Only odd-sized grids have a center cell to free.
    pub fn is_free(&self, row: usize, col: usize) -> bool {
        let center = self.grid_size / 2;
        self.free_center && self.grid_size % 2 == 1 && row == center && col == center
    }
}

impl fmt::Display for ParticipantCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.cells.iter().enumerate() {
            let line: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(c, cell)| {
                    if self.is_free(r, c) {
                        format!("{:>4}", "FREE")
                    } else {
                        format!("{:>4}", cell.to_string())
                    }
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// What a join produced. Raffles issue no card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinResult {
    Ticket {
        participant_id: String,
    },
    Card {
        participant_id: String,
        card: ParticipantCard,
    },
}

impl JoinResult {
    /// An absent or empty matrix means the game issues no card.
    fn from_reply(
        participant_id: String,
        card_id: Option<String>,
        cells: Option<Vec<Vec<CardCell>>>,
        grid_size: Option<i64>,
        free_center: Option<bool>,
    ) -> Result<Self, ClientError> {
        Ok(match cells {
            Some(cells) if !cells.is_empty() => JoinResult::Card {
                participant_id,
                card: ParticipantCard::from_parts(card_id, cells, grid_size, free_center)?,
            },
            _ => JoinResult::Ticket { participant_id },
        })
    }

    pub fn participant_id(&self) -> &str {
        match self {
            JoinResult::Ticket { participant_id } | JoinResult::Card { participant_id, .. } => {
                participant_id
            }
        }
    }

    pub fn card(&self) -> Option<&ParticipantCard> {
        match self {
            JoinResult::Ticket { .. } => None,
            JoinResult::Card { card, .. } => Some(card),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSession {
    pub game_id: String,
    pub result: JoinResult,
}

impl PlayerSession {
    pub fn participant_id(&self) -> &str {
        self.result.participant_id()
    }

    pub fn card(&self) -> Option<&ParticipantCard> {
        self.result.card()
    }
}

pub async fn join(
    api: &dyn PlayerApi,
    game_id: &str,
    display_name: &str,
) -> Result<PlayerSession, FlowError> {
    let game_id = game_id.trim();
    let display_name = display_name.trim();
    if game_id.is_empty() || display_name.is_empty() {
        return Err(FlowError::InvalidConfig(
            "game id and display name are required".into(),
        ));
    }
    let joined = api
        .join(&JoinRequest {
            game_id: game_id.to_string(),
            display_name: display_name.to_string(),
        })
        .await?;
    let participant_id = joined
        .participant_id
        .ok_or_else(|| ClientError::InvalidResponse("join reply has no participantId".into()))?;

    let result = JoinResult::from_reply(
        participant_id,
        joined.card_id,
        joined.cells,
        joined.grid_size,
        joined.free_center,
    )?;
    info!(
        target: "bingo::player",
        game_id = %game_id,
        participant_id = %result.participant_id(),
        has_card = result.card().is_some(),
        "joined"
    );
    Ok(PlayerSession {
        game_id: game_id.to_string(),
        result,
    })
}

/// Recovers an earlier participant's card without joining again.
pub async fn resume(
    api: &dyn PlayerApi,
    game_id: &str,
    participant_id: &str,
) -> Result<PlayerSession, FlowError> {
    let payload = api.fetch_card(game_id, participant_id).await?.into_payload();
    let result = JoinResult::from_reply(
        participant_id.to_string(),
        payload.card_id,
        payload.cells,
        payload.grid_size,
        payload.free_center,
    )?;
    Ok(PlayerSession {
        game_id: game_id.to_string(),
        result,
    })
}

pub async fn claim(
    api: &dyn PlayerApi,
    session: &PlayerSession,
    pattern: Option<&str>,
) -> Result<Value, FlowError> {
    let request = ClaimRequest {
        game_id: session.game_id.clone(),
        participant_id: session.participant_id().to_string(),
        card_id: session.card().and_then(|card| card.card_id.clone()),
        pattern: pattern.map(str::to_string),
    };
    Ok(api.claim(&request).await?)
}
