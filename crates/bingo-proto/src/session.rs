use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lenient;

/// Payload for the host commands that only name a game (`draw`, `undo`, `end`, `reset`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRef {
    pub game_id: String,
}

impl GameRef {
    pub fn new(game_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    #[serde(default, deserialize_with = "lenient::opt_token")]
    pub game_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawResponse {
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub value: Option<i64>,
    /// Every value called so far, oldest first, when the backend reports it.
    #[serde(default, deserialize_with = "lenient::opt_numbers")]
    pub called: Option<Vec<i64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub game_id: String,
    pub display_name: String,
}

/// One cell of a card matrix exactly as the backend sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CardCell {
    Number(i64),
    Label(String),
    Empty,
}

impl fmt::Display for CardCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardCell::Number(value) => write!(f, "{value}"),
            CardCell::Label(label) => f.write_str(label),
            CardCell::Empty => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    #[serde(default, deserialize_with = "lenient::opt_token")]
    pub participant_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_token")]
    pub card_id: Option<String>,
    #[serde(default)]
    pub cells: Option<Vec<Vec<CardCell>>>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub grid_size: Option<i64>,
    #[serde(default)]
    pub free_center: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPayload {
    #[serde(default, deserialize_with = "lenient::opt_token")]
    pub card_id: Option<String>,
    #[serde(default)]
    pub cells: Option<Vec<Vec<CardCell>>>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub grid_size: Option<i64>,
    #[serde(default)]
    pub free_center: Option<bool>,
}

/// Body of `/api/card`: either a bare matrix or an object carrying one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CardResponse {
    Matrix(Vec<Vec<CardCell>>),
    Card(CardPayload),
}

impl CardResponse {
    pub fn into_payload(self) -> CardPayload {
        match self {
            CardResponse::Matrix(cells) => CardPayload {
                cells: Some(cells),
                ..CardPayload::default()
            },
            CardResponse::Card(payload) => payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub game_id: String,
    pub participant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}
