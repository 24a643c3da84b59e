use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameType {
    Bingo,
    Raffle,
    /// A game type this client does not know how to present specially.
    #[serde(other)]
    Other,
}

impl GameType {
    pub fn as_str(self) -> &'static str {
        match self {
            GameType::Bingo => "BINGO",
            GameType::Raffle => "RAFFLE",
            GameType::Other => "OTHER",
        }
    }

    /// Raffles have no cards and no number grid.
    pub fn has_cards(self) -> bool {
        !matches!(self, GameType::Raffle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WinPattern {
    Row,
    Column,
    Diagonal,
    FourCorners,
}

impl WinPattern {
    pub fn as_str(self) -> &'static str {
        match self {
            WinPattern::Row => "ROW",
            WinPattern::Column => "COLUMN",
            WinPattern::Diagonal => "DIAGONAL",
            WinPattern::FourCorners => "FOUR_CORNERS",
        }
    }
}

/// Host-authored settings sent with `/api/start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub game_type: GameType,
    pub grid_size: u8,
    pub number_min: i64,
    pub number_max: i64,
    pub free_center: bool,
    pub win_patterns: Vec<WinPattern>,
    pub max_winners: u32,
    #[serde(default)]
    pub no_duplicate_winners: bool,
    pub board_refresh_sec: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            name: "Company Party Bingo".into(),
            game_type: GameType::Bingo,
            grid_size: 5,
            number_min: 1,
            number_max: 75,
            free_center: true,
            win_patterns: vec![WinPattern::Row, WinPattern::Column, WinPattern::Diagonal],
            max_winners: 3,
            no_duplicate_winners: true,
            board_refresh_sec: 3,
        }
    }
}
