use serde::{Deserialize, Serialize};

use crate::game::GameType;
use crate::lenient;

/// Range shown when the backend omits `numberMin`.
pub const DEFAULT_NUMBER_MIN: i64 = 1;
/// Range shown when the backend omits `numberMax`.
pub const DEFAULT_NUMBER_MAX: i64 = 75;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameDescriptor {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub game_type: Option<GameType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    #[serde(default, deserialize_with = "lenient::rank")]
    pub rank: u32,
    #[serde(default, deserialize_with = "lenient::text")]
    pub display_name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub pattern: String,
}

/// Read-only view of a game as served by `/api/board`.
///
/// `last_updated_at` is the version marker: two snapshots carrying the same
/// marker describe the same content, whatever else was observed in between.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game: Option<GameDescriptor>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_value: Option<i64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_token",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::numbers")]
    pub called: Vec<i64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub number_min: Option<i64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub number_max: Option<i64>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub winners: Vec<Winner>,
}

impl BoardSnapshot {
    pub fn game_type(&self) -> Option<GameType> {
        self.game.as_ref().and_then(|game| game.game_type)
    }

    pub fn is_raffle(&self) -> bool {
        self.game_type() == Some(GameType::Raffle)
    }

    /// The version marker, if the backend sent a usable one.
    pub fn marker(&self) -> Option<&str> {
        self.last_updated_at
            .as_deref()
            .filter(|marker| !marker.is_empty())
    }

    pub fn number_range(&self) -> (i64, i64) {
        (
            self.number_min.unwrap_or(DEFAULT_NUMBER_MIN),
            self.number_max.unwrap_or(DEFAULT_NUMBER_MAX),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_full_snapshot() {
        let snapshot: BoardSnapshot = serde_json::from_value(json!({
            "game": {"name": "Office Bingo", "status": "STARTED", "type": "BINGO"},
            "lastValue": 42,
            "lastUpdatedAt": "2024-05-01T10:00:00Z",
            "called": [7, 42],
            "numberMin": 1,
            "numberMax": 75,
            "winners": [{"rank": 1, "displayName": "Pat", "pattern": "ROW"}]
        }))
        .unwrap();

        assert_eq!(snapshot.last_value, Some(42));
        assert_eq!(snapshot.marker(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(snapshot.called, vec![7, 42]);
        assert_eq!(snapshot.game_type(), Some(GameType::Bingo));
        assert_eq!(snapshot.winners[0].display_name, "Pat");
    }

    #[test]
    fn tolerates_loose_backend_values() {
        let snapshot: BoardSnapshot = serde_json::from_value(json!({
            "lastValue": "",
            "lastUpdatedAt": 1714557600000u64,
            "called": ["7", 42, null],
            "numberMin": "10",
            "winners": []
        }))
        .unwrap();

        assert_eq!(snapshot.last_value, None);
        assert_eq!(snapshot.marker(), Some("1714557600000"));
        assert_eq!(snapshot.called, vec![7, 42]);
        assert_eq!(snapshot.number_range(), (10, DEFAULT_NUMBER_MAX));
    }

    #[test]
    fn missing_or_empty_marker_is_absent() {
        let empty: BoardSnapshot = serde_json::from_value(json!({"lastUpdatedAt": ""})).unwrap();
        assert_eq!(empty.marker(), None);

        let missing: BoardSnapshot = serde_json::from_value(json!({"called": null})).unwrap();
        assert_eq!(missing.marker(), None);
        assert!(missing.called.is_empty());
    }

    #[test]
    fn raffle_detection_reads_game_descriptor() {
        let snapshot: BoardSnapshot =
            serde_json::from_value(json!({"game": {"name": "Prize Draw", "type": "RAFFLE"}}))
                .unwrap();
        assert!(snapshot.is_raffle());
        assert!(!BoardSnapshot::default().is_raffle());
    }

    #[test]
    fn null_winners_and_game_fields_still_decode() {
        let snapshot: BoardSnapshot = serde_json::from_value(json!({
            "game": {"name": null, "status": null, "type": null},
            "lastUpdatedAt": "T1",
            "winners": null
        }))
        .unwrap();
        assert!(snapshot.winners.is_empty());
        assert_eq!(snapshot.marker(), Some("T1"));
        let game = snapshot.game.unwrap();
        assert_eq!(game.name, "");
        assert_eq!(game.status, "");
    }

    #[test]
    fn winner_rank_accepts_numeric_strings() {
        let snapshot: BoardSnapshot = serde_json::from_value(json!({
            "winners": [
                {"rank": "2", "displayName": "Sam", "pattern": "COLUMN"},
                {"rank": 1, "displayName": null, "pattern": "ROW"},
                {"rank": "first", "displayName": "Kim"}
            ]
        }))
        .unwrap();
        let ranks: Vec<u32> = snapshot.winners.iter().map(|winner| winner.rank).collect();
        assert_eq!(ranks, vec![2, 1, 0]);
        assert_eq!(snapshot.winners[1].display_name, "");
        assert_eq!(snapshot.winners[2].pattern, "");
    }
}
