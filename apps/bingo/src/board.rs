//! Board projection: a pure function of the latest delivered snapshot.

use std::collections::HashSet;
use std::fmt;

use bingo_proto::{BoardSnapshot, Winner};

/// Numbers per printed grid row.
const GRID_COLUMNS: usize = 15;
/// Widest number range still drawn cell by cell.
pub const MAX_GRID_CELLS: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub value: i64,
    pub called: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumberGrid {
    Cells(Vec<GridCell>),
    /// The range is wider than [`MAX_GRID_CELLS`] and is not materialized.
    TooLarge { min: i64, max: i64 },
}

impl NumberGrid {
    fn build(min: i64, max: i64, called: &[i64]) -> Self {
        let span = i128::from(max) - i128::from(min) + 1;
        if span > i128::from(MAX_GRID_CELLS) {
            return NumberGrid::TooLarge { min, max };
        }
        let called: HashSet<i64> = called.iter().copied().collect();
        NumberGrid::Cells(
            (min..=max)
                .map(|value| GridCell {
                    value,
                    called: called.contains(&value),
                })
                .collect(),
        )
    }

    /// Empty when the range was too large to draw.
    pub fn cells(&self) -> &[GridCell] {
        match self {
            NumberGrid::Cells(cells) => cells,
            NumberGrid::TooLarge { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub title: String,
    pub last_value: Option<i64>,
    /// `None` for raffles.
    pub grid: Option<NumberGrid>,
    /// Ordered by rank.
    pub winners: Vec<Winner>,
}

impl BoardView {
    pub fn project(snapshot: &BoardSnapshot) -> Self {
        let title = match &snapshot.game {
            Some(game) if !game.name.is_empty() => format!("{} — {}", game.name, game.status),
            _ => "Live Board".to_string(),
        };

        let grid = (!snapshot.is_raffle()).then(|| {
            let (min, max) = snapshot.number_range();
            NumberGrid::build(min, max, &snapshot.called)
        });

        let mut winners = snapshot.winners.clone();
        winners.sort_by_key(|winner| winner.rank);

        Self {
            title,
            last_value: snapshot.last_value,
            grid,
            winners,
        }
    }
}

impl fmt::Display for BoardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        match self.last_value {
            Some(value) => writeln!(f, "Last: {value}")?,
            None => writeln!(f, "Last: -")?,
        }
        if let Some(NumberGrid::TooLarge { min, max }) = &self.grid {
            writeln!(f, "Numbers {min}..{max}: range too large to draw")?;
        }
        if let Some(NumberGrid::Cells(grid)) = &self.grid {
            for row in grid.chunks(GRID_COLUMNS) {
                let line: Vec<String> = row
                    .iter()
                    .map(|cell| {
                        if cell.called {
                            format!("[{:>3}]", cell.value)
                        } else {
                            format!(" {:>3} ", cell.value)
                        }
                    })
                    .collect();
                writeln!(f, "{}", line.join("").trim_end())?;
            }
        }
        writeln!(f, "Winners:")?;
        for winner in &self.winners {
            writeln!(
                f,
                "  #{} {} — {}",
                winner.rank, winner.display_name, winner.pattern
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: serde_json::Value) -> BoardSnapshot {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn grid_covers_range_and_marks_called() {
        let view = BoardView::project(&snapshot(json!({
            "game": {"name": "Office", "status": "STARTED", "type": "BINGO"},
            "lastValue": 4,
            "called": [2, 4],
            "numberMin": 1,
            "numberMax": 5
        })));
        assert_eq!(view.title, "Office — STARTED");
        let grid = view.grid.unwrap();
        let grid = grid.cells();
        assert_eq!(grid.iter().map(|c| c.value).collect::<Vec<_>>(), [1, 2, 3, 4, 5]);
        assert_eq!(
            grid.iter().filter(|c| c.called).map(|c| c.value).collect::<Vec<_>>(),
            [2, 4]
        );
    }

    #[test]
    fn missing_range_defaults_to_one_through_seventy_five() {
        let view = BoardView::project(&snapshot(json!({})));
        assert_eq!(view.title, "Live Board");
        assert_eq!(view.grid.map(|grid| grid.cells().len()), Some(75));
    }

    #[test]
    fn raffle_shows_winners_only() {
        let view = BoardView::project(&snapshot(json!({
            "game": {"name": "Door Prizes", "status": "STARTED", "type": "RAFFLE"},
            "called": [1, 2, 3],
            "winners": [
                {"rank": 2, "displayName": "Sam", "pattern": "RAFFLE"},
                {"rank": 1, "displayName": "Pat", "pattern": "RAFFLE"}
            ]
        })));
        assert!(view.grid.is_none());
        assert_eq!(
            view.winners.iter().map(|w| w.rank).collect::<Vec<_>>(),
            [1, 2]
        );
        let text = view.to_string();
        assert!(text.contains("#1 Pat — RAFFLE\n  #2 Sam — RAFFLE"));
        assert!(!text.contains('['));
    }

    #[test]
    fn renders_called_numbers_in_brackets() {
        let view = BoardView::project(&snapshot(json!({
            "lastValue": 3,
            "called": [3],
            "numberMin": 1,
            "numberMax": 3
        })));
        assert_eq!(
            view.to_string(),
            "Live Board\nLast: 3\n   1    2 [  3]\nWinners:\n"
        );
    }

    #[test]
    fn oversized_range_is_not_materialized() {
        for max in [5_000_000, i64::MAX] {
            let view = BoardView::project(&snapshot(json!({
                "called": [1],
                "numberMin": 1,
                "numberMax": max
            })));
            assert_eq!(view.grid, Some(NumberGrid::TooLarge { min: 1, max }));
            assert!(view.to_string().contains("range too large to draw"));
        }

        let widest = BoardView::project(&snapshot(json!({
            "numberMin": 1,
            "numberMax": MAX_GRID_CELLS
        })));
        assert_eq!(widest.grid.unwrap().cells().len(), MAX_GRID_CELLS as usize);
    }
}
