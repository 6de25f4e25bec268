//! Persistable game state.
//!
//! A snapshot is a structural dump of the settled board, the scores and
//! the id counter. Snapshots come back from storage we do not control, so
//! [`Snapshot::validate`] checks every board invariant before a game is
//! restored from one.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Tile};
use crate::score::Scores;
use crate::spawn::TileIds;
use crate::{CELL_COUNT, MAX_TILE_VALUE};

/// Upper bound on a restored id counter.
///
/// Every spawn adds at least 2 to the board total, which can never exceed
/// 16 tiles of [`MAX_TILE_VALUE`], so a game issues fewer than 2^20 ids
/// after any restore and a counter below this bound cannot overflow.
pub const MAX_NEXT_ID: u32 = 1 << 24;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("expected 16 cells, found {0}")]
    CellCount(usize),
    #[error("cell {index} holds invalid value {value}")]
    Value { index: usize, value: u32 },
    #[error("cell {0} carries an unsettled merge")]
    Unsettled(usize),
    #[error("tile id {0} is used by more than one cell")]
    DuplicateId(u32),
    #[error("tile id {id} is not below the id counter {next}")]
    IdOutOfRange { id: u32, next: u32 },
    #[error("id counter {0} is past the limit")]
    CounterExhausted(u32),
    #[error("best score {best} is below current score {current}")]
    Scores { current: u32, best: u32 },
    #[error("malformed snapshot: {0}")]
    Json(String),
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        SnapshotError::Json(err.to_string())
    }
}

/// The board half of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedBoard {
    pub cells: Vec<Option<Tile>>,
    pub next_id: u32,
}

/// Everything needed to resume a game.
///
/// `board` is `None` once a game has been lost: the scores survive but the
/// next session starts a new game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub scores: Scores,
    #[serde(default)]
    pub board: Option<SavedBoard>,
}

impl SavedBoard {
    pub fn capture(board: &Board, ids: &TileIds) -> Self {
        SavedBoard {
            cells: board.cells().to_vec(),
            next_id: ids.peek(),
        }
    }

    /// Rebuild the board, checking cell count, values, ids and the counter.
    pub fn restore(&self) -> Result<(Board, TileIds), SnapshotError> {
        let cells: [Option<Tile>; CELL_COUNT] = self
            .cells
            .as_slice()
            .try_into()
            .map_err(|_| SnapshotError::CellCount(self.cells.len()))?;
        if self.next_id > MAX_NEXT_ID {
            return Err(SnapshotError::CounterExhausted(self.next_id));
        }

        let mut seen = HashSet::new();
        for (index, tile) in cells.iter().enumerate() {
            let Some(tile) = tile else { continue };
            if !is_tile_value(tile.value) {
                return Err(SnapshotError::Value {
                    index,
                    value: tile.value,
                });
            }
            if tile.pending.is_some() {
                return Err(SnapshotError::Unsettled(index));
            }
            if tile.id.0 >= self.next_id {
                return Err(SnapshotError::IdOutOfRange {
                    id: tile.id.0,
                    next: self.next_id,
                });
            }
            if !seen.insert(tile.id) {
                return Err(SnapshotError::DuplicateId(tile.id.0));
            }
        }

        let ids = TileIds::starting_at(self.next_id);
        Ok((Board::from_cells(cells), ids))
    }
}

impl Snapshot {
    pub fn capture(board: &Board, ids: &TileIds, scores: Scores) -> Self {
        Snapshot {
            scores,
            board: Some(SavedBoard::capture(board, ids)),
        }
    }

    /// A snapshot that keeps only the scores.
    pub fn scores_only(scores: Scores) -> Self {
        Snapshot {
            scores,
            board: None,
        }
    }

    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.scores.best < self.scores.current {
            return Err(SnapshotError::Scores {
                current: self.scores.current,
                best: self.scores.best,
            });
        }
        if let Some(board) = &self.board {
            board.restore()?;
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// A power of two between 2 and the largest tile a 4x4 board can hold.
fn is_tile_value(value: u32) -> bool {
    value >= 2 && value <= MAX_TILE_VALUE && value.is_power_of_two()
}
