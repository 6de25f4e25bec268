//! Grid data model.
//!
//! The board is a flat array of 16 cells stored in row-major order
//! (indices 0-3 are row 0, 4-7 are row 1, etc.). A cell is either empty
//! or holds one [`Tile`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CELL_COUNT, GRID_SIZE, MAX_TILE_VALUE};

/// Stable identity of a tile, used by renderers as an animation key.
///
/// Ids are issued by [`crate::TileIds`] and never reused within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u32);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A tile that slid into a cell and will be merged into it at settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Absorbed {
    pub value: u32,
    pub id: TileId,
}

/// A numbered tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub value: u32,
    pub id: TileId,
    /// Set between a resolved move and its settlement; `None` otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<Absorbed>,
}

impl Tile {
    pub fn new(value: u32, id: TileId) -> Self {
        Tile {
            value,
            id,
            pending: None,
        }
    }

    fn absorbed(&self) -> Absorbed {
        Absorbed {
            value: self.value,
            id: self.id,
        }
    }

    /// Value after settlement, counting a pending absorbed tile.
    fn settled_value(&self) -> u64 {
        u64::from(self.value) + self.pending.map_or(0, |a| u64::from(a.value))
    }
}

/// Cell text for board printing: `value+absorbed` while a merge is pending.
fn cell_label(tile: Tile) -> String {
    match tile.pending {
        Some(a) => format!("{}+{}", tile.value, a.value),
        None => tile.value.to_string(),
    }
}

/// Whether tiles of values `a` and `b` combine when they meet.
///
/// Tiles at [`MAX_TILE_VALUE`] are final and never merge.
pub(crate) fn can_merge(a: u32, b: u32) -> bool {
    a == b && a != 0 && a < MAX_TILE_VALUE
}

/// The 4x4 grid.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Board {
    cells: [Option<Tile>; CELL_COUNT],
}

impl Board {
    /// A board with no tiles.
    pub const EMPTY: Board = Board {
        cells: [None; CELL_COUNT],
    };

    pub fn from_cells(cells: [Option<Tile>; CELL_COUNT]) -> Self {
        Board { cells }
    }

    /// Build a board from plain values (0 = empty), issuing ids in index
    /// order starting at 0. Returns the board and the next unused id.
    pub fn from_values(values: [u32; CELL_COUNT]) -> (Board, u32) {
        let mut board = Board::EMPTY;
        let mut next = 0;
        for (cell, &value) in board.cells.iter_mut().zip(values.iter()) {
            if value != 0 {
                *cell = Some(Tile::new(value, TileId(next)));
                next += 1;
            }
        }
        (board, next)
    }

    pub fn cells(&self) -> &[Option<Tile>; CELL_COUNT] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> Option<&Tile> {
        self.cells[index].as_ref()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Tile> {
        self.cells[index].as_mut()
    }

    pub fn set(&mut self, index: usize, tile: Tile) {
        self.cells[index] = Some(tile);
    }

    pub fn clear(&mut self, index: usize) {
        self.cells[index] = None;
    }

    /// Tile values in row-major order, 0 for empty cells.
    pub fn values(&self) -> [u32; CELL_COUNT] {
        std::array::from_fn(|i| self.cells[i].map_or(0, |t| t.value))
    }

    /// Indices of all empty cells, ascending.
    pub fn empty_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn max_tile(&self) -> u32 {
        self.cells
            .iter()
            .flatten()
            .map(|t| t.value)
            .max()
            .unwrap_or(0)
    }

    /// Sum of all tile values, counting pending absorbed tiles.
    pub fn total(&self) -> u64 {
        self.cells.iter().flatten().map(Tile::settled_value).sum()
    }

    pub fn has_pending_merges(&self) -> bool {
        self.cells.iter().flatten().any(|t| t.pending.is_some())
    }

    /// Whether any two orthogonally adjacent cells could merge.
    ///
    /// Cell `i` is compared with `i + 4` below it and, unless it sits in
    /// the last column, with `i + 1` to its right. Empty cells never match.
    pub fn has_adjacent_pair(&self) -> bool {
        let values = self.values();
        (0..CELL_COUNT).any(|i| {
            let below = i + GRID_SIZE < CELL_COUNT && can_merge(values[i], values[i + GRID_SIZE]);
            let right = i % GRID_SIZE != GRID_SIZE - 1 && can_merge(values[i], values[i + 1]);
            below || right
        })
    }

    /// A full board with no adjacent equal pair admits no move.
    pub fn is_stuck(&self) -> bool {
        self.is_full() && !self.has_adjacent_pair()
    }

    /// Record that the tile at `from` slid into `into` and will merge there.
    pub(crate) fn absorb(&mut self, into: usize, from: usize) {
        if let (Some(source), Some(target)) = (self.cells[from], self.cells[into].as_mut()) {
            target.pending = Some(source.absorbed());
        }
        self.cells[from] = None;
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                match self.cells[row * GRID_SIZE + col] {
                    None => write!(f, "      .")?,
                    Some(tile) => write!(f, "{:>7}", cell_label(tile))?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "+------+------+------+------+")?;
        for row in 0..GRID_SIZE {
            write!(f, "|")?;
            for col in 0..GRID_SIZE {
                match self.cells[row * GRID_SIZE + col] {
                    None => write!(f, "      |")?,
                    Some(tile) => write!(f, "{:^6}|", cell_label(tile))?,
                }
            }
            writeln!(f)?;
            writeln!(f, "+------+------+------+------+")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values_issues_ids_in_order() {
        let (board, next) = Board::from_values([0, 2, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 8]);
        assert_eq!(next, 3);
        assert_eq!(board.get(1).map(|t| t.id), Some(TileId(0)));
        assert_eq!(board.get(3).map(|t| t.id), Some(TileId(1)));
        assert_eq!(board.get(15).map(|t| t.id), Some(TileId(2)));
        assert!(board.get(0).is_none());
    }

    #[test]
    fn test_empty_cells() {
        let (board, _) = Board::from_values([2, 0, 2, 0, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 0]);
        assert_eq!(board.empty_cells(), vec![1, 3, 15]);
        assert_eq!(board.empty_count(), 3);
        assert!(!board.is_full());
    }

    #[test]
    fn test_stuck_checkerboard() {
        let (board, _) = Board::from_values([2, 4, 2, 4, 4, 2, 4, 2, 2, 4, 2, 4, 4, 2, 4, 2]);
        assert!(board.is_full());
        assert!(!board.has_adjacent_pair());
        assert!(board.is_stuck());
    }

    #[test]
    fn test_horizontal_pair() {
        let (board, _) = Board::from_values([
            2, 2, 4, 8, 4, 8, 16, 32, 8, 16, 32, 64, 16, 32, 64, 128,
        ]);
        assert!(board.has_adjacent_pair());
        assert!(!board.is_stuck());
    }

    #[test]
    fn test_vertical_pair() {
        let (board, _) = Board::from_values([
            2, 4, 8, 16, 2, 8, 16, 32, 4, 16, 32, 64, 8, 32, 64, 128,
        ]);
        assert!(board.has_adjacent_pair());
    }

    #[test]
    fn test_no_wrap_across_rows() {
        // 8 at the end of row 0 and 8 at the start of row 1 are not neighbours.
        let (board, _) = Board::from_values([2, 4, 2, 8, 8, 2, 4, 2, 2, 4, 2, 4, 4, 2, 4, 2]);
        assert!(!board.has_adjacent_pair());
    }

    #[test]
    fn test_empty_cells_never_pair() {
        let (board, _) = Board::from_values([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2]);
        assert!(!board.has_adjacent_pair());
        assert!(!board.is_stuck());
    }

    #[test]
    fn test_max_tiles_never_pair() {
        let max = MAX_TILE_VALUE;
        let (board, _) = Board::from_values([max, max, 2, 4, 4, 2, 4, 2, 2, 4, 2, 4, 4, 2, 4, 2]);
        assert!(!board.has_adjacent_pair());
        assert!(board.is_stuck());
    }

    #[test]
    fn test_absorb() {
        let (mut board, _) = Board::from_values([2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        board.absorb(0, 1);
        assert!(board.get(1).is_none());
        let pending = board.get(0).and_then(|t| t.pending);
        assert_eq!(pending.map(|a| (a.value, a.id)), Some((2, TileId(1))));
        assert_eq!(board.total(), 4);
        assert!(board.has_pending_merges());
    }

    #[test]
    fn test_display_format() {
        let (board, _) = Board::from_values([2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2048]);
        let display = format!("{}", board);
        assert!(display.contains("+------+"));
        assert!(display.contains("2048"));
    }
}
