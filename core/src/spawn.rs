//! Tile spawning and identity issue.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Tile, TileId};

/// Probability that a spawned tile is a 2 (otherwise 4).
pub const SPAWN_TWO_PROBABILITY: f32 = 0.8;

/// Issues tile ids from a counter. Ids are never handed out twice within a
/// game, so a spawned tile cannot collide with one retired by a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileIds {
    next: u32,
}

impl TileIds {
    /// Continue issuing from `next`, e.g. after restoring a saved board.
    pub fn starting_at(next: u32) -> Self {
        TileIds { next }
    }

    pub fn issue(&mut self) -> TileId {
        let id = TileId(self.next);
        self.next += 1;
        id
    }

    /// The id the next call to [`issue`](Self::issue) returns.
    pub fn peek(&self) -> u32 {
        self.next
    }
}

/// A tile placed by [`spawn_tile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawned {
    pub index: usize,
    pub tile: Tile,
}

/// 2 with probability [`SPAWN_TWO_PROBABILITY`], else 4.
pub fn random_value<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    if rng.gen::<f32>() < SPAWN_TWO_PROBABILITY {
        2
    } else {
        4
    }
}

/// Place a new tile in an empty cell chosen uniformly at random.
///
/// Returns `None` and leaves the board untouched when it is full.
pub fn spawn_tile<R: Rng + ?Sized>(
    board: &mut Board,
    ids: &mut TileIds,
    rng: &mut R,
) -> Option<Spawned> {
    let empty_cells = board.empty_cells();
    if empty_cells.is_empty() {
        return None;
    }

    let index = empty_cells[rng.gen_range(0..empty_cells.len())];
    let tile = Tile::new(random_value(rng), ids.issue());
    board.set(index, tile);
    Some(Spawned { index, tile })
}

/// A fresh board holding two tiles in distinct random cells.
pub fn initial_board<R: Rng + ?Sized>(rng: &mut R) -> (Board, TileIds) {
    let mut board = Board::EMPTY;
    let mut ids = TileIds::default();
    spawn_tile(&mut board, &mut ids, rng);
    spawn_tile(&mut board, &mut ids, rng);
    (board, ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_initial_board_has_two_tiles() {
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let (board, ids) = initial_board(&mut rng);
            assert_eq!(board.empty_count(), 14);
            assert_eq!(ids.peek(), 2);
            for tile in board.cells().iter().flatten() {
                assert!(tile.value == 2 || tile.value == 4);
            }
        }
    }

    #[test]
    fn test_spawn_determinism() {
        let (a, _) = initial_board(&mut SmallRng::seed_from_u64(12345));
        let (b, _) = initial_board(&mut SmallRng::seed_from_u64(12345));
        assert_eq!(a, b);
    }

    #[test]
    fn test_spawn_fills_the_only_gap() {
        let (mut board, next) =
            Board::from_values([2, 4, 2, 4, 4, 2, 4, 2, 2, 4, 0, 4, 4, 2, 4, 2]);
        let mut ids = TileIds::starting_at(next);
        let mut rng = SmallRng::seed_from_u64(7);
        let spawned = spawn_tile(&mut board, &mut ids, &mut rng).unwrap();
        assert_eq!(spawned.index, 10);
        assert_eq!(spawned.tile.id, TileId(15));
        assert!(board.is_full());
    }

    #[test]
    fn test_spawn_on_full_board() {
        let (mut board, next) = Board::from_values([2; 16]);
        let mut ids = TileIds::starting_at(next);
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(spawn_tile(&mut board, &mut ids, &mut rng).is_none());
        assert_eq!(ids.peek(), 16);
    }

    #[test]
    fn test_value_distribution() {
        let mut rng = SmallRng::seed_from_u64(99);
        let twos = (0..10_000).filter(|_| random_value(&mut rng) == 2).count();
        // About 8000 expected.
        assert!((7_500..8_500).contains(&twos), "twos = {twos}");
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut ids = TileIds::default();
        let issued: Vec<TileId> = (0..5).map(|_| ids.issue()).collect();
        assert_eq!(issued, (0..5).map(TileId).collect::<Vec<_>>());
    }
}
