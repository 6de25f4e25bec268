//! Second phase of a move: apply recorded merges, spawn, and detect the
//! end of the game.

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Absorbed, Board};
use crate::score::Scores;
use crate::spawn::{spawn_tile, Spawned, TileIds};
use crate::WIN_VALUE;

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terminal {
    Won,
    Lost,
}

/// A merge applied during settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merge {
    /// Cell the surviving tile sits in.
    pub index: usize,
    /// The value after doubling.
    pub value: u32,
    /// The tile that was absorbed; its id is retired.
    pub retired: Absorbed,
}

/// Everything a settlement changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub merges: Vec<Merge>,
    /// Points earned from merges.
    pub reward: u32,
    pub spawned: Option<Spawned>,
    pub terminal: Option<Terminal>,
}

/// Settle a resolved move.
///
/// Every pending merge is doubled exactly once and credited to `scores`.
/// A new tile is then spawned into a random empty cell. A merge reaching
/// [`WIN_VALUE`] wins; otherwise a full board with no adjacent equal pair
/// loses.
pub fn finalize<R: Rng + ?Sized>(
    board: &mut Board,
    scores: &mut Scores,
    ids: &mut TileIds,
    rng: &mut R,
) -> Settlement {
    let mut merges = Vec::new();
    let mut reward = 0u32;
    let mut won = false;

    for index in 0..crate::CELL_COUNT {
        let Some(tile) = board.get_mut(index) else {
            continue;
        };
        let Some(retired) = tile.pending.take() else {
            continue;
        };
        tile.value *= 2;
        reward += tile.value;
        scores.add(tile.value);
        won |= tile.value == WIN_VALUE;
        merges.push(Merge {
            index,
            value: tile.value,
            retired,
        });
    }

    let spawned = spawn_tile(board, ids, rng);

    let terminal = if won {
        Some(Terminal::Won)
    } else if board.is_stuck() {
        Some(Terminal::Lost)
    } else {
        None
    };

    debug!(
        "settled {} merge(s), reward {}, spawned {:?}, terminal {:?}",
        merges.len(),
        reward,
        spawned.map(|s| (s.index, s.tile.value)),
        terminal
    );

    Settlement {
        merges,
        reward,
        spawned,
        terminal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;
    use crate::engine::resolve_move;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn setup(values: [u32; 16]) -> (Board, TileIds) {
        let (board, next) = Board::from_values(values);
        (board, TileIds::starting_at(next))
    }

    fn settle(board: &mut Board, ids: &mut TileIds, seed: u64) -> Settlement {
        let mut rng = SmallRng::seed_from_u64(seed);
        finalize(board, &mut Scores::default(), ids, &mut rng)
    }

    #[test]
    fn test_pair_doubles_and_scores() {
        let (mut board, mut ids) = setup([2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let mut scores = Scores::default();
        resolve_move(&mut board, Direction::Left);
        let mut rng = SmallRng::seed_from_u64(3);
        let settlement = finalize(&mut board, &mut scores, &mut ids, &mut rng);

        assert_eq!(board.get(0).map(|t| (t.value, t.pending)), Some((4, None)));
        assert_eq!(settlement.reward, 4);
        assert_eq!((scores.current, scores.best), (4, 4));
        assert_eq!(settlement.merges.len(), 1);
        assert_eq!(settlement.merges[0].retired.value, 2);
        assert!(settlement.spawned.is_some());
        assert_eq!(settlement.terminal, None);
        assert!(!board.has_pending_merges());
    }

    #[test]
    fn test_spawn_gets_a_fresh_id() {
        let (mut board, mut ids) = setup([2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        resolve_move(&mut board, Direction::Left);
        let settlement = settle(&mut board, &mut ids, 0);
        let spawned = settlement.spawned.unwrap();
        assert_eq!(spawned.tile.id.0, 2);
        assert_ne!(spawned.tile.id, settlement.merges[0].retired.id);
    }

    #[test]
    fn test_win_on_2048() {
        let (mut board, mut ids) = setup([1024, 1024, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        resolve_move(&mut board, Direction::Left);
        let settlement = settle(&mut board, &mut ids, 5);
        assert_eq!(settlement.terminal, Some(Terminal::Won));
        assert_eq!(board.max_tile(), 2048);
    }

    #[test]
    fn test_win_takes_precedence_over_loss() {
        // After the 1024s merge the spawn fills cell 3, leaving a full board
        // with no adjacent pair, yet the merge still wins.
        let (mut board, mut ids) = setup([
            1024, 1024, 8, 16, 32, 64, 128, 256, 8, 16, 32, 64, 128, 256, 512, 8,
        ]);
        resolve_move(&mut board, Direction::Left);
        // Row 0 is now [1024+1024, 8, 16, _].
        let settlement = settle(&mut board, &mut ids, 1);
        assert!(board.is_full());
        assert_eq!(settlement.terminal, Some(Terminal::Won));
    }

    #[test]
    fn test_loss_when_last_gap_fills_without_pairs() {
        // Cell 0 is the only gap and its neighbours are 16 and 128, so the
        // board is stuck whichever value spawns there.
        let (mut board, mut ids) = setup([
            0, 16, 32, 64, 128, 256, 512, 1024, 16, 32, 64, 128, 256, 512, 1024, 2,
        ]);
        let settlement = settle(&mut board, &mut ids, 2);
        assert_eq!(settlement.spawned.map(|s| s.index), Some(0));
        assert!(board.is_full());
        assert_eq!(settlement.terminal, Some(Terminal::Lost));
    }

    #[test]
    fn test_full_board_with_pair_is_not_lost() {
        let (mut board, mut ids) = setup([
            0, 8, 16, 32, 8, 8, 64, 128, 256, 512, 1024, 4, 16, 32, 64, 128,
        ]);
        let settlement = settle(&mut board, &mut ids, 2);
        assert!(board.is_full());
        assert_eq!(settlement.terminal, None);
    }

    #[test]
    fn test_score_accumulates_all_merges() {
        let (mut board, mut ids) = setup([8, 8, 8, 8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let mut scores = Scores::with_best(50);
        scores.add(10);
        resolve_move(&mut board, Direction::Left);
        let mut rng = SmallRng::seed_from_u64(4);
        let settlement = finalize(&mut board, &mut scores, &mut ids, &mut rng);
        assert_eq!(settlement.reward, 32);
        assert_eq!((scores.current, scores.best), (42, 50));
    }
}
