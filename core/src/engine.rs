//! Slide-and-merge.
//!
//! A move is resolved in place, one line at a time, using the parameters
//! from [`Direction::walk`]. Merges are only *recorded* here: the
//! surviving tile keeps its pre-merge value and carries the absorbed
//! tile in [`Tile::pending`](crate::Tile::pending) until
//! [`finalize`](crate::finalize) doubles it. This lets a renderer animate
//! both tiles sliding to the same cell before the value changes.

use crate::board::{can_merge, Board};
use crate::direction::Direction;
use crate::GRID_SIZE;

/// Slide every line of `board` toward the edge named by `direction`,
/// flagging pairwise merges.
///
/// Returns `true` if at least one tile changed cell. The board must not
/// carry pending merges from an earlier, unsettled move.
pub fn resolve_move(board: &mut Board, direction: Direction) -> bool {
    debug_assert!(
        !board.has_pending_merges(),
        "resolve_move on an unsettled board"
    );

    let walk = direction.walk();
    let mut changed = false;
    for line in 0..GRID_SIZE {
        changed |= slide_line(board, walk.origin(line), walk.tile_step);
    }
    changed
}

/// Compact one line toward `origin`.
///
/// `edge` is the cell the next incoming tile lands on or merges into. It
/// only moves away from the edge, and it skips past any cell holding a
/// pending merge, so each tile takes part in at most one merge per move.
fn slide_line(board: &mut Board, origin: usize, tile_step: isize) -> bool {
    let mut changed = false;
    let mut edge = origin;
    let mut n = origin;

    for _ in 1..GRID_SIZE {
        n = n.wrapping_add_signed(tile_step);
        let Some(incoming) = board.get(n).copied() else {
            continue;
        };

        let target = board.get(edge).copied();
        if target.is_some_and(|t| can_merge(t.value, incoming.value)) {
            board.absorb(edge, n);
        } else {
            if target.is_some() {
                edge = edge.wrapping_add_signed(tile_step);
            }
            board.set(edge, incoming);
        }

        if edge != n {
            board.clear(n);
            changed = true;
        }
        if board.get(edge).is_some_and(|t| t.pending.is_some()) {
            edge = edge.wrapping_add_signed(tile_step);
        }
    }

    changed
}
