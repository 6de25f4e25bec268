//! # 2048 Rules Engine
//!
//! The grid simulation behind the 2048 sliding-tile puzzle: tile
//! occupancy, directional slide-and-merge, spawning, win/loss detection
//! and scoring, with a deterministic, seedable PRNG.
//!
//! Moves are played in two phases so that a renderer can animate tiles
//! sliding before merged values change; see [`Game`]. Every tile carries a
//! stable [`TileId`] that renderers can use as an animation key.
//!
//! ## Example
//!
//! ```rust
//! use slide2048_core::{Direction, Game, MoveStart};
//!
//! let mut game = Game::new(42); // Create game with seed 42
//! if game.begin_move(Direction::Left) == MoveStart::Moved {
//!     // ... animate `game.board()` here ...
//!     let settlement = game.settle().expect("a move is pending");
//!     println!("+{} points", settlement.reward);
//! }
//! println!("Score: {}", game.scores().current);
//! ```

pub mod board;
pub mod direction;
pub mod engine;
pub mod game;
pub mod input;
pub mod score;
pub mod settle;
pub mod snapshot;
pub mod spawn;
pub mod store;

pub use board::{Absorbed, Board, Tile, TileId};
pub use direction::{Direction, LineWalk, ParseDirectionError};
pub use engine::resolve_move;
pub use game::{Game, Ignored, MoveStart, StepResult};
pub use input::classify_swipe;
pub use score::Scores;
pub use settle::{finalize, Merge, Settlement, Terminal};
pub use snapshot::{SavedBoard, Snapshot, SnapshotError, MAX_NEXT_ID};
pub use spawn::{initial_board, spawn_tile, Spawned, TileIds, SPAWN_TWO_PROBABILITY};
pub use store::{MemoryStore, StateStore, StoreError};

/// Cells per row and per column.
pub const GRID_SIZE: usize = 4;

/// Cells on the board.
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// A merge producing this value wins the game.
pub const WIN_VALUE: u32 = 2048;

/// Largest tile a 4x4 board can ever hold (2^17). Tiles of this value
/// no longer merge.
pub const MAX_TILE_VALUE: u32 = 1 << 17;
