//! The game controller.
//!
//! A move is played in two phases so a renderer can animate tiles before
//! merged values change:
//!
//! 1. [`Game::begin_move`] slides the tiles and records merges. If
//!    anything moved, the game is latched and ignores further input.
//! 2. [`Game::settle`] (called once the animation is over) doubles merged
//!    tiles, updates the scores, spawns a tile, checks for a win or loss,
//!    saves a snapshot and releases the latch.
//!
//! Callers with nothing to animate use [`Game::step`], which runs both
//! phases back to back.

use std::fmt;

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::direction::Direction;
use crate::engine::resolve_move;
use crate::score::Scores;
use crate::settle::{finalize, Settlement, Terminal};
use crate::snapshot::{Snapshot, SnapshotError};
use crate::spawn::{initial_board, TileIds};
use crate::store::{MemoryStore, StateStore};

/// Why a move request was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ignored {
    /// A previous move has not been settled yet.
    Busy,
    /// The game is won or lost; start a new one.
    Finished,
}

/// Outcome of the first phase of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveStart {
    Ignored(Ignored),
    /// Nothing could move in that direction; no settlement follows.
    Unchanged,
    /// Tiles moved. The game stays latched until [`Game::settle`].
    Moved,
}

/// Result of executing a whole move with [`Game::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    /// Whether the board changed (and a new tile was spawned).
    pub changed: bool,
    /// Points earned from merges in this move.
    pub reward: u32,
    pub terminal: Option<Terminal>,
}

/// A game of 2048 bound to a state store.
pub struct Game<S: StateStore = MemoryStore> {
    board: Board,
    scores: Scores,
    ids: TileIds,
    rng: SmallRng,
    store: S,
    moving: bool,
    terminal: Option<Terminal>,
}

impl Game<MemoryStore> {
    /// Create a new game with the given seed and no prior state.
    ///
    /// The game starts with two random tiles (80% chance of 2, 20% chance of 4).
    pub fn new(seed: u64) -> Self {
        Game::with_store(seed, MemoryStore::new())
    }
}

impl<S: StateStore> Game<S> {
    /// Resume the game saved in `store`, or start a fresh one.
    ///
    /// A snapshot that fails validation is discarded with a warning; its
    /// best score is kept.
    pub fn with_store(seed: u64, mut store: S) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);

        let loaded = match store.load() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("could not load saved game: {err}");
                None
            }
        };

        let (board, ids, scores) = match loaded {
            None => {
                let (board, ids) = initial_board(&mut rng);
                (board, ids, Scores::default())
            }
            Some(snapshot) => match restore(&snapshot) {
                Ok(Some((board, ids))) => {
                    info!("restored saved game, score {}", snapshot.scores.current);
                    (board, ids, snapshot.scores)
                }
                Ok(None) => {
                    let (board, ids) = initial_board(&mut rng);
                    (board, ids, Scores::with_best(snapshot.scores.best))
                }
                Err(err) => {
                    warn!("discarding saved game: {err}");
                    let best = snapshot.scores.best.max(snapshot.scores.current);
                    let (board, ids) = initial_board(&mut rng);
                    (board, ids, Scores::with_best(best))
                }
            },
        };

        let mut game = Game {
            terminal: board.is_stuck().then_some(Terminal::Lost),
            board,
            scores,
            ids,
            rng,
            store,
            moving: false,
        };
        game.persist();
        game
    }

    /// Start phase one of a move.
    pub fn begin_move(&mut self, direction: Direction) -> MoveStart {
        if self.moving {
            debug!("ignoring {direction}: move in progress");
            return MoveStart::Ignored(Ignored::Busy);
        }
        if self.terminal.is_some() {
            return MoveStart::Ignored(Ignored::Finished);
        }
        if !resolve_move(&mut self.board, direction) {
            return MoveStart::Unchanged;
        }
        debug!("moved {direction}");
        self.moving = true;
        MoveStart::Moved
    }

    /// Finish the move started by [`begin_move`](Self::begin_move).
    ///
    /// Returns `None` when no move is waiting to be settled.
    pub fn settle(&mut self) -> Option<Settlement> {
        if !self.moving {
            return None;
        }
        let settlement = finalize(
            &mut self.board,
            &mut self.scores,
            &mut self.ids,
            &mut self.rng,
        );
        match settlement.terminal {
            Some(Terminal::Won) => info!("game won with score {}", self.scores.current),
            Some(Terminal::Lost) => info!("game lost with score {}", self.scores.current),
            None => {}
        }
        self.terminal = settlement.terminal;
        self.moving = false;
        self.persist();
        Some(settlement)
    }

    /// Execute a move in the given direction, settling it immediately.
    ///
    /// If the move doesn't change the board, no tile is spawned.
    pub fn step(&mut self, direction: Direction) -> StepResult {
        if self.begin_move(direction) == MoveStart::Moved {
            if let Some(settlement) = self.settle() {
                return StepResult {
                    changed: true,
                    reward: settlement.reward,
                    terminal: settlement.terminal,
                };
            }
        }
        StepResult {
            changed: false,
            reward: 0,
            terminal: self.terminal,
        }
    }

    /// Discard the current board and deal two new tiles.
    ///
    /// The current score goes back to zero; the best score is kept. Any
    /// unsettled move is dropped.
    pub fn new_game(&mut self) {
        let (board, ids) = initial_board(&mut self.rng);
        self.board = board;
        self.ids = ids;
        self.scores.reset_current();
        self.moving = false;
        self.terminal = None;
        info!("new game, best score {}", self.scores.best);
        self.persist();
    }

    /// The state to persist, or `None` while a move is unsettled.
    pub fn snapshot(&self) -> Option<Snapshot> {
        if self.moving {
            return None;
        }
        Some(match self.terminal {
            Some(Terminal::Lost) => Snapshot::scores_only(self.scores),
            _ => Snapshot::capture(&self.board, &self.ids, self.scores),
        })
    }

    /// Which directions would move at least one tile, as [Up, Down, Left, Right].
    pub fn legal_moves(&self) -> [bool; 4] {
        if self.moving || self.terminal.is_some() {
            return [false; 4];
        }
        Direction::all().map(|direction| {
            let mut board = self.board;
            resolve_move(&mut board, direction)
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    pub fn terminal(&self) -> Option<Terminal> {
        self.terminal
    }

    /// Whether the game is won or lost.
    pub fn is_done(&self) -> bool {
        self.terminal.is_some()
    }

    /// Whether a move is waiting for [`settle`](Self::settle).
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn max_tile(&self) -> u32 {
        self.board.max_tile()
    }

    pub fn empty_count(&self) -> usize {
        self.board.empty_count()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&mut self) {
        let Some(snapshot) = self.snapshot() else {
            return;
        };
        if let Err(err) = self.store.save(&snapshot) {
            warn!("could not save game: {err}");
        }
    }
}

/// Rebuild board and ids from a snapshot; `Ok(None)` if it holds scores only.
fn restore(snapshot: &Snapshot) -> Result<Option<(Board, TileIds)>, SnapshotError> {
    snapshot.validate()?;
    match &snapshot.board {
        Some(saved) => saved.restore().map(Some),
        None => Ok(None),
    }
}

impl<S: StateStore> fmt::Debug for Game<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Game {{ score: {}, best: {}, moving: {}, terminal: {:?} }}",
            self.scores.current, self.scores.best, self.moving, self.terminal
        )?;
        write!(f, "{:?}", self.board)
    }
}

impl<S: StateStore> fmt::Display for Game<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Score: {}  Best: {}",
            self.scores.current, self.scores.best
        )?;
        write!(f, "{}", self.board)
    }
}
