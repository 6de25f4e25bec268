//! # 2048 WebAssembly Bindings
//!
//! JavaScript-friendly bindings to the 2048 rules engine using
//! wasm-bindgen. The page drives the two-phase move protocol:
//!
//! ```js
//! const game = new WasmGame(BigInt(Date.now()));
//! const result = game.beginMove(2);          // Left
//! if (result.outcome === "moved") {
//!   render(result.state);                     // animate, merges still pending
//!   section.ontransitionend = () => render(game.settle().state);
//! }
//! ```
//!
//! The game is saved to `localStorage` whenever a move settles.

mod storage;

use serde::Serialize;
use slide2048_core::{
    classify_swipe, Direction, Game, Ignored, MoveStart, Scores, Settlement, Terminal, Tile,
    CELL_COUNT,
};
use wasm_bindgen::prelude::*;

pub use storage::{LocalStorageStore, STORAGE_KEY};

/// Board, scores and status, serialized for JavaScript.
#[derive(Serialize)]
pub struct JsState<'a> {
    /// 16 cells in row-major order; `null` for empty cells.
    pub cells: &'a [Option<Tile>; CELL_COUNT],
    pub scores: Scores,
    /// `"won"`, `"lost"` or `null`.
    pub terminal: Option<Terminal>,
    /// Whether a move is waiting for `settle()`.
    pub moving: bool,
}

/// Result of `beginMove`.
#[derive(Serialize)]
pub struct JsMoveResult<'a> {
    /// One of `moved`, `unchanged`, `busy`, `finished` or `invalid`.
    pub outcome: &'static str,
    pub state: JsState<'a>,
}

/// Result of `settle`.
#[derive(Serialize)]
pub struct JsSettleResult<'a> {
    pub settlement: Settlement,
    pub state: JsState<'a>,
}

/// WebAssembly wrapper for the 2048 game.
#[wasm_bindgen]
pub struct WasmGame {
    game: Game<LocalStorageStore>,
}

#[wasm_bindgen]
impl WasmGame {
    /// Resume the game saved in `localStorage`, or start a new one.
    ///
    /// The seed initializes the deterministic RNG used for spawns.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> WasmGame {
        WasmGame {
            game: Game::with_store(seed, LocalStorageStore::new(STORAGE_KEY)),
        }
    }

    /// Start a move in the given direction.
    ///
    /// Action values:
    /// - 0 = Up
    /// - 1 = Down
    /// - 2 = Left
    /// - 3 = Right
    ///
    /// Anything else is ignored with outcome `invalid`.
    #[wasm_bindgen(js_name = beginMove)]
    pub fn begin_move(&mut self, action: u8) -> JsValue {
        self.begin(Direction::from_u8(action))
    }

    /// Start a move from a `KeyboardEvent.key` such as `"ArrowUp"`.
    #[wasm_bindgen(js_name = beginMoveByKey)]
    pub fn begin_move_by_key(&mut self, key: &str) -> JsValue {
        self.begin(Direction::from_key_name(key))
    }

    /// Start a move from a swipe, given `start - end` touch offsets in pixels.
    #[wasm_bindgen(js_name = beginMoveBySwipe)]
    pub fn begin_move_by_swipe(&mut self, dx: f64, dy: f64) -> JsValue {
        self.begin(classify_swipe(dx, dy))
    }

    /// Finish the pending move once its animation has ended.
    ///
    /// Returns `null` when no move is pending.
    pub fn settle(&mut self) -> JsValue {
        match self.game.settle() {
            Some(settlement) => to_js(&JsSettleResult {
                settlement,
                state: self.state(),
            }),
            None => JsValue::NULL,
        }
    }

    /// Start a new game, keeping the best score.
    #[wasm_bindgen(js_name = newGame)]
    pub fn new_game(&mut self) -> JsValue {
        self.game.new_game();
        to_js(&self.state())
    }

    /// Current board, scores and status.
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> JsValue {
        to_js(&self.state())
    }

    /// Get the current board values (0 for empty), row-major.
    #[wasm_bindgen(js_name = getBoard)]
    pub fn get_board(&self) -> Vec<u32> {
        self.game.board().values().to_vec()
    }

    #[wasm_bindgen(js_name = getScore)]
    pub fn get_score(&self) -> u32 {
        self.game.scores().current
    }

    #[wasm_bindgen(js_name = getBestScore)]
    pub fn get_best_score(&self) -> u32 {
        self.game.scores().best
    }

    /// Check if the game is won or lost.
    #[wasm_bindgen(js_name = isDone)]
    pub fn is_done(&self) -> bool {
        self.game.is_done()
    }

    /// Whether a move is waiting for `settle()`.
    #[wasm_bindgen(js_name = isMoving)]
    pub fn is_moving(&self) -> bool {
        self.game.is_moving()
    }

    /// The settled state as JSON, or `undefined` while a move is pending.
    pub fn snapshot(&self) -> Option<String> {
        self.game.snapshot().and_then(|s| s.to_json().ok())
    }
}

impl WasmGame {
    fn begin(&mut self, direction: Option<Direction>) -> JsValue {
        let outcome = match direction {
            Some(direction) => outcome_name(self.game.begin_move(direction)),
            None => "invalid",
        };
        to_js(&JsMoveResult {
            outcome,
            state: self.state(),
        })
    }

    fn state(&self) -> JsState<'_> {
        JsState {
            cells: self.game.board().cells(),
            scores: self.game.scores(),
            terminal: self.game.terminal(),
            moving: self.game.is_moving(),
        }
    }
}

fn outcome_name(start: MoveStart) -> &'static str {
    match start {
        MoveStart::Moved => "moved",
        MoveStart::Unchanged => "unchanged",
        MoveStart::Ignored(Ignored::Busy) => "busy",
        MoveStart::Ignored(Ignored::Finished) => "finished",
    }
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}
