//! WASM bindings for cantstop-core
//!
//! Provides a JavaScript-friendly API over [`Game`] for a browser front-end.
//! Dice are rolled on the JavaScript side and passed in.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::{AiConfig, BoardState, Column, DecisionEngine, Game, GameConfig, Outcome, Phase, Player};

/// WASM-friendly wrapper around Game
#[wasm_bindgen]
pub struct WasmGame {
    inner: Game,
    engine: DecisionEngine,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a new game on the standard board
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        WasmGame {
            inner: Game::new(GameConfig::default()),
            engine: DecisionEngine::default(),
        }
    }

    /// Create a game from a JSON-like config object, e.g. `{ board_height: 15 }`
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(game: JsValue, ai: JsValue) -> Result<WasmGame, JsError> {
        let config: GameConfig = if game.is_undefined() {
            GameConfig::default()
        } else {
            serde_wasm_bindgen::from_value(game)?
        };
        let ai: AiConfig = if ai.is_undefined() {
            AiConfig::default()
        } else {
            serde_wasm_bindgen::from_value(ai)?
        };
        Ok(WasmGame {
            inner: Game::new(config),
            engine: DecisionEngine::new(ai),
        })
    }

    /// Player to move (1 or 2)
    pub fn turn(&self) -> u8 {
        player_number(self.inner.turn())
    }

    /// Winner: 0 (none), 1 or 2
    pub fn winner(&self) -> u8 {
        self.inner.winner().map_or(0, player_number)
    }

    /// "roll", "choose" or "finished"
    pub fn phase(&self) -> String {
        match self.inner.phase() {
            Phase::AwaitingRoll => "roll".to_string(),
            Phase::AwaitingChoice => "choose".to_string(),
            Phase::Finished(_) => "finished".to_string(),
        }
    }

    /// Cells per column, for laying out the board
    #[wasm_bindgen(js_name = columnLengths)]
    pub fn column_lengths(&self) -> Vec<u8> {
        let config = self.inner.state().config();
        Column::all().map(|c| c.length(config)).collect()
    }

    /// Register four dice. Returns the legal moves as arrays of column numbers;
    /// an empty array means the roll must be forfeited.
    pub fn roll(&mut self, dice: &[u8]) -> Result<JsValue, JsError> {
        let dice: [u8; 4] = dice
            .try_into()
            .map_err(|_| JsError::new("expected four dice"))?;
        let moves = self.inner.roll(dice)?;
        Ok(serde_wasm_bindgen::to_value(&moves.to_vec())?)
    }

    /// Legal moves for the pending roll (empty if none is pending)
    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self) -> Result<JsValue, JsError> {
        let moves = self
            .inner
            .pending_moves()
            .map(|m| m.to_vec())
            .unwrap_or_default();
        Ok(serde_wasm_bindgen::to_value(&moves)?)
    }

    /// Apply move `index` of the pending roll
    #[wasm_bindgen(js_name = chooseMove)]
    pub fn choose_move(&mut self, index: usize) -> Result<String, JsError> {
        Ok(outcome_name(self.inner.choose(index)?))
    }

    /// Give up a roll without legal moves: "passed" or "busted"
    pub fn forfeit(&mut self) -> Result<String, JsError> {
        Ok(outcome_name(self.inner.forfeit()?))
    }

    /// Bank progress: "banked", "won_1" or "won_2"
    pub fn stop(&mut self) -> Result<String, JsError> {
        Ok(outcome_name(self.inner.stop()?))
    }

    /// Computer choice for the pending roll: `{ index, roll_again }` or null
    #[wasm_bindgen(js_name = aiDecision)]
    pub fn ai_decision(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.inner.ai_decision(&self.engine))?)
    }

    /// Snapshot for rendering: working and confirmed progress, current columns
    pub fn state(&self) -> Result<JsValue, JsError> {
        let view = StateView::new(self.inner.state(), self.inner.confirmed());
        Ok(serde_wasm_bindgen::to_value(&view)?)
    }
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new()
    }
}

fn player_number(player: Player) -> u8 {
    player.index() as u8 + 1
}

fn outcome_name(outcome: Outcome) -> String {
    match outcome {
        Outcome::Moved => "moved".to_string(),
        Outcome::Passed => "passed".to_string(),
        Outcome::Busted => "busted".to_string(),
        Outcome::Banked => "banked".to_string(),
        Outcome::Won(player) => format!("won_{}", player_number(player)),
    }
}

/// Serializable board snapshot for JavaScript
#[derive(Serialize)]
struct StateView<'a> {
    turn: u8,
    progress: [&'a [u8; crate::NUM_COLUMNS]; 2],
    confirmed: [&'a [u8; crate::NUM_COLUMNS]; 2],
    current_columns: Vec<u8>,
    free_counters: usize,
    board_height: u8,
}

impl<'a> StateView<'a> {
    fn new(state: &'a BoardState, confirmed: &'a BoardState) -> Self {
        StateView {
            turn: player_number(state.turn()),
            progress: [
                state.column_progress(Player::One),
                state.column_progress(Player::Two),
            ],
            confirmed: [
                confirmed.column_progress(Player::One),
                confirmed.column_progress(Player::Two),
            ],
            current_columns: state.current_columns().iter().map(|c| c.number()).collect(),
            free_counters: state.free_counters(),
            board_height: state.config().board_height(),
        }
    }
}
