//! Heuristic computer player.
//!
//! Picks the best-ranked move for the roll in hand, then decides whether to
//! roll again by weighing the expected reward of one more roll against the
//! risk of busting. This is a one-roll lookahead; the opponent's next turn is
//! never considered.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::BoardState;
use crate::config::AiConfig;
use crate::dice::{self, OUTCOMES};
use crate::eval::{compare_moves, evaluate, MoveInfo};
use crate::movegen::{possible_moves, MoveList};

/// The computer's choice for one roll.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Index into the move list that was offered.
    pub index: usize,
    /// Roll again after applying the move (otherwise bank).
    pub roll_again: bool,
}

/// Move ranking plus the gambling heuristic.
#[derive(Clone, Copy, Debug, Default)]
pub struct DecisionEngine {
    config: AiConfig,
}

impl DecisionEngine {
    pub fn new(config: AiConfig) -> Self {
        DecisionEngine { config }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Evaluate every move from the mover's perspective, best first.
    ///
    /// Each entry keeps the index of the move in `moves`. Ties keep their
    /// original order.
    pub fn rank_moves(&self, state: &BoardState, moves: &MoveList) -> Vec<(usize, MoveInfo)> {
        let player = state.turn();
        let mut ranked: Vec<(usize, MoveInfo)> = moves
            .iter()
            .enumerate()
            .map(|(idx, mov)| {
                let mut thinking = state.clone();
                thinking.execute_move(mov);
                (idx, evaluate(&thinking, player))
            })
            .collect();
        ranked.sort_by(|a, b| compare_moves(&a.1, &b.1));
        ranked
    }

    /// Choose a move and whether to keep rolling. None if there is no move.
    pub fn choose_move(&self, state: &BoardState, moves: &MoveList) -> Option<Decision> {
        let (index, best) = self.rank_moves(state, moves).into_iter().next()?;
        let roll_again = self.should_gamble(&best);
        debug!(
            player = ?state.turn(),
            chosen = ?moves.get(index),
            score = best.score,
            roll_again,
            "chose move"
        );
        Some(Decision { index, roll_again })
    }

    /// Decide whether to roll again from the position after the chosen move.
    pub fn should_gamble(&self, best: &MoveInfo) -> bool {
        // A free marker means nothing is at risk yet
        if best.free_counters > 0 {
            return true;
        }
        let state = &best.state;
        let player = state.turn();
        // A column can only be current and completed if it was finished this
        // turn; bank it.
        if state
            .current_columns()
            .iter()
            .any(|c| state.completed_column(player, c))
        {
            return false;
        }
        let margin = expected_gain(state) - state.gain();
        debug!(gain = state.gain(), margin, "gamble margin");
        margin > self.config.gamble_threshold
    }
}

/// Average turn gain after one more roll.
///
/// Every roll with a legal move contributes the current gain plus the best
/// single-move reward for that roll; rolls that bust contribute nothing. The
/// sum is divided by all 1296 outcomes.
pub fn expected_gain(state: &BoardState) -> f64 {
    let config = state.config();
    let mut total = 0.0;
    for roll in dice::all_rolls() {
        let moves = possible_moves(state, &roll);
        let best = moves
            .iter()
            .map(|m| m.reward(config))
            .max_by(f64::total_cmp);
        if let Some(best) = best {
            total += state.gain() + best;
        }
    }
    total / OUTCOMES as f64
}
