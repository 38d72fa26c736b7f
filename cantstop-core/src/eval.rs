//! Static evaluation of a position and ordering of candidate moves.
//!
//! Each column is priced in expected rolls to finish: steps still needed times
//! the average number of rolls per hit (1296 / hits). Only the cheapest
//! columns that are still needed to win are compared between the players.

use std::cmp::Ordering;

use crate::board::{BoardState, Column, Player};
use crate::dice;
use crate::NUM_COLUMNS;

/// Evaluation of one position from one player's point of view.
#[derive(Clone, Debug)]
pub struct MoveInfo {
    /// The position that was evaluated.
    pub state: BoardState,
    /// Columns the player has completed in `state`.
    pub columns_won: usize,
    /// Rolls the player is ahead over the columns still needed to win.
    pub score: f64,
    /// Total lead over every contested column where the player is ahead.
    pub tie_break_score: f64,
    /// Markers still unused in `state`.
    pub free_counters: usize,
}

impl MoveInfo {
    /// Steps taken so far this turn in the evaluated position.
    #[inline]
    pub fn total_move_length(&self) -> u32 {
        self.state.total_move_length()
    }
}

/// Expected rolls for `player` to finish `column` from `state`.
#[inline]
pub fn expected_rolls(state: &BoardState, player: Player, column: Column) -> f64 {
    let steps = state.config().board_height() - state.progress(player, column);
    dice::rolls_per_step(column) * steps as f64
}

/// Evaluate `state` for `player`.
pub fn evaluate(state: &BoardState, player: Player) -> MoveInfo {
    let opponent = player.opponent();
    let mut mine = [0.0f64; NUM_COLUMNS];
    let mut theirs = [0.0f64; NUM_COLUMNS];
    let mut contested = 0;
    let mut columns_won = 0;
    let mut tie_break_score = 0.0;

    for column in Column::all() {
        if state.completed_column(player, column) {
            columns_won += 1;
        } else if !state.completed_column(opponent, column) {
            let my_rolls = expected_rolls(state, player, column);
            let their_rolls = expected_rolls(state, opponent, column);
            if my_rolls < their_rolls {
                tie_break_score += their_rolls - my_rolls;
            }
            mine[contested] = my_rolls;
            theirs[contested] = their_rolls;
            contested += 1;
        }
    }

    let mine = &mut mine[..contested];
    let theirs = &mut theirs[..contested];
    mine.sort_by(f64::total_cmp);
    theirs.sort_by(f64::total_cmp);

    let needed = (state.config().columns_to_win() as usize).saturating_sub(columns_won);
    let score: f64 = mine
        .iter()
        .zip(theirs.iter())
        .take(needed)
        .map(|(m, t)| t - m)
        .sum();

    MoveInfo {
        state: state.clone(),
        columns_won,
        score,
        tie_break_score,
        free_counters: state.free_counters(),
    }
}

/// Order two evaluations so that the better one sorts first.
///
/// Priority: completed columns, free markers, score, tie-break score, then
/// the longer move.
pub fn compare_moves(a: &MoveInfo, b: &MoveInfo) -> Ordering {
    b.columns_won
        .cmp(&a.columns_won)
        .then_with(|| b.free_counters.cmp(&a.free_counters))
        .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
        .then_with(|| {
            b.tie_break_score
                .partial_cmp(&a.tie_break_score)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| b.total_move_length().cmp(&a.total_move_length()))
}
