//! Can't Stop rules engine with a heuristic computer player.
//!
//! # Board
//!
//! ```text
//! Eleven columns, one per two-dice sum (2-12). Column c is
//! board_height - 2*|c-7| cells long:
//!
//!   column:  2  3  4  5  6  7  8  9 10 11 12
//!   cells:   3  5  7  9 11 13 11  9  7  5  3
//! ```
//!
//! Each turn the player rolls four dice, pairs them into two sums and steps
//! up the matching columns with at most three temporary markers. They keep
//! rolling until they bank their progress or roll something they cannot use,
//! which loses the whole turn. Three completed columns win.
//!
//! # Layout
//!
//! - [`BoardState`]: both players' progress plus the turn in progress.
//! - [`possible_moves`]: legal moves for a roll.
//! - [`evaluate`] / [`compare_moves`]: static evaluation and move ordering.
//! - [`DecisionEngine`]: move choice and the roll-again heuristic.
//! - [`Game`]: turn controller over the above.
//!
//! The engine never rolls dice itself; callers supply the four faces.

pub mod ai;
pub mod board;
pub mod config;
pub mod dice;
pub mod error;
pub mod eval;
pub mod game;
pub mod movegen;

#[cfg(feature = "wasm")]
pub mod wasm;

/// Number of columns (dice sums 2 through 12).
pub const NUM_COLUMNS: usize = 11;

pub use ai::{expected_gain, Decision, DecisionEngine};
pub use board::{BoardState, Column, ColumnSet, Player};
pub use config::{AiConfig, ConfigError, GameConfig};
pub use dice::{Dice, COMBINATIONS, OUTCOMES};
pub use error::{GameError, MoveError, StateError};
pub use eval::{compare_moves, evaluate, MoveInfo};
pub use game::{Game, Outcome, Phase};
pub use movegen::{possible_moves, Move, MoveList, MAX_MOVES};
