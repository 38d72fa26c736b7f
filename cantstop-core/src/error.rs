//! Error kinds for checked state transitions.

use thiserror::Error;

use crate::{Column, Player};

/// Why a move was rejected by [`BoardState::try_execute_move`](crate::BoardState::try_execute_move).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("empty move")]
    Empty,
    #[error("column {0} is already completed by the opponent")]
    OpponentOwned(Column),
    #[error("column {column} cannot advance {steps} more step(s)")]
    Overrun { column: Column, steps: u8 },
    #[error("no free counter left for column {0}")]
    NoFreeCounter(Column),
    #[error("a move advances at most two steps, got {0}")]
    TooLong(usize),
}

/// Why a deserialized or hand-built state was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    #[error("progress {value} for {player:?} in column {column} is outside the column")]
    ProgressOutOfRange {
        player: Player,
        column: Column,
        value: u8,
    },
    #[error("{0} current columns exceed the counter limit")]
    TooManyCounters(usize),
    #[error("invalid column number {0}")]
    InvalidColumn(u8),
    #[error("state is in the middle of a turn")]
    TurnInProgress,
}

/// Why a [`Game`](crate::Game) rejected an input.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error("die value {0} is not between 1 and 6")]
    InvalidDie(u8),
    #[error("a roll is already waiting for a choice")]
    ChoicePending,
    #[error("no roll is waiting for a choice")]
    NoPendingRoll,
    #[error("move index {index} out of range ({len} moves)")]
    MoveOutOfRange { index: usize, len: usize },
    #[error("the roll has no legal move; the turn must be forfeited")]
    MustForfeit,
    #[error("the roll has legal moves; one must be chosen")]
    CannotForfeit,
    #[error("no provisional progress to bank")]
    NothingToBank,
    #[error("the game is over")]
    Finished,
}
