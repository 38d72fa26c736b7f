//! Turn controller: roll, choose, bank or bust.
//!
//! Keeps the working state next to a copy taken at the start of the turn.
//! Busting throws the working state away and continues from that copy.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::{Decision, DecisionEngine};
use crate::board::{BoardState, Player};
use crate::config::GameConfig;
use crate::dice::Dice;
use crate::error::{GameError, StateError};
use crate::movegen::{possible_moves, MoveList};

/// What the game is waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// The player to move may roll, or bank if they have moved this turn.
    AwaitingRoll,
    /// A roll is waiting for a move choice (or a forfeit if it has none).
    AwaitingChoice,
    /// Someone has won.
    Finished(Player),
}

/// Result of one accepted input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// A move was applied; the turn continues.
    Moved,
    /// The roll had no move and nothing was at stake; the turn passes.
    Passed,
    /// The roll had no move; this turn's progress is lost.
    Busted,
    /// Progress was banked; the turn passes.
    Banked,
    /// Progress was banked and won the game.
    Won(Player),
}

/// A game in progress.
#[derive(Clone, Debug)]
pub struct Game {
    state: BoardState,
    confirmed: BoardState,
    pending: Option<MoveList>,
    winner: Option<Player>,
}

impl Game {
    /// Start a new game with player one to move.
    pub fn new(config: GameConfig) -> Game {
        let state = BoardState::new(config);
        Game {
            confirmed: state.clone(),
            state,
            pending: None,
            winner: None,
        }
    }

    /// Continue from a position at the start of a turn.
    pub fn from_state(state: BoardState) -> Result<Game, StateError> {
        if !state.current_columns().is_empty() {
            return Err(StateError::TurnInProgress);
        }
        let winner = state.winner();
        Ok(Game {
            confirmed: state.clone(),
            state,
            pending: None,
            winner,
        })
    }

    /// Working state, including this turn's provisional progress.
    #[inline]
    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// State at the start of the current turn.
    #[inline]
    pub fn confirmed(&self) -> &BoardState {
        &self.confirmed
    }

    #[inline]
    pub fn turn(&self) -> Player {
        self.state.turn()
    }

    #[inline]
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Moves offered for the roll in hand, if any.
    #[inline]
    pub fn pending_moves(&self) -> Option<&MoveList> {
        self.pending.as_ref()
    }

    pub fn phase(&self) -> Phase {
        match (self.winner, &self.pending) {
            (Some(player), _) => Phase::Finished(player),
            (None, Some(_)) => Phase::AwaitingChoice,
            (None, None) => Phase::AwaitingRoll,
        }
    }

    fn ensure_running(&self) -> Result<(), GameError> {
        match self.winner {
            Some(_) => Err(GameError::Finished),
            None => Ok(()),
        }
    }

    /// Register a roll and return the legal moves for it.
    ///
    /// An empty list means the roll must be forfeited.
    pub fn roll(&mut self, dice: Dice) -> Result<&MoveList, GameError> {
        self.ensure_running()?;
        if self.pending.is_some() {
            return Err(GameError::ChoicePending);
        }
        if let Some(&bad) = dice.iter().find(|&&d| !(1..=6).contains(&d)) {
            return Err(GameError::InvalidDie(bad));
        }
        let moves = possible_moves(&self.state, &dice);
        debug!(player = ?self.turn(), ?dice, moves = moves.len(), "rolled");
        Ok(self.pending.insert(moves))
    }

    /// Apply move `index` of the pending roll.
    pub fn choose(&mut self, index: usize) -> Result<Outcome, GameError> {
        self.ensure_running()?;
        let moves = self.pending.ok_or(GameError::NoPendingRoll)?;
        if moves.is_empty() {
            return Err(GameError::MustForfeit);
        }
        let mov = moves.get(index).ok_or(GameError::MoveOutOfRange {
            index,
            len: moves.len(),
        })?;
        self.state.execute_move(mov);
        self.pending = None;
        Ok(Outcome::Moved)
    }

    /// Give up a roll that has no legal move.
    ///
    /// Provisional progress is lost and the turn passes.
    pub fn forfeit(&mut self) -> Result<Outcome, GameError> {
        self.ensure_running()?;
        let moves = self.pending.ok_or(GameError::NoPendingRoll)?;
        if !moves.is_empty() {
            return Err(GameError::CannotForfeit);
        }
        let outcome = if self.state.current_columns().is_empty() {
            Outcome::Passed
        } else {
            Outcome::Busted
        };
        debug!(player = ?self.turn(), ?outcome, "no legal move");
        self.state = self.confirmed.clone();
        self.state.end_turn();
        self.confirmed = self.state.clone();
        self.pending = None;
        Ok(outcome)
    }

    /// Bank this turn's progress and pass the turn.
    pub fn stop(&mut self) -> Result<Outcome, GameError> {
        self.ensure_running()?;
        if self.pending.is_some() {
            return Err(GameError::ChoicePending);
        }
        if self.state.current_columns().is_empty() {
            return Err(GameError::NothingToBank);
        }
        self.state.end_turn();
        self.confirmed = self.state.clone();
        self.winner = self.state.winner();
        Ok(match self.winner {
            Some(player) => Outcome::Won(player),
            None => Outcome::Banked,
        })
    }

    /// Ask the computer player about the pending roll.
    ///
    /// None if no roll is pending or it has no legal move.
    pub fn ai_decision(&self, engine: &DecisionEngine) -> Option<Decision> {
        let moves = self.pending.as_ref()?;
        engine.choose_move(&self.state, moves)
    }
}
