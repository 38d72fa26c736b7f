//! Seat policies for self-play.

use cantstop_core::{BoardState, Decision, DecisionEngine, MoveList};
use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    /// Heuristic decision engine
    Ai,
    /// Random legal move, bank after a fixed number of moves
    Baseline,
}

#[derive(Clone, Copy, Debug)]
pub enum Policy {
    Ai(DecisionEngine),
    Baseline { moves_per_turn: u32 },
}

impl Policy {
    pub fn new(kind: PolicyKind, engine: DecisionEngine, moves_per_turn: u32) -> Self {
        match kind {
            PolicyKind::Ai => Policy::Ai(engine),
            PolicyKind::Baseline => Policy::Baseline { moves_per_turn },
        }
    }

    /// Pick a move and whether to keep rolling. None if the roll has no move.
    ///
    /// `moves_this_turn` counts moves already made this turn, before this one.
    pub fn decide(
        &self,
        state: &BoardState,
        moves: &MoveList,
        moves_this_turn: u32,
        rng: &mut StdRng,
    ) -> Option<Decision> {
        match self {
            Policy::Ai(engine) => engine.choose_move(state, moves),
            Policy::Baseline { moves_per_turn } => {
                if moves.is_empty() {
                    return None;
                }
                Some(Decision {
                    index: rng.random_range(0..moves.len()),
                    roll_again: moves_this_turn + 1 < *moves_per_turn,
                })
            }
        }
    }
}
