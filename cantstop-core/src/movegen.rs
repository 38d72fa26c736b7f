//! Legal move generation for a four-dice roll.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{BoardState, Column};
use crate::config::GameConfig;
use crate::dice::{self, Dice};
use crate::error::MoveError;

/// Steps to take this roll: zero, one or two column ids, kept in ascending
/// order. A repeated column means two steps in the same column.
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(into = "Vec<Column>", try_from = "Vec<Column>")]
pub struct Move {
    steps: [Column; 2],
    len: u8,
}

impl Move {
    pub const EMPTY: Move = Move {
        steps: [Column::MIN; 2],
        len: 0,
    };

    /// One step in one column.
    #[inline]
    pub fn single(column: Column) -> Move {
        let mut mov = Move::EMPTY;
        mov.push(column);
        mov
    }

    /// Two steps in the same column.
    #[inline]
    pub fn double(column: Column) -> Move {
        Move::pair(column, column)
    }

    /// One step in each of two columns.
    #[inline]
    pub fn pair(a: Column, b: Column) -> Move {
        let mut mov = Move::single(a);
        mov.push(b);
        mov
    }

    /// Append a step, keeping the columns sorted.
    #[inline]
    pub fn push(&mut self, column: Column) {
        debug_assert!(self.len < 2);
        self.steps[self.len as usize] = column;
        self.len += 1;
        if self.len == 2 && self.steps[0] > self.steps[1] {
            self.steps.swap(0, 1);
        }
    }

    /// The columns stepped, ascending.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.steps[..self.len as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Summed per-step reward, as accumulated into [`BoardState::gain`].
    pub fn reward(&self, config: &GameConfig) -> f64 {
        self.columns().iter().map(|c| c.step_reward(config)).sum()
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.columns() == other.columns()
    }
}

impl Eq for Move {}

impl std::hash::Hash for Move {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.columns().hash(state);
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.columns().iter().map(|c| c.number()))
            .finish()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.columns() {
            [] => write!(f, "no move"),
            [a] => write!(f, "move on {}", a),
            [a, b] => write!(f, "move on {} and {}", a, b),
            _ => unreachable!(),
        }
    }
}

impl From<Move> for Vec<Column> {
    fn from(mov: Move) -> Vec<Column> {
        mov.columns().to_vec()
    }
}

impl TryFrom<Vec<Column>> for Move {
    type Error = MoveError;

    fn try_from(columns: Vec<Column>) -> Result<Self, Self::Error> {
        if columns.len() > 2 {
            return Err(MoveError::TooLong(columns.len()));
        }
        let mut mov = Move::EMPTY;
        for column in columns {
            mov.push(column);
        }
        Ok(mov)
    }
}

/// At most two moves per pairing, three pairings.
pub const MAX_MOVES: usize = 6;

/// A fixed-size move list that avoids heap allocation.
#[derive(Clone, Copy)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: u8,
}

impl MoveList {
    /// Create an empty move list.
    #[inline]
    pub const fn new() -> MoveList {
        MoveList {
            moves: [Move::EMPTY; MAX_MOVES],
            len: 0,
        }
    }

    /// Add a move unless it is empty or already listed.
    #[inline]
    pub fn push_unique(&mut self, mov: Move) {
        if mov.is_empty() || self.contains(&mov) {
            return;
        }
        debug_assert!((self.len as usize) < MAX_MOVES);
        self.moves[self.len as usize] = mov;
        self.len += 1;
    }

    /// Get the number of moves.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Check if empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get a move by index.
    #[inline]
    pub fn get(&self, idx: usize) -> Option<Move> {
        self.as_slice().get(idx).copied()
    }

    #[inline]
    pub fn contains(&self, mov: &Move) -> bool {
        self.as_slice().contains(mov)
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len as usize]
    }

    /// Iterate over moves.
    pub fn iter(&self) -> impl Iterator<Item = Move> + '_ {
        self.as_slice().iter().copied()
    }

    pub fn to_vec(&self) -> Vec<Move> {
        self.as_slice().to_vec()
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MoveList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Generate every legal move for the player to move.
///
/// Each pairing of the dice gives two sums:
/// - Equal sums step that column up to twice, placing at most one marker.
/// - Different sums are combined into one move when the markers allow it.
///   If only one marker is free and both sums need a new one, each sum
///   becomes a move of its own.
///
/// Duplicates across pairings are dropped; the order follows the pairings.
/// An empty list means the roll has no legal move.
pub fn possible_moves(state: &BoardState, dice: &Dice) -> MoveList {
    let player = state.turn();
    let current = state.current_columns();
    let free = state.free_counters();
    let mut moves = MoveList::new();

    for (first, second) in dice::pairings(dice) {
        if first == second {
            if current.contains(first) || free > 0 {
                let steps = state.max_advance(player, first).min(2);
                let mut mov = Move::EMPTY;
                for _ in 0..steps {
                    mov.push(first);
                }
                moves.push_unique(mov);
            }
            continue;
        }

        let mut mov = Move::EMPTY;

        let existing = current.contains(first);
        let mut used_counter = !existing;
        if existing || free > 0 {
            if state.max_advance(player, first) > 0 {
                mov.push(first);
            } else {
                used_counter = false;
            }
        }

        let existing = current.contains(second);
        if (existing || free > 0) && state.max_advance(player, second) > 0 {
            if !existing && used_counter && free == 1 {
                moves.push_unique(mov);
                mov = Move::EMPTY;
            }
            mov.push(second);
        }
        moves.push_unique(mov);
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Player;

    fn col(n: u8) -> Column {
        Column::new(n).unwrap()
    }

    fn numbers(moves: &MoveList) -> Vec<Vec<u8>> {
        moves
            .iter()
            .map(|m| m.columns().iter().map(|c| c.number()).collect())
            .collect()
    }

    #[test]
    fn test_move_sorted_and_equal() {
        let a = Move::pair(col(9), col(4));
        assert_eq!(a.columns(), &[col(4), col(9)]);
        assert_eq!(a, Move::pair(col(4), col(9)));
        assert_ne!(Move::single(col(4)), Move::double(col(4)));
        assert_eq!(a.to_string(), "move on 4 and 9");
        assert_eq!(Move::single(col(2)).to_string(), "move on 2");
    }

    #[test]
    fn test_move_reward() {
        let config = GameConfig::default();
        let reward = Move::pair(col(7), col(12)).reward(&config);
        assert!((reward - (1.0 + 13.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_all_fours_deduplicated() {
        let state = BoardState::default();
        let moves = possible_moves(&state, &[3, 3, 3, 3]);
        assert_eq!(numbers(&moves), vec![vec![6, 6]]);
    }

    #[test]
    fn test_all_ones_fresh_game() {
        let state = BoardState::default();
        let moves = possible_moves(&state, &[1, 1, 1, 1]);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves.get(0), Some(Move::double(col(2))));
    }

    #[test]
    fn test_pairing_order() {
        let state = BoardState::default();
        let moves = possible_moves(&state, &[1, 2, 3, 4]);
        assert_eq!(numbers(&moves), vec![vec![3, 7], vec![4, 6], vec![5, 5]]);

        let moves = possible_moves(&state, &[6, 5, 1, 2]);
        assert_eq!(numbers(&moves), vec![vec![3, 11], vec![7, 7], vec![6, 8]]);
    }

    #[test]
    fn test_last_counter_splits_new_columns() {
        let mut state = BoardState::default();
        state.execute_move(Move::pair(col(2), col(4)));
        assert_eq!(state.free_counters(), 1);

        let moves = possible_moves(&state, &[1, 2, 3, 4]);
        assert_eq!(
            numbers(&moves),
            vec![vec![3], vec![7], vec![4, 6], vec![5, 5]]
        );

        let moves = possible_moves(&state, &[6, 6, 5, 5]);
        assert_eq!(numbers(&moves), vec![vec![12], vec![10], vec![11, 11]]);
    }

    #[test]
    fn test_no_free_counters_only_current_columns() {
        let mut state = BoardState::default();
        state.execute_move(Move::pair(col(2), col(4)));
        state.execute_move(Move::single(col(9)));
        assert_eq!(state.free_counters(), 0);

        assert_eq!(numbers(&possible_moves(&state, &[1, 2, 3, 4])), vec![vec![4]]);
        assert_eq!(
            numbers(&possible_moves(&state, &[1, 1, 3, 6])),
            vec![vec![2, 9], vec![4]]
        );
        assert!(possible_moves(&state, &[6, 6, 6, 6]).is_empty());
    }

    #[test]
    fn test_double_capped_by_max_advance() {
        let mut state = BoardState::default();
        // Column 2 needs three steps; take two, leaving one.
        state.execute_move(Move::double(col(2)));
        assert_eq!(state.max_advance(Player::One, col(2)), 1);

        let moves = possible_moves(&state, &[1, 1, 1, 1]);
        assert_eq!(numbers(&moves), vec![vec![2]]);
    }

    #[test]
    fn test_completed_column_not_offered() {
        let mut state = BoardState::default();
        state.execute_move(Move::double(col(2)));
        state.execute_move(Move::single(col(2)));
        assert!(state.completed_column(Player::One, col(2)));

        // (2,7) pairing: only 7 remains usable
        let moves = possible_moves(&state, &[1, 1, 3, 4]);
        assert!(moves.iter().all(|m| !m.columns().contains(&col(2))));
        assert_eq!(numbers(&moves), vec![vec![7], vec![4, 5]]);
    }

    #[test]
    fn test_opponent_column_locked() {
        let mut state = BoardState::default();
        for _ in 0..3 {
            state.execute_move(Move::single(col(12)));
        }
        state.end_turn();
        assert_eq!(state.turn(), Player::Two);
        assert_eq!(state.max_advance(Player::Two, col(12)), 0);

        let moves = possible_moves(&state, &[6, 6, 6, 6]);
        assert!(moves.is_empty());

        let moves = possible_moves(&state, &[6, 6, 1, 2]);
        assert_eq!(numbers(&moves), vec![vec![3], vec![7, 8]]);
    }
}
