//! Race state for both players.
//!
//! # Progress encoding
//!
//! ```text
//! Every column is drawn on a grid `board_height` rows tall (13 by default).
//! Column c starts 2*|c-7| rows up and is completed at row board_height:
//!
//!   column:      2  3  4  5  6  7  8  9 10 11 12
//!   start row:  10  8  6  4  2  0  2  4  6  8 10
//!   length:      3  5  7  9 11 13 11  9  7  5  3
//! ```
//!
//! A player's progress in a column is the row their marker sits on, so the
//! steps still needed are `board_height - progress`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{MoveError, StateError};
use crate::movegen::Move;
use crate::NUM_COLUMNS;

/// Player identifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// Get the opponent player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Array index (0 or 1).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }

    /// Convert from an array index (0 or 1).
    #[inline]
    pub fn from_index(idx: usize) -> Option<Player> {
        match idx {
            0 => Some(Player::One),
            1 => Some(Player::Two),
            _ => None,
        }
    }

    /// Both players in scan order.
    pub fn all() -> impl Iterator<Item = Player> {
        [Player::One, Player::Two].into_iter()
    }
}

/// One of the eleven columns, numbered by dice sum (2-12).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Column(u8);

impl Column {
    pub const MIN: Column = Column(2);
    pub const MAX: Column = Column(12);
    pub const CENTER: Column = Column(7);

    /// Create a column from its number (2-12).
    #[inline]
    pub const fn new(number: u8) -> Option<Column> {
        if number >= 2 && number <= 12 {
            Some(Column(number))
        } else {
            None
        }
    }

    /// Create a column from its array index (0-10).
    #[inline]
    pub const fn from_index(idx: usize) -> Option<Column> {
        if idx < NUM_COLUMNS {
            Some(Column(idx as u8 + 2))
        } else {
            None
        }
    }

    /// The dice sum this column is keyed by.
    #[inline]
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Array index (0-10).
    #[inline]
    pub const fn index(self) -> usize {
        (self.0 - 2) as usize
    }

    /// Distance from the centre column.
    #[inline]
    pub const fn distance(self) -> u8 {
        self.0.abs_diff(Self::CENTER.0)
    }

    /// Row a fresh marker starts on.
    #[inline]
    pub const fn start_row(self) -> u8 {
        2 * self.distance()
    }

    /// Number of cells to climb from the start row.
    #[inline]
    pub const fn length(self, config: &GameConfig) -> u8 {
        config.board_height() - self.start_row()
    }

    /// Reward for one step in this column: `board_height / length`.
    ///
    /// Shorter columns pay more per step.
    #[inline]
    pub fn step_reward(self, config: &GameConfig) -> f64 {
        config.board_height() as f64 / self.length(config) as f64
    }

    /// Iterate over all 11 columns in ascending order.
    pub fn all() -> impl Iterator<Item = Column> {
        (2..=12).map(Column)
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Column({})", self.0)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Column {
    type Error = StateError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Column::new(number).ok_or(StateError::InvalidColumn(number))
    }
}

impl From<Column> for u8 {
    fn from(column: Column) -> u8 {
        column.0
    }
}

/// Set of columns packed into 11 bits (bit i = column i + 2).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "Vec<Column>", from = "Vec<Column>")]
pub struct ColumnSet(u16);

impl ColumnSet {
    /// Create an empty set.
    #[inline]
    pub const fn new() -> ColumnSet {
        ColumnSet(0)
    }

    #[inline]
    pub fn contains(&self, column: Column) -> bool {
        self.0 & (1 << column.index()) != 0
    }

    /// Add a column. Returns true if it was not already present.
    #[inline]
    pub fn insert(&mut self, column: Column) -> bool {
        let added = !self.contains(column);
        self.0 |= 1 << column.index();
        added
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Iterate over members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Column> + '_ {
        Column::all().filter(move |&c| self.contains(c))
    }
}

impl fmt::Debug for ColumnSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|c| c.0)).finish()
    }
}

impl From<ColumnSet> for Vec<Column> {
    fn from(set: ColumnSet) -> Vec<Column> {
        set.iter().collect()
    }
}

impl From<Vec<Column>> for ColumnSet {
    fn from(columns: Vec<Column>) -> ColumnSet {
        let mut set = ColumnSet::new();
        for column in columns {
            set.insert(column);
        }
        set
    }
}

impl FromIterator<Column> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        let mut set = ColumnSet::new();
        for column in iter {
            set.insert(column);
        }
        set
    }
}

/// Race snapshot: confirmed progress for both players plus the provisional
/// advances of the turn in progress.
///
/// Provisional advances live in the same progress arrays; `current_columns`
/// only records which columns were touched this turn. Reverting a bust means
/// going back to a clone taken when the turn started.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBoardState")]
pub struct BoardState {
    config: GameConfig,
    progress: [[u8; NUM_COLUMNS]; 2],
    current_columns: ColumnSet,
    total_move_length: u32,
    gain: f64,
    turn: Player,
}

impl BoardState {
    /// Create the starting position with player one to move.
    pub fn new(config: GameConfig) -> BoardState {
        let mut seed = [0u8; NUM_COLUMNS];
        for i in 0..=5 {
            seed[5 - i] = 2 * i as u8;
            seed[5 + i] = 2 * i as u8;
        }
        BoardState {
            config,
            progress: [seed, seed],
            current_columns: ColumnSet::new(),
            total_move_length: 0,
            gain: 0.0,
            turn: Player::One,
        }
    }

    /// Build a state at the start of `turn` from explicit progress rows.
    pub fn with_progress(
        config: GameConfig,
        progress: [[u8; NUM_COLUMNS]; 2],
        turn: Player,
    ) -> Result<BoardState, StateError> {
        for player in Player::all() {
            for column in Column::all() {
                let value = progress[player.index()][column.index()];
                if value < column.start_row() || value > config.board_height() {
                    return Err(StateError::ProgressOutOfRange { player, column, value });
                }
            }
        }
        Ok(BoardState {
            config,
            progress,
            current_columns: ColumnSet::new(),
            total_move_length: 0,
            gain: 0.0,
            turn,
        })
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Player whose turn it is.
    #[inline]
    pub fn turn(&self) -> Player {
        self.turn
    }

    /// Columns with provisional progress this turn.
    #[inline]
    pub fn current_columns(&self) -> ColumnSet {
        self.current_columns
    }

    /// Individual steps applied this turn.
    #[inline]
    pub fn total_move_length(&self) -> u32 {
        self.total_move_length
    }

    /// Summed step reward of this turn's provisional advances.
    #[inline]
    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Row of `player`'s marker in `column`.
    #[inline]
    pub fn progress(&self, player: Player, column: Column) -> u8 {
        self.progress[player.index()][column.index()]
    }

    /// All of `player`'s rows, indexed by column index.
    #[inline]
    pub fn column_progress(&self, player: Player) -> &[u8; NUM_COLUMNS] {
        &self.progress[player.index()]
    }

    /// Markers still available this turn.
    #[inline]
    pub fn free_counters(&self) -> usize {
        (self.config.max_counters() as usize).saturating_sub(self.current_columns.len())
    }

    /// Steps `player` may still take in `column`; 0 if the opponent owns it.
    #[inline]
    pub fn max_advance(&self, player: Player, column: Column) -> u8 {
        if self.completed_column(player.opponent(), column) {
            0
        } else {
            self.config.board_height() - self.progress(player, column)
        }
    }

    /// Check if `player` has reached the top of `column`.
    #[inline]
    pub fn completed_column(&self, player: Player, column: Column) -> bool {
        self.progress(player, column) == self.config.board_height()
    }

    /// Number of columns `player` has completed.
    pub fn columns_completed(&self, player: Player) -> usize {
        Column::all()
            .filter(|&c| self.completed_column(player, c))
            .count()
    }

    /// Apply a move for the player to move.
    ///
    /// Does NOT validate - the move must come from
    /// [`possible_moves`](crate::possible_moves) for this exact state.
    pub fn execute_move(&mut self, mov: Move) {
        let player = self.turn.index();
        for &column in mov.columns() {
            self.progress[player][column.index()] += 1;
            self.current_columns.insert(column);
            self.total_move_length += 1;
            self.gain += column.step_reward(&self.config);
        }
    }

    /// Validate a move against the rules, then apply it.
    ///
    /// On error the state is left untouched.
    pub fn try_execute_move(&mut self, mov: Move) -> Result<(), MoveError> {
        if mov.is_empty() {
            return Err(MoveError::Empty);
        }
        let mut needed = self.current_columns;
        for &column in mov.columns() {
            if self.completed_column(self.turn.opponent(), column) {
                return Err(MoveError::OpponentOwned(column));
            }
            let steps = mov.columns().iter().filter(|&&c| c == column).count() as u8;
            if steps > self.max_advance(self.turn, column) {
                return Err(MoveError::Overrun { column, steps });
            }
            needed.insert(column);
            if needed.len() > self.config.max_counters() as usize {
                return Err(MoveError::NoFreeCounter(column));
            }
        }
        self.execute_move(mov);
        Ok(())
    }

    /// Confirm the turn: forget which columns were provisional and pass the
    /// dice to the opponent.
    pub fn end_turn(&mut self) {
        self.current_columns.clear();
        self.total_move_length = 0;
        self.gain = 0.0;
        self.turn = self.turn.opponent();
    }

    /// Return the first player (one, then two) holding enough completed
    /// columns, or None if the game is ongoing.
    pub fn winner(&self) -> Option<Player> {
        let needed = self.config.columns_to_win() as usize;
        Player::all().find(|&p| self.columns_completed(p) >= needed)
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

/// Unvalidated wire form of [`BoardState`].
#[derive(Deserialize)]
struct RawBoardState {
    #[serde(default)]
    config: GameConfig,
    progress: [[u8; NUM_COLUMNS]; 2],
    #[serde(default)]
    current_columns: ColumnSet,
    #[serde(default)]
    total_move_length: u32,
    #[serde(default)]
    gain: f64,
    turn: Player,
}

impl TryFrom<RawBoardState> for BoardState {
    type Error = StateError;

    fn try_from(raw: RawBoardState) -> Result<Self, Self::Error> {
        let mut state = BoardState::with_progress(raw.config, raw.progress, raw.turn)?;
        if raw.current_columns.len() > raw.config.max_counters() as usize {
            return Err(StateError::TooManyCounters(raw.current_columns.len()));
        }
        state.current_columns = raw.current_columns;
        state.total_move_length = raw.total_move_length;
        state.gain = raw.gain;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(n: u8) -> Column {
        Column::new(n).unwrap()
    }

    /// Move `player`'s marker to the top of the given columns.
    fn complete(state: &mut BoardState, player: Player, columns: &[u8]) {
        let top = state.config.board_height();
        for &n in columns {
            state.progress[player.index()][col(n).index()] = top;
        }
    }

    #[test]
    fn test_player_opponent() {
        assert_eq!(Player::One.opponent(), Player::Two);
        assert_eq!(Player::Two.opponent(), Player::One);
        assert_eq!(Player::from_index(1), Some(Player::Two));
        assert_eq!(Player::from_index(2), None);
    }

    #[test]
    fn test_column_geometry() {
        let config = GameConfig::default();
        assert_eq!(Column::new(1), None);
        assert_eq!(Column::new(13), None);
        assert_eq!(col(2).index(), 0);
        assert_eq!(col(12).index(), 10);
        assert_eq!(col(2).length(&config), 3);
        assert_eq!(col(7).length(&config), 13);
        assert_eq!(col(10).length(&config), 7);
        assert!((col(7).step_reward(&config) - 1.0).abs() < 1e-12);
        assert!((col(12).step_reward(&config) - 13.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_column_set() {
        let mut set = ColumnSet::new();
        assert!(set.is_empty());
        assert!(set.insert(col(7)));
        assert!(!set.insert(col(7)));
        assert!(set.insert(col(2)));
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().map(Column::number).collect::<Vec<_>>(), vec![2, 7]);
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn test_initial_seeding() {
        let state = BoardState::default();
        let expected = [10, 8, 6, 4, 2, 0, 2, 4, 6, 8, 10];
        assert_eq!(state.column_progress(Player::One), &expected);
        assert_eq!(state.column_progress(Player::Two), &expected);
        assert_eq!(state.turn(), Player::One);
        assert_eq!(state.free_counters(), 3);
        assert_eq!(state.gain(), 0.0);
    }

    #[test]
    fn test_initial_max_advance_is_column_length() {
        let state = BoardState::default();
        for column in Column::all() {
            assert_eq!(
                state.max_advance(Player::One, column),
                column.length(state.config())
            );
        }
    }

    #[test]
    fn test_max_advance_locked_by_opponent() {
        let mut state = BoardState::default();
        complete(&mut state, Player::Two, &[4]);
        assert_eq!(state.max_advance(Player::One, col(4)), 0);
        assert_eq!(state.max_advance(Player::Two, col(4)), 0);
        assert!(state.completed_column(Player::Two, col(4)));
        assert!(!state.completed_column(Player::One, col(4)));
    }

    #[test]
    fn test_execute_move_updates_turn_bookkeeping() {
        let mut state = BoardState::default();
        state.execute_move(Move::pair(col(2), col(7)));
        assert_eq!(state.progress(Player::One, col(2)), 11);
        assert_eq!(state.progress(Player::One, col(7)), 1);
        assert_eq!(state.progress(Player::Two, col(7)), 0);
        assert_eq!(state.total_move_length(), 2);
        assert_eq!(state.free_counters(), 1);
        let expected_gain = 13.0 / 3.0 + 1.0;
        assert!((state.gain() - expected_gain).abs() < 1e-12);

        state.execute_move(Move::double(col(7)));
        assert_eq!(state.progress(Player::One, col(7)), 3);
        assert_eq!(state.free_counters(), 1);
        assert_eq!(state.total_move_length(), 4);
    }

    #[test]
    fn test_end_turn_resets_and_flips() {
        let mut state = BoardState::default();
        state.execute_move(Move::single(col(6)));
        state.end_turn();
        assert_eq!(state.turn(), Player::Two);
        assert!(state.current_columns().is_empty());
        assert_eq!(state.total_move_length(), 0);
        assert_eq!(state.gain(), 0.0);
        // Progress is kept
        assert_eq!(state.progress(Player::One, col(6)), 3);
    }

    #[test]
    fn test_winner_needs_three_columns() {
        let mut state = BoardState::default();
        complete(&mut state, Player::One, &[2, 12]);
        assert_eq!(state.winner(), None);
        complete(&mut state, Player::One, &[7]);
        assert_eq!(state.winner(), Some(Player::One));
    }

    #[test]
    fn test_winner_scan_order_prefers_player_one() {
        let mut state = BoardState::default();
        complete(&mut state, Player::Two, &[3, 4, 5]);
        assert_eq!(state.winner(), Some(Player::Two));
        complete(&mut state, Player::One, &[9, 10, 11]);
        assert_eq!(state.winner(), Some(Player::One));
    }

    #[test]
    fn test_try_execute_move_rejections() {
        let mut state = BoardState::default();
        complete(&mut state, Player::Two, &[8]);
        assert_eq!(
            state.try_execute_move(Move::single(col(8))),
            Err(MoveError::OpponentOwned(col(8)))
        );

        state.progress[0][col(2).index()] = 12;
        assert_eq!(
            state.try_execute_move(Move::double(col(2))),
            Err(MoveError::Overrun { column: col(2), steps: 2 })
        );

        state.execute_move(Move::pair(col(3), col(4)));
        state.execute_move(Move::single(col(5)));
        let before = state.clone();
        assert_eq!(
            state.try_execute_move(Move::single(col(6))),
            Err(MoveError::NoFreeCounter(col(6)))
        );
        assert_eq!(state, before);
        assert_eq!(state.try_execute_move(Move::pair(col(3), col(5))), Ok(()));
        assert_eq!(state.try_execute_move(Move::EMPTY), Err(MoveError::Empty));
    }

    #[test]
    fn test_with_progress_validates_rows() {
        let config = GameConfig::default();
        let mut rows = *BoardState::new(config).column_progress(Player::One);
        rows[0] = 9; // below column 2's start row
        let err = BoardState::with_progress(config, [rows, rows], Player::One).unwrap_err();
        assert_eq!(
            err,
            StateError::ProgressOutOfRange { player: Player::One, column: col(2), value: 9 }
        );
    }

    #[test]
    fn test_clone_is_independent() {
        let state = BoardState::default();
        let mut copy = state.clone();
        copy.execute_move(Move::double(col(7)));
        assert_eq!(state.progress(Player::One, col(7)), 0);
        assert!(state.current_columns().is_empty());
        assert_eq!(copy.progress(Player::One, col(7)), 2);
    }

    #[test]
    fn test_alternate_geometry() {
        let config = GameConfig::new(15, 2, 2).unwrap();
        let mut state = BoardState::new(config);
        assert_eq!(state.free_counters(), 2);
        assert_eq!(state.max_advance(Player::One, col(2)), 5);
        assert_eq!(col(7).length(&config), 15);
        complete(&mut state, Player::Two, &[2, 12]);
        assert_eq!(state.winner(), Some(Player::Two));
    }

    #[test]
    fn test_json_roundtrip_and_validation() {
        let mut state = BoardState::default();
        state.execute_move(Move::double(col(7)));
        let json = serde_json::to_string(&state).unwrap();
        let back: BoardState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);

        let fresh = r#"{"progress": [[10,8,6,4,2,0,2,4,6,8,10],[10,8,6,4,2,0,2,4,6,8,10]], "turn": "Two"}"#;
        let parsed: BoardState = serde_json::from_str(fresh).unwrap();
        assert_eq!(parsed.turn(), Player::Two);
        assert_eq!(parsed.config(), &GameConfig::default());

        let below_start = r#"{"progress": [[9,8,6,4,2,0,2,4,6,8,10],[10,8,6,4,2,0,2,4,6,8,10]], "turn": "One"}"#;
        assert!(serde_json::from_str::<BoardState>(below_start).is_err());

        let crowded = r#"{"progress": [[10,8,6,4,2,0,2,4,6,8,10],[10,8,6,4,2,0,2,4,6,8,10]],
            "current_columns": [2, 3, 4, 5], "turn": "One"}"#;
        assert!(serde_json::from_str::<BoardState>(crowded).is_err());
    }
}
