//! Board geometry and AI tuning.
//!
//! Both values are immutable once built and are passed to the types that need
//! them, so alternate geometries can be exercised side by side in tests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::NUM_COLUMNS;

/// Configuration validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board height {0} out of range (11..=64)")]
    BoardHeight(u8),
    #[error("counter limit {0} out of range (1..=11)")]
    MaxCounters(u8),
    #[error("columns to win {0} out of range (1..=11)")]
    ColumnsToWin(u8),
}

/// Board geometry shared by every state of one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGameConfig", into = "RawGameConfig")]
pub struct GameConfig {
    board_height: u8,
    max_counters: u8,
    columns_to_win: u8,
}

impl GameConfig {
    pub const DEFAULT_BOARD_HEIGHT: u8 = 13;
    pub const DEFAULT_MAX_COUNTERS: u8 = 3;
    pub const DEFAULT_COLUMNS_TO_WIN: u8 = 3;

    /// Build a validated configuration.
    ///
    /// The board must be at least 11 rows tall so that the outer columns
    /// (which start 10 rows up) still have a cell to climb.
    pub fn new(board_height: u8, max_counters: u8, columns_to_win: u8) -> Result<Self, ConfigError> {
        if !(11..=64).contains(&board_height) {
            return Err(ConfigError::BoardHeight(board_height));
        }
        if max_counters == 0 || max_counters as usize > NUM_COLUMNS {
            return Err(ConfigError::MaxCounters(max_counters));
        }
        if columns_to_win == 0 || columns_to_win as usize > NUM_COLUMNS {
            return Err(ConfigError::ColumnsToWin(columns_to_win));
        }
        Ok(GameConfig {
            board_height,
            max_counters,
            columns_to_win,
        })
    }

    /// Row at which every column is completed.
    #[inline]
    pub const fn board_height(&self) -> u8 {
        self.board_height
    }

    /// Number of climbing markers available each turn.
    #[inline]
    pub const fn max_counters(&self) -> u8 {
        self.max_counters
    }

    /// Completed columns needed to win the game.
    #[inline]
    pub const fn columns_to_win(&self) -> u8 {
        self.columns_to_win
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            board_height: Self::DEFAULT_BOARD_HEIGHT,
            max_counters: Self::DEFAULT_MAX_COUNTERS,
            columns_to_win: Self::DEFAULT_COLUMNS_TO_WIN,
        }
    }
}

/// Unvalidated wire form of [`GameConfig`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawGameConfig {
    #[serde(default = "default_board_height")]
    board_height: u8,
    #[serde(default = "default_max_counters")]
    max_counters: u8,
    #[serde(default = "default_columns_to_win")]
    columns_to_win: u8,
}

fn default_board_height() -> u8 {
    GameConfig::DEFAULT_BOARD_HEIGHT
}

fn default_max_counters() -> u8 {
    GameConfig::DEFAULT_MAX_COUNTERS
}

fn default_columns_to_win() -> u8 {
    GameConfig::DEFAULT_COLUMNS_TO_WIN
}

impl TryFrom<RawGameConfig> for GameConfig {
    type Error = ConfigError;

    fn try_from(raw: RawGameConfig) -> Result<Self, Self::Error> {
        GameConfig::new(raw.board_height, raw.max_counters, raw.columns_to_win)
    }
}

impl From<GameConfig> for RawGameConfig {
    fn from(config: GameConfig) -> Self {
        RawGameConfig {
            board_height: config.board_height,
            max_counters: config.max_counters,
            columns_to_win: config.columns_to_win,
        }
    }
}

/// Tuning for the gambling heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    /// Keep rolling while the expected marginal gain of another roll stays
    /// above this value.
    #[serde(default = "default_gamble_threshold")]
    pub gamble_threshold: f64,
}

fn default_gamble_threshold() -> f64 {
    -6.0
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            gamble_threshold: default_gamble_threshold(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let config = GameConfig::default();
        assert_eq!(config.board_height(), 13);
        assert_eq!(config.max_counters(), 3);
        assert_eq!(config.columns_to_win(), 3);
    }

    #[test]
    fn test_rejects_short_board() {
        assert_eq!(GameConfig::new(10, 3, 3), Err(ConfigError::BoardHeight(10)));
        assert!(GameConfig::new(11, 3, 3).is_ok());
    }

    #[test]
    fn test_rejects_counter_limits() {
        assert_eq!(GameConfig::new(13, 0, 3), Err(ConfigError::MaxCounters(0)));
        assert_eq!(GameConfig::new(13, 12, 3), Err(ConfigError::MaxCounters(12)));
        assert_eq!(GameConfig::new(13, 3, 0), Err(ConfigError::ColumnsToWin(0)));
    }

    #[test]
    fn test_config_from_json_fills_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"board_height": 15}"#).unwrap();
        assert_eq!(config.board_height(), 15);
        assert_eq!(config.max_counters(), 3);

        let bad: Result<GameConfig, _> = serde_json::from_str(r#"{"board_height": 4}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_ai_config_default_threshold() {
        assert_eq!(AiConfig::default().gamble_threshold, -6.0);
        let parsed: AiConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.gamble_threshold, -6.0);
    }
}
