//! Self-play statistics tracking.

use std::time::Instant;

use cantstop_core::Player;
use tracing::info;

/// Summary of one finished game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameRecord {
    /// Seed the game's dice were drawn from
    pub seed: u64,
    pub winner: Player,
    /// Turns played by both seats together
    pub turns: u32,
    /// Turns that ended with no legal move and progress at stake
    pub busts: u32,
    /// Turns that ended by banking
    pub banks: u32,
}

/// Statistics collected during a run.
#[derive(Debug, Default)]
pub struct SimStats {
    pub games: u64,
    /// Wins indexed by seat
    pub wins: [u64; 2],
    pub turns: u64,
    pub busts: u64,
    pub banks: u64,
    pub longest_game: u32,

    /// For rate calculation
    start_time: Option<Instant>,
    last_log_time: Option<Instant>,
    last_log_games: u64,
}

impl SimStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            last_log_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Rebuild totals from records loaded out of a checkpoint
    pub fn from_records(records: &[GameRecord]) -> Self {
        let mut stats = Self::new();
        for record in records {
            stats.record(record);
        }
        stats.last_log_games = stats.games;
        stats
    }

    /// Record a finished game
    pub fn record(&mut self, record: &GameRecord) {
        self.games += 1;
        self.wins[record.winner.index()] += 1;
        self.turns += record.turns as u64;
        self.busts += record.busts as u64;
        self.banks += record.banks as u64;
        self.longest_game = self.longest_game.max(record.turns);
    }

    /// Fraction of games won by `player`
    pub fn win_rate(&self, player: Player) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.wins[player.index()] as f64 / self.games as f64
    }

    pub fn mean_turns(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.turns as f64 / self.games as f64
    }

    /// Fraction of turns that ended in a bust
    pub fn bust_rate(&self) -> f64 {
        if self.turns == 0 {
            return 0.0;
        }
        self.busts as f64 / self.turns as f64
    }

    /// Check if we should log progress
    pub fn should_log(&self, interval_secs: u64) -> bool {
        if let Some(last) = self.last_log_time {
            last.elapsed().as_secs() >= interval_secs
        } else {
            true
        }
    }

    /// Log progress and reset log timer
    pub fn log_progress(&mut self, target: u64) {
        let now = Instant::now();
        let elapsed_total = self.start_time.map(|s| s.elapsed().as_secs()).unwrap_or(0);

        let rate = match self.last_log_time {
            Some(last) if last.elapsed().as_secs_f64() > 0.0 => {
                (self.games - self.last_log_games) as f64 / last.elapsed().as_secs_f64()
            }
            _ => 0.0,
        };

        info!(
            elapsed = %format!(
                "{:02}:{:02}:{:02}",
                elapsed_total / 3600,
                (elapsed_total % 3600) / 60,
                elapsed_total % 60
            ),
            games = self.games,
            target,
            rate = %format!("{:.1}/s", rate),
            p1 = self.wins[0],
            p2 = self.wins[1],
            bust_rate = %format!("{:.3}", self.bust_rate()),
            "progress"
        );

        self.last_log_time = Some(now);
        self.last_log_games = self.games;
    }

    /// Print final summary
    pub fn print_summary(&self) {
        println!("Games played: {}", self.games);
        println!(
            "  - P1 wins: {} ({:.1}%)",
            self.wins[0],
            100.0 * self.win_rate(Player::One)
        );
        println!(
            "  - P2 wins: {} ({:.1}%)",
            self.wins[1],
            100.0 * self.win_rate(Player::Two)
        );
        println!("Turns: {} ({:.1} per game, longest {})", self.turns, self.mean_turns(), self.longest_game);
        println!("Banked turns: {}", self.banks);
        println!("Busted turns: {} ({:.1}%)", self.busts, 100.0 * self.bust_rate());

        if let Some(start) = self.start_time {
            let elapsed = start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                println!("Average rate: {:.1} games/sec", self.games as f64 / elapsed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_rates() {
        let records = [
            GameRecord { seed: 0, winner: Player::One, turns: 30, busts: 6, banks: 24 },
            GameRecord { seed: 1, winner: Player::One, turns: 50, busts: 14, banks: 35 },
            GameRecord { seed: 2, winner: Player::Two, turns: 40, busts: 10, banks: 30 },
        ];
        let stats = SimStats::from_records(&records);
        assert_eq!(stats.games, 3);
        assert_eq!(stats.wins, [2, 1]);
        assert_eq!(stats.turns, 120);
        assert_eq!(stats.longest_game, 50);
        assert!((stats.win_rate(Player::One) - 2.0 / 3.0).abs() < 1e-12);
        assert!((stats.mean_turns() - 40.0).abs() < 1e-12);
        assert!((stats.bust_rate() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_empty_rates_are_zero() {
        let stats = SimStats::new();
        assert_eq!(stats.win_rate(Player::Two), 0.0);
        assert_eq!(stats.mean_turns(), 0.0);
        assert_eq!(stats.bust_rate(), 0.0);
    }
}
