//! Seeded self-play runs with periodic checkpoints.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Result};
use cantstop_core::{Dice, Game, GameConfig, Outcome};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};
use xxhash_rust::xxh64::xxh64;

use crate::checkpoint::Checkpoint;
use crate::policy::Policy;
use crate::stats::{GameRecord, SimStats};

/// Turn limit per game; hitting it means a policy never banks.
pub const MAX_TURNS: u32 = 10_000;

fn roll_dice(rng: &mut StdRng) -> Dice {
    [
        rng.random_range(1..=6),
        rng.random_range(1..=6),
        rng.random_range(1..=6),
        rng.random_range(1..=6),
    ]
}

/// Play one game to the end. The same seed always gives the same game.
pub fn play_game(seed: u64, config: GameConfig, policies: &[Policy; 2]) -> Result<GameRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut game = Game::new(config);
    let mut turns = 0u32;
    let mut busts = 0u32;
    let mut banks = 0u32;
    let mut moves_this_turn = 0u32;

    loop {
        if turns >= MAX_TURNS {
            bail!("game {} did not finish within {} turns", seed, MAX_TURNS);
        }
        let policy = &policies[game.turn().index()];
        let dice = roll_dice(&mut rng);
        let moves = *game.roll(dice)?;

        let Some(decision) = policy.decide(game.state(), &moves, moves_this_turn, &mut rng) else {
            if game.forfeit()? == Outcome::Busted {
                busts += 1;
            }
            turns += 1;
            moves_this_turn = 0;
            continue;
        };

        game.choose(decision.index)?;
        moves_this_turn += 1;
        if decision.roll_again {
            continue;
        }

        let outcome = game.stop()?;
        turns += 1;
        banks += 1;
        moves_this_turn = 0;
        if let Outcome::Won(winner) = outcome {
            debug!(seed, ?winner, turns, "game finished");
            return Ok(GameRecord {
                seed,
                winner,
                turns,
                busts,
                banks,
            });
        }
    }
}

/// A batch of games with consecutive seeds.
pub struct Runner {
    pub config: GameConfig,
    pub policies: [Policy; 2],
    pub base_seed: u64,
    pub records: Vec<GameRecord>,
    pub stats: SimStats,
}

impl Runner {
    pub fn new(config: GameConfig, policies: [Policy; 2], base_seed: u64) -> Self {
        Self {
            config,
            policies,
            base_seed,
            records: Vec::new(),
            stats: SimStats::new(),
        }
    }

    /// Identifies runs whose games are interchangeable.
    pub fn run_key(&self) -> u64 {
        let key = format!("{:?}|{:?}|{}", self.config, self.policies, self.base_seed);
        xxh64(key.as_bytes(), 0)
    }

    /// Adopt the games of a checkpoint written by the same run.
    ///
    /// Returns false (and keeps nothing) if the checkpoint belongs to a
    /// different run.
    pub fn resume(&mut self, checkpoint: Checkpoint) -> bool {
        if checkpoint.run_key != self.run_key() {
            return false;
        }
        self.stats = SimStats::from_records(&checkpoint.records);
        self.records = checkpoint.records;
        true
    }

    /// Play until `games` games are recorded.
    ///
    /// Returns Ok(false) if interrupted, after saving a checkpoint.
    pub fn run(
        &mut self,
        games: u64,
        running: Arc<AtomicBool>,
        checkpoint_interval_secs: u64,
        log_interval_secs: u64,
        checkpoint_path: &Path,
    ) -> Result<bool> {
        let mut last_checkpoint = Instant::now();

        while (self.records.len() as u64) < games {
            if !running.load(Ordering::SeqCst) {
                self.save(checkpoint_path)?;
                return Ok(false);
            }

            let seed = self.base_seed.wrapping_add(self.records.len() as u64);
            let record = play_game(seed, self.config, &self.policies)?;
            self.stats.record(&record);
            self.records.push(record);

            if last_checkpoint.elapsed().as_secs() >= checkpoint_interval_secs {
                self.save(checkpoint_path)?;
                last_checkpoint = Instant::now();
            }

            if self.stats.should_log(log_interval_secs) {
                self.stats.log_progress(games);
            }
        }

        self.save(checkpoint_path)?;
        Ok(true)
    }

    pub fn save(&self, checkpoint_path: &Path) -> Result<()> {
        let start = Instant::now();
        match Checkpoint::save(checkpoint_path, self.run_key(), &self.records) {
            Ok(count) => {
                info!(
                    games = count,
                    secs = start.elapsed().as_secs_f64(),
                    path = %checkpoint_path.display(),
                    "saved checkpoint"
                );
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to save checkpoint");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cantstop_core::{DecisionEngine, Player};

    fn ai_pair() -> [Policy; 2] {
        [
            Policy::Ai(DecisionEngine::default()),
            Policy::Ai(DecisionEngine::default()),
        ]
    }

    #[test]
    fn test_play_game_is_deterministic() {
        let config = GameConfig::default();
        let a = play_game(17, config, &ai_pair()).unwrap();
        let b = play_game(17, config, &ai_pair()).unwrap();
        assert_eq!(a, b);
        assert!(a.turns >= 2);
        assert!(a.busts + a.banks <= a.turns);
    }

    #[test]
    fn test_baseline_games_finish() {
        let policies = [
            Policy::Baseline { moves_per_turn: 1 },
            Policy::Baseline { moves_per_turn: 3 },
        ];
        for seed in 0..5 {
            let record = play_game(seed, GameConfig::default(), &policies).unwrap();
            assert!(record.banks > 0);
        }
    }

    #[test]
    fn test_run_and_resume() {
        let path = std::env::temp_dir().join("test_selfplay_run.bin");
        let running = Arc::new(AtomicBool::new(true));

        let mut first = Runner::new(GameConfig::default(), ai_pair(), 40);
        assert!(first.run(3, running.clone(), 3600, 3600, &path).unwrap());
        assert_eq!(first.stats.games, 3);

        let mut second = Runner::new(GameConfig::default(), ai_pair(), 40);
        assert!(second.resume(Checkpoint::load(&path).unwrap()));
        assert_eq!(second.records, first.records);
        assert!(second.run(5, running, 3600, 3600, &path).unwrap());
        assert_eq!(second.stats.games, 5);
        assert_eq!(second.stats.wins[Player::One.index()] + second.stats.wins[1], 5);

        let mut other = Runner::new(GameConfig::default(), ai_pair(), 41);
        assert!(!other.resume(Checkpoint::load(&path).unwrap()));
        assert!(other.records.is_empty());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_interrupted_run_saves() {
        let path = std::env::temp_dir().join("test_selfplay_interrupt.bin");
        let running = Arc::new(AtomicBool::new(false));
        let mut runner = Runner::new(GameConfig::default(), ai_pair(), 0);
        assert!(!runner.run(10, running, 3600, 3600, &path).unwrap());
        assert_eq!(Checkpoint::load(&path).unwrap().records.len(), 0);
        std::fs::remove_file(&path).ok();
    }
}
