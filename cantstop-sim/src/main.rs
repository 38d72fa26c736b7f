//! Can't Stop self-play simulator
//!
//! Plays seeded games between two policies and reports win rates. Runs are
//! checkpointed and resume where they left off.

mod checkpoint;
mod policy;
mod selfplay;
mod stats;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use cantstop_core::{AiConfig, DecisionEngine, GameConfig};
use clap::Parser;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::checkpoint::Checkpoint;
use crate::policy::{Policy, PolicyKind};
use crate::selfplay::Runner;

#[derive(Parser, Debug)]
#[command(name = "selfplay", version, about = "Play seeded Can't Stop games between two policies")]
struct Cli {
    /// Number of games to play
    #[arg(short = 'n', long, default_value_t = 1000)]
    games: u64,
    /// Seed of the first game; game i uses seed + i
    #[arg(short, long, default_value_t = 0)]
    seed: u64,
    /// Policy for player one
    #[arg(long = "p1", value_enum, default_value_t = PolicyKind::Ai)]
    player_one: PolicyKind,
    /// Policy for player two
    #[arg(long = "p2", value_enum, default_value_t = PolicyKind::Ai)]
    player_two: PolicyKind,
    /// Moves the baseline policy makes before banking
    #[arg(long, default_value_t = 2)]
    baseline_moves: u32,
    /// JSON file with `game` and `ai` settings
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Checkpoint file
    #[arg(long, default_value = "data/selfplay.bin")]
    checkpoint: PathBuf,
    /// Ignore an existing checkpoint
    #[arg(long)]
    fresh: bool,
    #[arg(long, default_value_t = 60)]
    checkpoint_interval_secs: u64,
    #[arg(long, default_value_t = 5)]
    log_interval_secs: u64,
}

/// Contents of the `--config` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SimConfig {
    game: GameConfig,
    ai: AiConfig,
}

fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let sim = load_config(cli.config.as_deref())?;
    let engine = DecisionEngine::new(sim.ai);
    let policies = [
        Policy::new(cli.player_one, engine, cli.baseline_moves),
        Policy::new(cli.player_two, engine, cli.baseline_moves),
    ];

    println!("Can't Stop self-play");
    println!("====================");
    println!("Games: {} from seed {}", cli.games, cli.seed);
    println!("P1: {:?}  P2: {:?}", policies[0], policies[1]);
    println!(
        "Board height {}, {} markers, {} columns to win",
        sim.game.board_height(),
        sim.game.max_counters(),
        sim.game.columns_to_win()
    );
    println!();

    // Ctrl-C stops after the current game and saves a checkpoint
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        println!("\n\nInterrupt received, saving checkpoint...");
        r.store(false, Ordering::SeqCst);
    })
    .context("setting Ctrl-C handler")?;

    if let Some(parent) = cli.checkpoint.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let mut runner = Runner::new(sim.game, policies, cli.seed);

    if cli.checkpoint.exists() && !cli.fresh {
        let start = Instant::now();
        match Checkpoint::load(&cli.checkpoint) {
            Ok(checkpoint) => {
                let count = checkpoint.records.len();
                if runner.resume(checkpoint) {
                    info!(
                        games = count,
                        secs = start.elapsed().as_secs_f64(),
                        "resumed from checkpoint"
                    );
                } else {
                    warn!("checkpoint belongs to a different run, starting fresh");
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to load checkpoint, starting fresh");
            }
        }
    }

    let start = Instant::now();
    let finished = runner.run(
        cli.games,
        running,
        cli.checkpoint_interval_secs,
        cli.log_interval_secs,
        &cli.checkpoint,
    )?;

    println!("\n====================");
    if finished {
        println!("Run complete!");
    } else {
        println!("Run interrupted; rerun to continue.");
    }
    println!("====================");
    println!("Time: {:.2}s", start.elapsed().as_secs_f64());
    println!();
    runner.stats.print_summary();

    Ok(())
}
