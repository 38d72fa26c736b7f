//! Render a board as text.
//!
//! Usage:
//!   # From a JSON state (as serialized by BoardState)
//!   cargo run --release --bin render -- --state position.json
//!
//!   # After replaying a script of rolls
//!   cargo run --release --bin render -- --script "1234:0 1111 stop 6655 x"
//!
//! Script tokens:
//!   dddd     roll four dice, let the decision engine pick the move
//!   dddd:i   roll four dice, take move i
//!   stop     bank the turn
//!   x        forfeit a roll that has no move (done automatically if omitted)

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use cantstop_core::{BoardState, Column, DecisionEngine, Game, GameConfig, Player};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "render", about = "Print a Can't Stop board as text")]
struct Cli {
    /// JSON state file, or "-" for stdin
    #[arg(long, value_name = "FILE", conflicts_with = "script")]
    state: Option<PathBuf>,
    /// Rolls and choices to replay from a new game
    #[arg(long)]
    script: Option<String>,
    /// Print the board after every script token
    #[arg(long)]
    each: bool,
}

// Cell glyphs
const EMPTY: char = '.';
const PLAYER_ONE: char = 'A';
const PLAYER_TWO: char = 'B';
const BOTH: char = 'X';
const PROVISIONAL: char = '*';

fn marker(player: Player) -> char {
    match player {
        Player::One => PLAYER_ONE,
        Player::Two => PLAYER_TWO,
    }
}

/// Draw `state`, with provisional markers for the player to move.
///
/// `confirmed` is the state at the start of the turn. When given, banked
/// markers are drawn from it and the mover's working progress shows as `*`.
fn render(state: &BoardState, confirmed: Option<&BoardState>) -> String {
    let config = state.config();
    let mover = state.turn();
    let base = confirmed.unwrap_or(state);
    let mut out = String::new();

    for row in (1..=config.board_height()).rev() {
        let _ = write!(out, "{:>3} ", row);
        for column in Column::all() {
            let glyph = if row <= column.start_row() {
                ' '
            } else {
                cell(state, base, column, row, mover)
            };
            let _ = write!(out, " {} ", glyph);
        }
        out.push('\n');
    }

    out.push_str("    ");
    for column in Column::all() {
        let _ = write!(out, "{:>2} ", column.number());
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "\nTo move: {:?}  markers free: {}  turn gain: {:.2}",
        mover,
        state.free_counters(),
        state.gain()
    );
    for player in Player::all() {
        let done: Vec<String> = Column::all()
            .filter(|&c| state.completed_column(player, c))
            .map(|c| c.to_string())
            .collect();
        let _ = writeln!(out, "{:?} ({}) completed: [{}]", player, marker(player), done.join(", "));
    }
    if let Some(winner) = state.winner() {
        let _ = writeln!(out, "Winner: {:?}", winner);
    }
    out
}

fn cell(state: &BoardState, base: &BoardState, column: Column, row: u8, mover: Player) -> char {
    let provisional = state.current_columns().contains(column);
    if provisional && state.progress(mover, column) == row {
        return PROVISIONAL;
    }
    let one = base.progress(Player::One, column) == row;
    let two = base.progress(Player::Two, column) == row;
    match (one, two) {
        (true, true) => BOTH,
        (true, false) => PLAYER_ONE,
        (false, true) => PLAYER_TWO,
        (false, false) => EMPTY,
    }
}

fn parse_dice(token: &str) -> Result<[u8; 4]> {
    let digits: Vec<u8> = token
        .chars()
        .map(|ch| {
            ch.to_digit(10)
                .map(|d| d as u8)
                .ok_or_else(|| anyhow!("bad die '{}' in '{}'", ch, token))
        })
        .collect::<Result<_>>()?;
    digits
        .try_into()
        .map_err(|_| anyhow!("expected four dice in '{}'", token))
}

/// Apply one script token to `game`.
fn apply_token(game: &mut Game, engine: &DecisionEngine, token: &str) -> Result<()> {
    match token {
        "stop" => {
            game.stop()?;
        }
        "x" => {
            game.forfeit()?;
        }
        _ => {
            let (dice, index) = match token.split_once(':') {
                Some((dice, index)) => {
                    let index: usize = index
                        .parse()
                        .with_context(|| format!("bad move index in '{}'", token))?;
                    (parse_dice(dice)?, Some(index))
                }
                None => (parse_dice(token)?, None),
            };
            if game.roll(dice)?.is_empty() {
                if index.is_some() {
                    bail!("roll {:?} has no legal move", dice);
                }
                game.forfeit()?;
                return Ok(());
            }
            let index = match index {
                Some(index) => index,
                None => {
                    game.ai_decision(engine)
                        .ok_or_else(|| anyhow!("no decision for {:?}", dice))?
                        .index
                }
            };
            game.choose(index)?;
        }
    }
    Ok(())
}

fn replay(script: &str, each: bool) -> Result<String> {
    let engine = DecisionEngine::default();
    let mut game = Game::new(GameConfig::default());
    let mut out = String::new();
    for token in script.split_whitespace() {
        apply_token(&mut game, &engine, token).with_context(|| format!("at '{}'", token))?;
        if each {
            let _ = writeln!(out, "> {}", token);
            out.push_str(&render(game.state(), Some(game.confirmed())));
            out.push('\n');
        }
    }
    if !each {
        out.push_str(&render(game.state(), Some(game.confirmed())));
    }
    Ok(out)
}

fn read_state(path: &Path) -> Result<BoardState> {
    let text = if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        text
    } else {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };
    serde_json::from_str(&text).context("parsing state")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = match (&cli.state, &cli.script) {
        (Some(path), _) => render(&read_state(path)?, None),
        (None, Some(script)) => replay(script, cli.each)?,
        (None, None) => render(&BoardState::default(), None),
    };
    print!("{}", output);
    Ok(())
}
