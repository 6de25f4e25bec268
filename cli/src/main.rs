//! # 2048 CLI
//!
//! Command-line interface for playing 2048 interactively, optionally
//! resuming from a saved game, or running headless soak games with simple
//! move-picking policies.

mod store;

use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use slide2048_core::{Direction, Game, MemoryStore, MoveStart, StateStore, Terminal};

use crate::store::FileStore;

const CONTROLS: &str = "Controls: WASD or Arrow Keys | Q to quit | R to restart";

#[derive(Parser, Debug)]
#[command(name = "slide2048")]
#[command(author, version, about = "Play 2048 in the terminal or run headless games")]
struct Args {
    /// Number of episodes to run in headless mode (interactive if absent)
    #[arg(short, long)]
    episodes: Option<u32>,

    /// Random seed for deterministic runs (random if absent)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Save the game to this JSON file and resume from it on start
    #[arg(long, value_name = "PATH")]
    state: Option<PathBuf>,

    /// Ignore the saved board and start a new game (best score is kept)
    #[arg(long)]
    new: bool,

    /// Pause between sliding and merging, in milliseconds
    #[arg(long, default_value = "80")]
    animate_ms: u64,

    /// Maximum steps per episode (0 = unlimited)
    #[arg(short, long, default_value = "10000")]
    max_steps: u32,

    /// Policy for headless mode
    #[arg(short, long, value_enum, default_value = "random")]
    policy: Policy,

    /// Show board after each move in headless mode
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    /// Random legal moves
    Random,
    /// Cycle through moves: Left, Down, Right, Up
    Cycle,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    info!("seed {seed}");

    if let Some(episodes) = args.episodes {
        run_headless(&args, seed, episodes);
        return Ok(());
    }

    let store: Box<dyn StateStore> = match &args.state {
        Some(path) => Box::new(FileStore::new(path)),
        None => Box::new(MemoryStore::new()),
    };
    let mut game = Game::with_store(seed, store);
    if args.new {
        game.new_game();
    }
    run_interactive(&args, &mut game)
}

/// Run interactive mode where user plays with keyboard.
fn run_interactive<S: StateStore>(args: &Args, game: &mut Game<S>) -> Result<()> {
    let _raw = RawMode::enable();
    let mut stdin = io::stdin();
    let mut buffer = [0u8; 3];

    redraw(game, None)?;

    loop {
        let bytes_read = stdin.read(&mut buffer).context("reading keyboard input")?;
        if bytes_read == 0 {
            continue;
        }

        match parse_input(&buffer[..bytes_read]) {
            InputAction::Move(direction) => {
                if game.begin_move(direction) != MoveStart::Moved {
                    continue;
                }
                // Show the slid board, with merges still pending, before settling.
                redraw(game, None)?;
                thread::sleep(Duration::from_millis(args.animate_ms));
                let settlement = game.settle();
                redraw(game, settlement.map(|s| s.reward))?;
            }
            InputAction::Restart => {
                game.new_game();
                redraw(game, None)?;
            }
            InputAction::Quit => {
                println!("\nGoodbye!");
                return Ok(());
            }
            InputAction::None => {}
        }
    }
}

fn redraw<S: StateStore>(game: &Game<S>, reward: Option<u32>) -> Result<()> {
    let mut out = io::stdout().lock();
    write!(out, "\x1b[2J\x1b[H")?; // Clear screen
    writeln!(out, "=== 2048 ===")?;
    writeln!(out, "{CONTROLS}\n")?;
    write!(out, "{}", game)?;

    if let Some(reward) = reward.filter(|&r| r > 0) {
        writeln!(out, "  +{} points!", reward)?;
    }

    match game.terminal() {
        Some(Terminal::Won) => {
            writeln!(out, "\n  *** YOU WIN! ***")?;
            writeln!(out, "  Press R to play again or Q to quit")?;
        }
        Some(Terminal::Lost) => {
            writeln!(out, "\n  *** GAME OVER ***")?;
            writeln!(out, "  Final Score: {}", game.scores().current)?;
            writeln!(out, "  Max Tile: {}", game.max_tile())?;
            writeln!(out, "\n  Press R to restart or Q to quit")?;
        }
        None => {}
    }
    out.flush()?;
    Ok(())
}

/// Run headless simulation mode.
fn run_headless(args: &Args, seed: u64, episodes: u32) {
    let mut total_score: u64 = 0;
    let mut max_tile_overall: u32 = 0;
    let mut wins = 0u32;
    let mut scores: Vec<u32> = Vec::with_capacity(episodes as usize);
    let mut tile_counts: BTreeMap<u32, u32> = BTreeMap::new();

    // Use a separate RNG for action selection
    let mut action_rng = SmallRng::seed_from_u64(seed.wrapping_add(1000));

    for episode in 0..episodes {
        let mut game = Game::new(seed.wrapping_add(u64::from(episode)));
        let mut steps = 0;
        let mut action_cycle = 0;

        while !game.is_done() && (args.max_steps == 0 || steps < args.max_steps) {
            let action = match args.policy {
                Policy::Random => select_random_action(game.legal_moves(), &mut action_rng),
                Policy::Cycle => select_cycle_action(game.legal_moves(), &mut action_cycle),
            };

            let Some(direction) = action else {
                break; // No legal moves
            };
            game.step(direction);
            steps += 1;

            if args.verbose {
                println!("Episode {} Step {}: {}", episode + 1, steps, direction);
                print!("{}", game);
            }
        }

        let score = game.scores().current;
        let max_tile = game.max_tile();

        scores.push(score);
        total_score += u64::from(score);
        max_tile_overall = max_tile_overall.max(max_tile);
        *tile_counts.entry(max_tile).or_insert(0) += 1;
        if game.terminal() == Some(Terminal::Won) {
            wins += 1;
        }

        if args.verbose {
            println!(
                "Episode {}: Score={}, MaxTile={}, Steps={}",
                episode + 1,
                score,
                max_tile,
                steps
            );
        }
    }

    if episodes == 0 {
        println!("=== Simulation Results ===");
        println!("episodes=0");
        return;
    }

    // Compute statistics
    let avg_score = total_score as f64 / f64::from(episodes);
    scores.sort_unstable();
    let mid = scores.len() / 2;
    let median_score = if scores.len() % 2 == 0 {
        (f64::from(scores[mid - 1]) + f64::from(scores[mid])) / 2.0
    } else {
        f64::from(scores[mid])
    };

    // Output results in parseable format
    println!("=== Simulation Results ===");
    println!("episodes={}", episodes);
    println!("policy={:?}", args.policy);
    println!("seed={}", seed);
    println!("max_steps={}", args.max_steps);
    println!("avg_score={:.2}", avg_score);
    println!("median_score={:.2}", median_score);
    println!("min_score={}", scores.first().copied().unwrap_or(0));
    println!("max_score={}", scores.last().copied().unwrap_or(0));
    println!("max_tile_overall={}", max_tile_overall);
    println!("wins={}", wins);

    let distribution: Vec<String> = tile_counts
        .iter()
        .map(|(tile, count)| format!("{}:{}", tile, count))
        .collect();
    println!("tile_distribution={}", distribution.join(","));
}

/// Select a random legal move.
fn select_random_action(legal: [bool; 4], rng: &mut SmallRng) -> Option<Direction> {
    let valid: Vec<Direction> = Direction::all()
        .into_iter()
        .zip(legal)
        .filter(|(_, ok)| *ok)
        .map(|(d, _)| d)
        .collect();

    if valid.is_empty() {
        None
    } else {
        Some(valid[rng.gen_range(0..valid.len())])
    }
}

/// Select moves in a cycle: Left, Down, Right, Up.
fn select_cycle_action(legal: [bool; 4], cycle: &mut usize) -> Option<Direction> {
    let order = [
        Direction::Left,
        Direction::Down,
        Direction::Right,
        Direction::Up,
    ];

    // Try moves in cycle order, starting from current position
    for _ in 0..4 {
        let direction = order[*cycle % 4];
        *cycle += 1;
        if legal[direction as usize] {
            return Some(direction);
        }
    }

    None
}

#[derive(Debug, PartialEq, Eq)]
enum InputAction {
    Move(Direction),
    Restart,
    Quit,
    None,
}

fn parse_input(bytes: &[u8]) -> InputAction {
    match bytes {
        // Arrow keys (escape sequences)
        [27, 91, 65] => InputAction::Move(Direction::Up),
        [27, 91, 66] => InputAction::Move(Direction::Down),
        [27, 91, 67] => InputAction::Move(Direction::Right),
        [27, 91, 68] => InputAction::Move(Direction::Left),

        // WASD keys
        [b'w'] | [b'W'] => InputAction::Move(Direction::Up),
        [b's'] | [b'S'] => InputAction::Move(Direction::Down),
        [b'a'] | [b'A'] => InputAction::Move(Direction::Left),
        [b'd'] | [b'D'] => InputAction::Move(Direction::Right),

        // Control keys
        [b'q'] | [b'Q'] | [3] | [27] => InputAction::Quit, // q, Q, Ctrl+C, Esc
        [b'r'] | [b'R'] => InputAction::Restart,

        _ => InputAction::None,
    }
}

/// Puts the terminal in non-canonical, no-echo mode for single-key input
/// and restores the previous settings on drop.
struct RawMode {
    #[cfg(unix)]
    saved: Option<libc::termios>,
}

#[cfg(unix)]
impl RawMode {
    fn enable() -> Self {
        use std::os::unix::io::AsRawFd;
        let fd = io::stdin().as_raw_fd();
        // SAFETY: termios is plain data and fd is a valid descriptor for
        // the lifetime of the process.
        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &mut termios) != 0 {
                return RawMode { saved: None };
            }
            let saved = termios;
            termios.c_lflag &= !(libc::ICANON | libc::ECHO);
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;
            libc::tcsetattr(fd, libc::TCSANOW, &termios);
            RawMode { saved: Some(saved) }
        }
    }
}

#[cfg(unix)]
impl Drop for RawMode {
    fn drop(&mut self) {
        use std::os::unix::io::AsRawFd;
        if let Some(saved) = self.saved {
            // SAFETY: restores settings captured by `enable` on the same fd.
            unsafe {
                libc::tcsetattr(io::stdin().as_raw_fd(), libc::TCSANOW, &saved);
            }
        }
    }
}

#[cfg(not(unix))]
impl RawMode {
    // On non-Unix systems, just continue without raw mode;
    // interactive mode will require Enter after each key.
    fn enable() -> Self {
        RawMode {}
    }
}
