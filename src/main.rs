//! CLI for dungeon solving

use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use dungeon_crawler::{GenerationConfig, Session, TraversalController, TraversalState};
use tracing_subscriber::EnvFilter;

/// Generate a multi-level dungeon and walk from the spawn to the goal
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of levels
    #[arg(long, default_value_t = GenerationConfig::default().level_count)]
    levels: usize,

    /// Level width
    #[arg(long, default_value_t = GenerationConfig::default().width)]
    width: usize,

    /// Level height
    #[arg(long, default_value_t = GenerationConfig::default().height)]
    height: usize,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Level the player starts on
    #[arg(long, default_value_t = GenerationConfig::default().start_level)]
    start_level: usize,

    /// Level holding the goal [default: last level]
    #[arg(long)]
    goal_level: Option<usize>,

    /// Display the walk on the terminal
    #[arg(short, long)]
    playback: bool,

    /// Playback frame length in milliseconds
    #[arg(short, long, default_value_t = 150)]
    frame_length: u64,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Generate, solve, print report
fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = GenerationConfig {
        level_count: args.levels,
        width: args.width,
        height: args.height,
        seed: args.seed,
        start_level: args.start_level,
        goal_level: args.goal_level,
    };
    let mut session = Session::new(config).context("Could not generate dungeon")?;
    let shortest = session.route().context("No route from spawn")?.steps();

    let mut controller = TraversalController::new();
    let mut ticks = 0;
    let cap = session.dungeon().cell_count() * 2;
    while !controller.state().is_terminal() {
        if ticks > cap {
            bail!("Traversal did not finish in {} ticks", cap);
        }
        controller.tick(&mut session)?;
        ticks += 1;

        if args.playback {
            print!("\x1B[2J\x1B[1;1H");
            println!("{}", session.render_current());
            thread::sleep(Duration::from_millis(args.frame_length));
        }
    }

    match controller.state() {
        TraversalState::GoalReached => println!(
            "The shortest path is {} steps, crossing {} stairs.",
            shortest,
            controller.transitions()
        ),
        _ => println!(
            "Got stuck at {} after {} ticks; regenerate the dungeon.",
            session.player(),
            ticks
        ),
    }
    Ok(())
}
