//! CLI for dungeon generation

use anyhow::Context;
use clap::Parser;
use dungeon_crawler::{GenerationConfig, Session};
use tracing_subscriber::EnvFilter;

/// Generate a multi-level dungeon and print every level
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of levels
    #[arg(long, default_value_t = GenerationConfig::default().level_count)]
    levels: usize,

    /// Generated level width
    #[arg(long, default_value_t = GenerationConfig::default().width)]
    width: usize,

    /// Generated level height
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

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Generate dungeon, print ASCII render
fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let default = if args.verbose > 0 { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut session = Session::new(GenerationConfig {
        level_count: args.levels,
        width: args.width,
        height: args.height,
        seed: args.seed,
        start_level: args.start_level,
        goal_level: args.goal_level,
    })
    .context("Could not generate dungeon")?;

    println!("{}", session.dungeon().render());
    let route = session.route().context("No route from spawn")?;
    println!(
        "\nShortest path: {} steps over {} stairs",
        route.steps(),
        route.level_transitions()
    );
    Ok(())
}
