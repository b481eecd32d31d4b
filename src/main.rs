//! Headless runner that plays a seeded duel between two preset classes and
//! logs the result.
use anyhow::{ensure, Context, Result};
use arena_duel::constants::{ARENA_HEIGHT, ARENA_WIDTH};
use arena_duel::{init_logging, ArenaMatch, MatchOutcome, PlayerId, PresetCatalog};
use bevy::math::Vec2;
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Runs a headless arena duel between two classes
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Class of player 1
    #[arg(long, default_value = "Knight")]
    p1: String,
    /// Class of player 2
    #[arg(long, default_value = "Mage")]
    p2: String,
    /// Seed for the initial velocities
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Seconds per simulation step
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,
    /// Stop after this many steps if nobody has won
    #[arg(long, default_value_t = 60 * 60 * 5)]
    max_frames: u32,
    /// Optional JSON preset catalog replacing the built-in roster
    #[arg(long)]
    presets: Option<std::path::PathBuf>,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_catalog(args: &Args) -> Result<PresetCatalog> {
    let Some(path) = &args.presets else {
        return Ok(PresetCatalog::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading presets from {}", path.display()))?;
    PresetCatalog::from_json_str(&json).context("parsing preset catalog")
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    ensure!(
        args.dt.is_finite() && args.dt > 0.0,
        "--dt must be positive, got {}",
        args.dt
    );

    let catalog = load_catalog(&args)?;
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut arena = ArenaMatch::new();
    arena.spawn_arena(Vec2::ZERO, Vec2::new(ARENA_WIDTH, ARENA_HEIGHT))?;

    let spawns = [
        (&args.p1, PlayerId(1), Vec2::new(ARENA_WIDTH / 4.0, ARENA_HEIGHT / 2.0)),
        (&args.p2, PlayerId(2), Vec2::new(3.0 * ARENA_WIDTH / 4.0, ARENA_HEIGHT / 2.0)),
    ];
    for (class, player, position) in spawns {
        let spec = catalog.ball_spec(class, player, position, &mut rng)?;
        arena.spawn_ball(spec)?;
        info!("{player} enters as {class}");
    }

    match arena.run_until_decided(args.dt, args.max_frames) {
        MatchOutcome::Winner(player) => info!("{player} wins after {:.2}s", arena.elapsed()),
        MatchOutcome::Draw => info!("draw after {:.2}s", arena.elapsed()),
        MatchOutcome::InProgress => info!(
            "no winner after {} frames ({:.2}s)",
            args.max_frames,
            arena.elapsed()
        ),
    }
    Ok(())
}
