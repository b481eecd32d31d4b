//! Seeded, serial execution of rspec duel suites.

use rspec::{block::Suite, ConfigurationBuilder, Logger, Runner};
use std::sync::Arc;

/// Environment variable replacing the default seed of a duel suite.
pub const SEED_VAR: &str = "ARENA_DUEL_SEED";

/// Seed taken from [`SEED_VAR`], or `default` when it is unset or not a
/// number.
pub fn duel_seed(default: u64) -> u64 {
    std::env::var(SEED_VAR)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

/// Builds the suite for `seed` and runs it serially, so the shared match is
/// only ever stepped from one thread. The seed is logged first so a failing
/// duel can be replayed.
pub fn run_seeded<T, F>(seed: u64, build: F)
where
    T: Clone + Send + Sync + std::fmt::Debug,
    F: FnOnce(u64) -> Suite<T>,
{
    arena_duel::init_logging(false);
    log::warn!("duel suite running with seed {seed}; replay with {SEED_VAR}={seed}");
    let suite = build(seed);
    let logger = Arc::new(Logger::new(std::io::stdout()));
    let config = ConfigurationBuilder::default()
        .parallel(false)
        .exit_on_failure(true)
        .build()
        .unwrap_or_else(|e| panic!("rspec configuration failed: {e}"));
    Runner::new(config, vec![logger]).run(&suite);
}
