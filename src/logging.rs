//! Logger bootstrap for the headless runner and tests.
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Filter used when `RUST_LOG` is unset: dependencies such as bevy stay at
/// `warn`, this crate logs at `info`, or at `debug` when `verbose` is set so
/// every damage application is shown.
#[must_use]
pub fn default_filter(verbose: bool) -> String {
    let crate_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    format!(
        "{},{}={}",
        LevelFilter::Warn.as_str().to_ascii_lowercase(),
        env!("CARGO_CRATE_NAME"),
        crate_level.as_str().to_ascii_lowercase()
    )
}

/// Initializes the global logger with [`default_filter`]. `RUST_LOG`
/// overrides it.
pub fn init(verbose: bool) {
    let env = Env::default().default_filter_or(default_filter(verbose));
    let mut builder = Builder::from_env(env);

    // A logger may already be installed by an earlier test.
    if builder.try_init().is_err() {
        log::trace!("logger already initialised");
    }
}
