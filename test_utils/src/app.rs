//! App scaffolding for integration tests.

use std::ops::{Deref, DerefMut};

use arena_duel::{ArenaMatch, ArenaPlugin, SimClock};
use bevy::prelude::App;

/// An [`App`] with only the simulation plugin installed.
///
/// # Examples
/// ```
/// use test_utils::{sim_app, step};
/// let mut app = sim_app();
/// step(&mut app, 0.5);
/// assert_eq!(app.world().resource::<arena_duel::SimClock>().elapsed, 0.5);
/// ```
pub fn sim_app() -> App {
    let mut app = App::new();
    app.add_plugins(ArenaPlugin::default());
    app
}

/// Advances the clock by `dt` and runs one update.
///
/// # Panics
/// Panics if the app has no [`SimClock`].
pub fn step(app: &mut App, dt: f32) {
    app.world_mut().resource_mut::<SimClock>().begin_frame(dt);
    app.update();
}

/// Wrapper that forwards `Send` and `Sync` so a match can live in an rspec
/// fixture.
#[derive(Default)]
pub struct ThreadSafeMatch(pub ArenaMatch);

impl Deref for ThreadSafeMatch {
    type Target = ArenaMatch;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for ThreadSafeMatch {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl std::fmt::Debug for ThreadSafeMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ThreadSafeMatch")
    }
}

// SAFETY: rspec fixtures must implement `Send + Sync`, and the suites run
// serially. Callers keep the match behind a mutex, so no two threads touch
// the wrapped `App` at once.
unsafe impl Send for ThreadSafeMatch {}
unsafe impl Sync for ThreadSafeMatch {}
