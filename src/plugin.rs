//! Bevy plugin wiring the per-frame simulation pipeline.
//!
//! [`ArenaPlugin`] inserts the [`SimClock`] and [`SimConfig`] resources and
//! chains every simulation system inside [`ArenaSimSet`] on the `Update`
//! schedule. The chain order is load-bearing: boundary clamping precedes
//! collision, the mortality sweep observes the frame's damage, and orbital
//! kinematics never circles a parent that was just removed.
use bevy::prelude::*;
use log::warn;

use crate::boundary::boundary_system;
use crate::collision::collision_system;
use crate::config::SimConfig;
use crate::mortality::mortality_system;
use crate::movement::movement_system;
use crate::orbit::{orbital_system, spin_system};
use crate::timers::{mana_regen_system, skill_effect_system, spawn_protection_system};

/// Simulation time driven by explicit steps rather than the wall clock.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
    /// Length of the current step in seconds.
    pub delta: f32,
    /// Seconds simulated so far, including the current step.
    pub elapsed: f32,
}

impl SimClock {
    /// Records a new step of `dt` seconds.
    ///
    /// Negative and non-finite steps are replaced by zero so a bad frame time
    /// cannot run the simulation backwards.
    ///
    /// # Examples
    ///
    /// ```
    /// use arena_duel::SimClock;
    /// let mut clock = SimClock::default();
    /// clock.begin_frame(0.5);
    /// clock.begin_frame(f32::NAN);
    /// assert_eq!(clock.delta, 0.0);
    /// assert_eq!(clock.elapsed, 0.5);
    /// ```
    pub fn begin_frame(&mut self, dt: f32) {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            warn!("ignoring invalid time step {dt}");
            0.0
        };
        self.delta = dt;
        self.elapsed += dt;
    }

    /// Time used to stamp and compare cooldowns.
    #[must_use]
    pub const fn now(&self) -> f32 {
        self.elapsed
    }
}

/// System set containing the whole simulation chain.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaSimSet;

/// Plugin registering the simulation resources and systems.
///
/// Adding the plugin does not start time; callers advance the [`SimClock`]
/// before each `App::update`, as [`ArenaMatch`](crate::ArenaMatch) does.
#[derive(Debug, Default)]
pub struct ArenaPlugin {
    /// Configuration to install. `None` keeps any existing resource or falls
    /// back to the defaults.
    pub config: Option<SimConfig>,
}

impl ArenaPlugin {
    /// Plugin using `config` instead of the defaults.
    #[must_use]
    pub const fn with_config(config: SimConfig) -> Self {
        Self {
            config: Some(config),
        }
    }
}

impl Plugin for ArenaPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimClock>();
        match &self.config {
            Some(config) => {
                app.insert_resource(config.clone());
            }
            None => {
                app.init_resource::<SimConfig>();
            }
        }

        app.add_systems(
            Update,
            (
                movement_system,
                boundary_system,
                spawn_protection_system,
                mana_regen_system,
                skill_effect_system,
                collision_system,
                mortality_system,
                spin_system,
                orbital_system,
            )
                .chain()
                .in_set(ArenaSimSet),
        );
    }
}
