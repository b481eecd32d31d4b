#![cfg_attr(docsrs, feature(doc_cfg))]
//! Simulation core for a two-player arena duel between balls armed with
//! orbiting weapons and shields.
//! Re-exports the plugin, match facade, and common components for the headless
//! runner and tests.
pub mod arena_match;
pub mod boundary;
pub mod collision;
pub mod combat;
pub mod components;
pub mod config;
pub mod constants;
pub mod geometry;
pub mod logging;
pub mod mortality;
pub mod movement;
pub mod numeric;
pub mod orbit;
pub mod plugin;
pub mod presentation;
pub mod presets;
pub mod skills;
pub mod spawn;
pub mod timers;

// Re-export commonly used items
pub use arena_match::{ArenaMatch, MatchOutcome};
pub use components::{
    ArenaBounds, BodyDamage, DamageCooldown, DamagePopup, DesiredSpeed, Item, Kinetic, Mana,
    OrbitalLink, Orientation, OrientedHitbox, PhysicalProps, PlayerId, Spatial, SpawnProtection,
    Vitality,
};
pub use config::{ConfigError, SimConfig};
pub use logging::init as init_logging;
pub use plugin::{ArenaPlugin, ArenaSimSet, SimClock};
pub use presentation::{PresentationOptions, PresentationPlugin};
pub use presets::{PresetCatalog, PresetError};
pub use skills::{cast_skill, CastError, EffectKind, SkillDefinition};
pub use spawn::{spawn_arena, spawn_ball, spawn_orbital_item, BallSpec, ItemSpec, SpawnError};

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use arena_duel::prelude::*;
    //! let mut arena = ArenaMatch::new();
    //! arena.advance(1.0 / 60.0);
    //! ```

    pub use crate::ArenaMatch;
    pub use crate::ArenaPlugin;
    pub use crate::BallSpec;
    pub use crate::ItemSpec;
    pub use crate::MatchOutcome;
    pub use crate::PlayerId;
    pub use crate::SimConfig;
}
