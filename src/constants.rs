//! Simulation constants shared across systems.
//!
//! Tunables that designers are expected to change live in
//! [`SimConfig`](crate::config::SimConfig); these values seed its defaults and
//! the construction API.

/// Attacks arriving within this half-angle of a shield's facing are blocked.
pub const SHIELD_BLOCK_HALF_ANGLE_DEG: f32 = 60.0;
/// Lifetime of a floating damage popup in seconds.
pub const DAMAGE_POPUP_DURATION: f32 = 0.9;
/// RGB colour of damage popups.
pub const DAMAGE_POPUP_COLOR: [u8; 3] = [255, 220, 60];
/// Idle rotation speed for non-orbital entities, in degrees per second.
pub const SPIN_RATE_DEG: f32 = 180.0;

/// Invulnerability window granted to freshly spawned balls.
pub const DEFAULT_SPAWN_PROTECTION: f32 = 0.4;
/// Minimum spacing between two damage applications on the same entity.
pub const DEFAULT_DAMAGE_COOLDOWN: f32 = 0.1;
/// Restitution used when a ball description leaves it out.
pub const DEFAULT_RESTITUTION: f32 = 0.8;

/// Collision radius of an orbital item's circular extent.
pub const DEFAULT_ITEM_RADIUS: f32 = 6.0;
/// Mass of an orbital item.
pub const DEFAULT_ITEM_MASS: f32 = 0.1;
/// Restitution of an orbital item.
pub const DEFAULT_ITEM_RESTITUTION: f32 = 1.0;
/// Orbit radius used when an item description leaves it out.
pub const DEFAULT_ORBIT_RADIUS: f32 = 40.0;
/// Angular speed (degrees per second) used when an item description leaves it out.
pub const DEFAULT_ANGULAR_SPEED: f32 = 180.0;

/// Mass substituted when a non-positive mass is supplied at construction.
pub const FALLBACK_MASS: f32 = 1.0;
/// Masses at or below this value are treated as immovable.
pub const MASS_EPSILON: f32 = 1e-8;
/// Velocities shorter than this are not renormalised.
pub const SPEED_EPSILON: f32 = 1e-6;

/// Number of skill slots bound to a caster.
pub const SKILL_SLOT_COUNT: usize = 4;

/// Width of the standard arena.
pub const ARENA_WIDTH: f32 = 960.0;
/// Height of the standard arena.
pub const ARENA_HEIGHT: f32 = 540.0;
