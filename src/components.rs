//! ECS component types used by the arena simulation.
//!
//! Every combatant ("ball") and orbiting item is an entity assembled from these
//! records. Components are attached independently, so systems classify
//! entities by the presence of components rather than by a concrete type.
use bevy::prelude::*;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::constants::{FALLBACK_MASS, MASS_EPSILON};
use crate::geometry::{normalize_degrees, OrientedRect};

/// World position and nominal circular extent.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Spatial {
    /// Centre of the entity in arena coordinates.
    pub position: Vec2,
    /// Radius used for circle collisions and boundary checks.
    pub radius: f32,
}

impl Spatial {
    /// Creates a spatial record at `position` with the given `radius`.
    #[must_use]
    pub const fn new(position: Vec2, radius: f32) -> Self {
        Self { position, radius }
    }
}

/// Linear velocity in units per second.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Kinetic {
    /// Velocity vector.
    pub velocity: Vec2,
}

impl Kinetic {
    /// Wraps `velocity` in a component.
    #[must_use]
    pub const fn new(velocity: Vec2) -> Self {
        Self { velocity }
    }
}

/// Target speed that collisions involving items restore.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct DesiredSpeed {
    /// Magnitude the velocity is rescaled to.
    pub speed: f32,
}

/// Mass and bounciness used by collision response.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PhysicalProps {
    /// Mass, always positive once constructed through [`PhysicalProps::new`].
    pub mass: f32,
    /// Fraction of relative normal velocity retained after a bounce.
    pub restitution: f32,
}

impl PhysicalProps {
    /// Builds physical properties, replacing a non-positive or non-finite
    /// mass with a unit mass.
    ///
    /// # Examples
    ///
    /// ```
    /// use arena_duel::components::PhysicalProps;
    /// assert_eq!(PhysicalProps::new(-2.0, 0.5).mass, 1.0);
    /// assert_eq!(PhysicalProps::new(4.0, 0.5).mass, 4.0);
    /// ```
    #[must_use]
    pub fn new(mass: f32, restitution: f32) -> Self {
        let mass = if mass.is_finite() && mass > 0.0 {
            mass
        } else {
            warn!("mass {mass} is not positive; using {FALLBACK_MASS}");
            FALLBACK_MASS
        };
        Self { mass, restitution }
    }

    /// Inverse mass, or zero for masses too small to divide by safely.
    #[must_use]
    pub fn inverse_mass(&self) -> f32 {
        if self.mass > MASS_EPSILON {
            self.mass.recip()
        } else {
            0.0
        }
    }
}

/// Hit points of a combatant. The entity is dead once `current_hp <= 0`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vitality {
    /// Upper bound for healing.
    pub max_hp: i32,
    /// Remaining hit points. May dip below zero for the rest of a frame.
    pub current_hp: i32,
}

impl Vitality {
    /// Full health at `max_hp`.
    #[must_use]
    pub const fn full(max_hp: i32) -> Self {
        Self {
            max_hp,
            current_hp: max_hp,
        }
    }

    /// Returns `true` once hit points have run out.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current_hp <= 0
    }

    /// Removes `amount` hit points.
    pub fn apply_damage(&mut self, amount: i32) {
        self.current_hp = self.current_hp.saturating_sub(amount);
    }

    /// Restores `amount` hit points without exceeding `max_hp`.
    pub fn heal(&mut self, amount: i32) {
        self.current_hp = self.current_hp.saturating_add(amount).min(self.max_hp);
    }
}

/// Passive contact damage a body deals to items that strike it.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyDamage {
    /// Damage before boosts and reductions.
    pub amount: f32,
}

/// Rotation in degrees, kept in `[0, 360)`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    /// Current angle.
    pub angle: f32,
}

impl Orientation {
    /// Creates a normalised orientation.
    #[must_use]
    pub fn new(angle: f32) -> Self {
        Self {
            angle: normalize_degrees(angle),
        }
    }

    /// Sets the angle, wrapping into `[0, 360)`.
    pub fn set(&mut self, angle: f32) {
        self.angle = normalize_degrees(angle);
    }
}

/// Rectangle collider in the owner's local frame.
///
/// The offset is applied in world space before rotation; the rectangle then
/// rotates about its own centre by the owner's [`Orientation`].
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct OrientedHitbox {
    /// Full width in the local frame.
    pub width: f32,
    /// Full height in the local frame.
    pub height: f32,
    /// Displacement of the rectangle centre from the owner's position.
    pub offset: Vec2,
}

impl OrientedHitbox {
    /// A hitbox centred on its owner.
    #[must_use]
    pub const fn centered(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            offset: Vec2::ZERO,
        }
    }

    /// World-space rectangle for an owner at `position` rotated by `angle`.
    #[must_use]
    pub fn world_rect(&self, position: Vec2, angle: f32) -> OrientedRect {
        OrientedRect::new(position + self.offset, self.width, self.height, angle)
    }
}

/// Weapon or shield payload carried by an orbital entity.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Display name used in logs.
    pub name: String,
    /// Damage dealt to bodies on contact.
    pub damage: f32,
    /// Fraction of incoming damage blocked when this item intercepts it.
    pub damage_reduction: f32,
    /// Additional speed granted to the carrier. Carried for presets only.
    pub speed_boost: f32,
    /// Extra impulse applied along the contact normal.
    pub knockback_strength: f32,
}

/// Non-owning link from an orbital item to the entity it circles.
///
/// The parent is a plain [`Entity`] handle and must be checked for existence
/// before use.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct OrbitalLink {
    /// Entity being orbited.
    pub parent: Entity,
    /// Distance from the parent's centre.
    pub orbit_radius: f32,
    /// Degrees per second.
    pub angular_speed: f32,
    /// Current orbital angle in degrees.
    pub angle: f32,
}

/// Temporary invulnerability after spawning.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct SpawnProtection {
    /// Seconds until the protection lapses.
    pub remaining: f32,
}

/// Minimum spacing between two damage applications on one entity.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct DamageCooldown {
    /// Seconds that must pass after a hit before the next one lands.
    pub cooldown_time: f32,
    /// Simulation time of the last hit, or `None` if never hit.
    pub last_damage_time: Option<f32>,
}

impl DamageCooldown {
    /// A cooldown that has never been triggered.
    #[must_use]
    pub const fn new(cooldown_time: f32) -> Self {
        Self {
            cooldown_time,
            last_damage_time: None,
        }
    }

    /// Returns `true` when a hit at `now` is allowed.
    #[must_use]
    pub fn is_ready(&self, now: f32) -> bool {
        self.last_damage_time
            .is_none_or(|last| now - last >= self.cooldown_time)
    }

    /// Records a hit at `now`.
    pub fn stamp(&mut self, now: f32) {
        self.last_damage_time = Some(now);
    }
}

/// Bounded resource spent on skills.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Mana {
    /// Upper bound.
    pub max: f32,
    /// Current amount in `[0, max]`.
    pub current: f32,
    /// Units restored per second.
    pub regen_rate: f32,
}

impl Mana {
    /// A full pool.
    #[must_use]
    pub const fn full(max: f32, regen_rate: f32) -> Self {
        Self {
            max,
            current: max,
            regen_rate,
        }
    }
}

/// Controlling player of a combatant or its items.
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PlayerId(pub u8);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Play-field rectangle. One entity carries it.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ArenaBounds {
    /// Top-left corner.
    pub origin: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl ArenaBounds {
    /// Smallest coordinate on each axis.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.origin
    }

    /// Largest coordinate on each axis.
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.origin + self.size
    }
}

/// Floating damage number shown above a target.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct DamagePopup {
    /// Damage dealt.
    pub amount: i32,
    /// Entity that took the damage.
    pub target: Entity,
    /// Initial lifetime in seconds.
    pub duration: f32,
    /// Seconds left before removal.
    pub time_left: f32,
    /// RGB colour.
    pub color: [u8; 3],
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0)]
    #[case(-3.0)]
    #[case(f32::NAN)]
    fn invalid_mass_falls_back(#[case] mass: f32) {
        assert_eq!(PhysicalProps::new(mass, 1.0).mass, FALLBACK_MASS);
    }

    #[rstest]
    fn heal_is_capped_at_max() {
        let mut vitality = Vitality {
            max_hp: 100,
            current_hp: 90,
        };
        vitality.heal(40);
        assert_eq!(vitality.current_hp, 100);
    }

    #[rstest]
    #[case(None, 0.0, true)]
    #[case(Some(1.0), 1.05, false)]
    #[case(Some(1.0), 1.1, true)]
    fn cooldown_readiness(#[case] last: Option<f32>, #[case] now: f32, #[case] ready: bool) {
        let cooldown = DamageCooldown {
            cooldown_time: 0.1,
            last_damage_time: last,
        };
        assert_eq!(cooldown.is_ready(now), ready);
    }

    #[rstest]
    fn orientation_wraps() {
        let mut orientation = Orientation::new(-30.0);
        assert_eq!(orientation.angle, 330.0);
        orientation.set(400.0);
        assert_eq!(orientation.angle, 40.0);
    }
}
