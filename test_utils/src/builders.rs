//! Convenience constructors for combatants and items used in tests.

use arena_duel::components::{
    DamageCooldown, Item, Kinetic, OrbitalLink, PhysicalProps, PlayerId, Spatial, Vitality,
};
use arena_duel::spawn::{BallSpec, ItemSpec};
use bevy::prelude::*;

/// Item payload with the given damage and shield reduction and no knockback.
///
/// # Examples
/// ```
/// use test_utils::item;
/// let shield = item("Shield", 0.0, 0.4);
/// assert_eq!(shield.damage_reduction, 0.4);
/// ```
pub fn item(name: &str, damage: f32, damage_reduction: f32) -> Item {
    Item {
        name: name.to_owned(),
        damage,
        damage_reduction,
        speed_boost: 0.0,
        knockback_strength: 0.0,
    }
}

/// Spawns a stationary body: radius 20, mass 4, restitution 1, 100 hp and a
/// 0.1 s damage cooldown that has never fired.
pub fn body(world: &mut World, player: u8, position: Vec2) -> Entity {
    world
        .spawn((
            Spatial::new(position, 20.0),
            Kinetic::default(),
            PhysicalProps::new(4.0, 1.0),
            Vitality::full(100),
            DamageCooldown::new(0.1),
            PlayerId(player),
        ))
        .id()
}

/// Spawns a circular item (radius 6, mass 0.1) that sits still on its orbit
/// at `angle` degrees around `parent`.
///
/// # Panics
/// Panics if `parent` has no [`Spatial`].
pub fn orbiting_item(
    world: &mut World,
    parent: Entity,
    payload: Item,
    orbit_radius: f32,
    angle: f32,
) -> Entity {
    let anchor = world
        .get::<Spatial>(parent)
        .map(|spatial| spatial.position)
        .expect("parent has a position");
    let offset = Vec2::from_angle(angle.to_radians()) * orbit_radius;
    world
        .spawn((
            Spatial::new(anchor + offset, 6.0),
            PhysicalProps::new(0.1, 1.0),
            OrbitalLink {
                parent,
                orbit_radius,
                angular_speed: 0.0,
                angle,
            },
            payload,
        ))
        .id()
}

/// [`BallSpec`] for `player` at `position` without spawn protection.
pub fn ball_at(player: u8, position: Vec2) -> BallSpec {
    BallSpec {
        player: Some(PlayerId(player)),
        position,
        spawn_protection: 0.0,
        ..BallSpec::default()
    }
}

/// A sword dealing `damage` on a short, stationary orbit.
pub fn sword_spec(damage: f32, orbit_radius: f32) -> ItemSpec {
    ItemSpec {
        orbit_radius,
        angular_speed: 0.0,
        ..ItemSpec::new(item("Sword", damage, 0.0))
    }
}
