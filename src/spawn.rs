//! Construction API for arenas, combatants, and their orbital items.
//!
//! Specs are validated before anything is spawned, so a failed call leaves
//! the world unchanged.
use bevy::prelude::*;
use log::info;
use thiserror::Error;

use crate::components::{
    ArenaBounds, BodyDamage, DamageCooldown, DesiredSpeed, Item, Kinetic, Mana, OrbitalLink,
    Orientation, OrientedHitbox, PhysicalProps, PlayerId, Spatial, SpawnProtection, Vitality,
};
use crate::constants::{
    DEFAULT_ANGULAR_SPEED, DEFAULT_DAMAGE_COOLDOWN, DEFAULT_ITEM_MASS, DEFAULT_ITEM_RADIUS,
    DEFAULT_ITEM_RESTITUTION, DEFAULT_ORBIT_RADIUS, DEFAULT_RESTITUTION, DEFAULT_SPAWN_PROTECTION,
    SKILL_SLOT_COUNT,
};
use crate::geometry::heading;
use crate::skills::{SkillDefinition, SkillSlots};

/// Reasons a spawn request is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpawnError {
    /// Radius must be positive and finite.
    #[error("radius must be positive, got {0}")]
    InvalidRadius(f32),
    /// Maximum health must be positive.
    #[error("max hp must be positive, got {0}")]
    InvalidHealth(i32),
    /// Hitbox dimensions must be positive and finite.
    #[error("hitbox must have positive size, got {width}x{height}")]
    InvalidHitbox {
        /// Requested width.
        width: f32,
        /// Requested height.
        height: f32,
    },
    /// Arena dimensions must be positive and finite.
    #[error("arena must have positive size, got {width}x{height}")]
    InvalidArena {
        /// Requested width.
        width: f32,
        /// Requested height.
        height: f32,
    },
    /// More skills than a loadout has slots.
    #[error("too many skills for one loadout: {count}")]
    TooManySkills {
        /// Number of skills supplied.
        count: usize,
    },
    /// The parent of an orbital item does not exist or has no position.
    #[error("parent {0:?} does not exist or has no position")]
    UnknownParent(Entity),
}

/// Description of an orbital item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSpec {
    /// Item payload.
    pub item: Item,
    /// Distance from the parent's centre.
    pub orbit_radius: f32,
    /// Degrees per second.
    pub angular_speed: f32,
    /// Rectangle width.
    pub hitbox_width: f32,
    /// Rectangle height.
    pub hitbox_height: f32,
    /// Circle radius used when a shield tests for interception.
    pub radius: f32,
    /// Mass used by collision response.
    pub mass: f32,
    /// Restitution used by collision response.
    pub restitution: f32,
}

impl ItemSpec {
    /// Item with default orbit, hitbox, and physical properties.
    #[must_use]
    pub const fn new(item: Item) -> Self {
        Self {
            item,
            orbit_radius: DEFAULT_ORBIT_RADIUS,
            angular_speed: DEFAULT_ANGULAR_SPEED,
            hitbox_width: 18.0,
            hitbox_height: 10.0,
            radius: DEFAULT_ITEM_RADIUS,
            mass: DEFAULT_ITEM_MASS,
            restitution: DEFAULT_ITEM_RESTITUTION,
        }
    }

    fn validate(&self) -> Result<(), SpawnError> {
        let valid = |value: f32| value.is_finite() && value > 0.0;
        if !valid(self.hitbox_width) || !valid(self.hitbox_height) {
            return Err(SpawnError::InvalidHitbox {
                width: self.hitbox_width,
                height: self.hitbox_height,
            });
        }
        if !valid(self.radius) {
            return Err(SpawnError::InvalidRadius(self.radius));
        }
        Ok(())
    }
}

/// Description of a combatant.
#[derive(Debug, Clone, PartialEq)]
pub struct BallSpec {
    /// Controlling player.
    pub player: Option<PlayerId>,
    /// Spawn position.
    pub position: Vec2,
    /// Collision radius.
    pub radius: f32,
    /// Mass. Non-positive values fall back to a unit mass.
    pub mass: f32,
    /// Restitution.
    pub restitution: f32,
    /// Starting and maximum hit points.
    pub max_hp: i32,
    /// Passive contact damage.
    pub body_damage: f32,
    /// Initial velocity.
    pub velocity: Vec2,
    /// Speed restored after item contacts.
    pub desired_speed: Option<f32>,
    /// Orbital items, evenly distributed around the ball.
    pub items: Vec<ItemSpec>,
    /// Skill loadout, at most four.
    pub skills: Vec<SkillDefinition>,
    /// Mana pool, if the ball casts skills that cost mana.
    pub mana: Option<Mana>,
    /// Seconds of invulnerability after spawning.
    pub spawn_protection: f32,
    /// Minimum seconds between two hits on this ball.
    pub damage_cooldown: f32,
}

impl Default for BallSpec {
    fn default() -> Self {
        Self {
            player: None,
            position: Vec2::ZERO,
            radius: 20.0,
            mass: 1.0,
            restitution: DEFAULT_RESTITUTION,
            max_hp: 100,
            body_damage: 0.0,
            velocity: Vec2::ZERO,
            desired_speed: None,
            items: Vec::new(),
            skills: Vec::new(),
            mana: None,
            spawn_protection: DEFAULT_SPAWN_PROTECTION,
            damage_cooldown: DEFAULT_DAMAGE_COOLDOWN,
        }
    }
}

impl BallSpec {
    fn validate(&self) -> Result<(), SpawnError> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(SpawnError::InvalidRadius(self.radius));
        }
        if self.max_hp <= 0 {
            return Err(SpawnError::InvalidHealth(self.max_hp));
        }
        if self.skills.len() > SKILL_SLOT_COUNT {
            return Err(SpawnError::TooManySkills {
                count: self.skills.len(),
            });
        }
        self.items.iter().try_for_each(ItemSpec::validate)
    }
}

/// A spawned combatant and its items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnedBall {
    /// Ball entity.
    pub ball: Entity,
    /// Item entities in loadout order.
    pub items: Vec<Entity>,
}

/// Spawns the arena rectangle.
///
/// # Errors
///
/// Returns [`SpawnError::InvalidArena`] for non-positive dimensions.
pub fn spawn_arena(world: &mut World, origin: Vec2, size: Vec2) -> Result<Entity, SpawnError> {
    if !size.is_finite() || size.x <= 0.0 || size.y <= 0.0 {
        return Err(SpawnError::InvalidArena {
            width: size.x,
            height: size.y,
        });
    }
    Ok(world.spawn(ArenaBounds { origin, size }).id())
}

/// Spawns a combatant with spawn protection, a damage cooldown, and its
/// items. Item `i` of `n` starts at `i * 360 / n` degrees.
///
/// # Errors
///
/// Returns a [`SpawnError`] when the ball fails validation.
pub fn spawn_ball(world: &mut World, spec: BallSpec) -> Result<SpawnedBall, SpawnError> {
    spec.validate()?;
    let BallSpec {
        player,
        position,
        radius,
        mass,
        restitution,
        max_hp,
        body_damage,
        velocity,
        desired_speed,
        items,
        skills,
        mana,
        spawn_protection,
        damage_cooldown,
    } = spec;

    let skill_count = skills.len();
    let slots = SkillSlots::from_definitions(skills).ok_or(SpawnError::TooManySkills {
        count: skill_count,
    })?;

    let mut entity = world.spawn((
        Spatial::new(position, radius),
        Kinetic::new(velocity),
        PhysicalProps::new(mass, restitution),
        Vitality::full(max_hp),
        BodyDamage {
            amount: body_damage.max(0.0),
        },
        Orientation::default(),
        SpawnProtection {
            remaining: spawn_protection,
        },
        DamageCooldown::new(damage_cooldown),
        slots,
    ));
    if let Some(player) = player {
        entity.insert(player);
    }
    if let Some(speed) = desired_speed {
        entity.insert(DesiredSpeed { speed });
    }
    if let Some(mana) = mana {
        entity.insert(mana);
    }
    let ball = entity.id();

    let total = items.len();
    let mut spawned = Vec::with_capacity(total);
    for (index, item) in items.into_iter().enumerate() {
        let angle = evenly_spaced_angle(index, total);
        spawned.push(spawn_orbital_item(world, ball, item, angle)?);
    }

    match player {
        Some(player) => info!("spawned {player} with {total} items"),
        None => info!("spawned {ball:?} with {total} items"),
    }
    Ok(SpawnedBall {
        ball,
        items: spawned,
    })
}

#[expect(clippy::cast_precision_loss, reason = "Item counts are tiny.")]
fn evenly_spaced_angle(index: usize, total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    index as f32 * (360.0 / total as f32)
}

/// Spawns an item orbiting `parent`, starting at `angle` degrees with a
/// matching orientation. Items carry no velocity of their own.
///
/// # Errors
///
/// Returns [`SpawnError::UnknownParent`] when `parent` has no [`Spatial`],
/// or a validation error for the spec.
pub fn spawn_orbital_item(
    world: &mut World,
    parent: Entity,
    spec: ItemSpec,
    angle: f32,
) -> Result<Entity, SpawnError> {
    spec.validate()?;
    let anchor = world
        .get::<Spatial>(parent)
        .map(|spatial| spatial.position)
        .ok_or(SpawnError::UnknownParent(parent))?;

    let link = OrbitalLink {
        parent,
        orbit_radius: spec.orbit_radius,
        angular_speed: spec.angular_speed,
        angle,
    };
    let position = anchor + heading(angle) * spec.orbit_radius;
    Ok(world
        .spawn((
            Spatial::new(position, spec.radius),
            PhysicalProps::new(spec.mass, spec.restitution),
            OrientedHitbox::centered(spec.hitbox_width, spec.hitbox_height),
            Orientation::new(angle),
            link,
            spec.item,
        ))
        .id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn sword() -> ItemSpec {
        ItemSpec::new(Item {
            name: "Sword".to_owned(),
            damage: 10.0,
            damage_reduction: 0.0,
            speed_boost: 0.0,
            knockback_strength: 0.0,
        })
    }

    #[rstest]
    fn items_are_evenly_distributed() {
        let mut world = World::new();
        let spec = BallSpec {
            position: Vec2::new(100.0, 100.0),
            items: vec![sword(), sword(), sword()],
            ..BallSpec::default()
        };
        let spawned = spawn_ball(&mut world, spec).expect("valid spec");
        let angles: Vec<f32> = spawned
            .items
            .iter()
            .map(|item| world.get::<OrbitalLink>(*item).expect("link").angle)
            .collect();
        assert_eq!(angles, vec![0.0, 120.0, 240.0]);
        let first = spawned.items.first().copied().expect("item spawned");
        let spatial = world.get::<Spatial>(first).expect("spatial");
        assert_relative_eq!(spatial.position.x, 140.0);
        assert!(world.get::<Kinetic>(first).is_none());
    }

    #[rstest]
    fn ball_spawns_protected() {
        let mut world = World::new();
        let spawned = spawn_ball(&mut world, BallSpec::default()).expect("valid spec");
        let protection = world
            .get::<SpawnProtection>(spawned.ball)
            .expect("protection");
        assert_relative_eq!(protection.remaining, DEFAULT_SPAWN_PROTECTION);
        let cooldown = world.get::<DamageCooldown>(spawned.ball).expect("cooldown");
        assert_eq!(cooldown.last_damage_time, None);
    }

    #[rstest]
    #[case(BallSpec { radius: 0.0, ..BallSpec::default() }, SpawnError::InvalidRadius(0.0))]
    #[case(BallSpec { max_hp: 0, ..BallSpec::default() }, SpawnError::InvalidHealth(0))]
    fn invalid_specs_spawn_nothing(#[case] spec: BallSpec, #[case] expected: SpawnError) {
        let mut world = World::new();
        assert_eq!(spawn_ball(&mut world, spec), Err(expected));
        assert_eq!(world.entities().len(), 0);
    }

    #[rstest]
    fn orphan_item_is_rejected() {
        let mut world = World::new();
        let ghost = world.spawn_empty().id();
        assert_eq!(
            spawn_orbital_item(&mut world, ghost, sword(), 0.0),
            Err(SpawnError::UnknownParent(ghost))
        );
    }
}
