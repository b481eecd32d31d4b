//! Pairwise collision detection and response.
//!
//! Each frame the system snapshots every entity with a [`Spatial`] into a
//! [`Collider`] list sorted by entity, resolves every overlapping pair in that
//! order, and writes positions and velocities back at the end. Resolution of
//! an earlier pair is visible to later pairs within the same frame.
//!
//! Entities are classified once per frame: an entity with both an
//! [`OrbitalLink`] and an [`Item`] is an item, everything else is a body. Only
//! item–body contacts reach the damage rules in [`crate::combat`].
pub mod narrow_phase;
pub mod response;

use bevy::prelude::*;

use crate::combat::{Arbiter, Combatants, ItemHit};
use crate::components::{
    DesiredSpeed, Item, Kinetic, OrbitalLink, Orientation, OrientedHitbox, PhysicalProps, Spatial,
};
use crate::config::SimConfig;
use crate::geometry::Contact;
use crate::plugin::SimClock;
use narrow_phase::Shape;

/// Collision role of an entity for the current frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Role {
    /// A combatant or any other non-item entity.
    Body,
    /// An orbital item and the stats it strikes with.
    Item {
        /// Entity the item orbits.
        parent: Entity,
        /// Item payload.
        item: Item,
    },
}

/// Frame snapshot of one colliding entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    /// Source entity.
    pub entity: Entity,
    /// Position, updated as pairs resolve.
    pub position: Vec2,
    /// Circle radius.
    pub radius: f32,
    /// Velocity, `None` for entities without [`Kinetic`].
    pub velocity: Option<Vec2>,
    /// Mass and restitution.
    pub props: PhysicalProps,
    /// Rectangle collider, if any.
    pub hitbox: Option<OrientedHitbox>,
    /// Orientation angle, if any.
    pub angle: Option<f32>,
    /// Speed restored after item contacts.
    pub desired_speed: Option<f32>,
    /// Item or body.
    pub role: Role,
}

impl Collider {
    /// Shape used by the narrow phase.
    #[must_use]
    pub fn shape(&self) -> Shape {
        match self.hitbox {
            Some(hitbox) => {
                Shape::Rect(hitbox.world_rect(self.position, self.angle.unwrap_or(0.0)))
            }
            None => Shape::Circle {
                center: self.position,
                radius: self.radius,
            },
        }
    }

    /// Returns `true` for orbital items.
    #[must_use]
    pub const fn is_item(&self) -> bool {
        matches!(self.role, Role::Item { .. })
    }

    /// Parent of an item.
    #[must_use]
    pub const fn parent(&self) -> Option<Entity> {
        match &self.role {
            Role::Item { parent, .. } => Some(*parent),
            Role::Body => None,
        }
    }

    fn knockback_strength(&self) -> f32 {
        match &self.role {
            Role::Item { item, .. } => item.knockback_strength,
            Role::Body => 0.0,
        }
    }
}

type ColliderRow<'w> = (
    Entity,
    &'w mut Spatial,
    Option<&'w mut Kinetic>,
    Option<&'w PhysicalProps>,
    Option<&'w OrientedHitbox>,
    Option<&'w Orientation>,
    Option<&'w OrbitalLink>,
    Option<&'w Item>,
    Option<&'w DesiredSpeed>,
);

/// Mutable references to two distinct elements, `i < j`.
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> Option<(&mut T, &mut T)> {
    if i >= j || j >= items.len() {
        return None;
    }
    let (head, tail) = items.split_at_mut(j);
    Some((head.get_mut(i)?, tail.first_mut()?))
}

/// Items orbiting the same parent never interact.
fn shares_parent(first: &Collider, second: &Collider) -> bool {
    matches!((first.parent(), second.parent()), (Some(a), Some(b)) if a == b)
}

/// Separation, elastic impulse, then knockback and speed restoration for
/// pairs involving an item.
fn resolve_physics(first: &mut Collider, second: &mut Collider, contact: &Contact) {
    response::separate(first, second, contact);
    response::exchange_impulse(first, second, contact);
    if first.is_item() || second.is_item() {
        let strength = first.knockback_strength() + second.knockback_strength();
        response::knockback(first, second, contact, strength);
        response::restore_speed(first);
        response::restore_speed(second);
    }
}

/// Resolves the physics of pair `(i, j)` and returns `(item, body)` indices
/// when the contact should go through damage arbitration.
fn resolve_pair(colliders: &mut [Collider], i: usize, j: usize) -> Option<(usize, usize)> {
    let (first, second) = pair_mut(colliders, i, j)?;
    if shares_parent(first, second) {
        return None;
    }
    let contact = narrow_phase::contact(&first.shape(), &second.shape())?;
    resolve_physics(first, second, &contact);
    match (first.is_item(), second.is_item()) {
        (true, false) => Some((i, j)),
        (false, true) => Some((j, i)),
        _ => None,
    }
}

/// Latest position of an item's parent: the frame snapshot when the parent
/// collides, its stored position otherwise.
fn parent_position(
    colliders: &[Collider],
    bodies: &Query<ColliderRow<'_>>,
    item: &Collider,
) -> Option<Vec2> {
    let parent = item.parent()?;
    colliders
        .binary_search_by_key(&parent, |c| c.entity)
        .ok()
        .and_then(|index| colliders.get(index))
        .map(|c| c.position)
        .or_else(|| bodies.get(parent).ok().map(|row| row.1.position))
}

/// Detects and resolves every overlapping pair, then arbitrates damage for
/// item–body contacts.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn collision_system(
    clock: Res<SimClock>,
    config: Res<SimConfig>,
    mut bodies: Query<ColliderRow<'_>>,
    mut combatants: Combatants,
) {
    let mut colliders: Vec<Collider> = bodies
        .iter()
        .filter_map(
            |(entity, spatial, kinetic, props, hitbox, orientation, link, item, desired)| {
                let role = match (link, item) {
                    (Some(link), Some(item)) => Role::Item {
                        parent: link.parent,
                        item: item.clone(),
                    },
                    _ => Role::Body,
                };
                Some(Collider {
                    entity,
                    position: spatial.position,
                    radius: spatial.radius,
                    velocity: kinetic.map(|k| k.velocity),
                    props: *props?,
                    hitbox: hitbox.copied(),
                    angle: orientation.map(|o| o.angle),
                    desired_speed: desired.map(|d| d.speed),
                    role,
                })
            },
        )
        .collect();
    colliders.sort_by_key(|collider| collider.entity);

    let now = clock.now();
    let count = colliders.len();
    for i in 0..count {
        for j in (i + 1)..count {
            let Some((item_index, body_index)) = resolve_pair(&mut colliders, i, j) else {
                continue;
            };
            let (Some(item), Some(body)) = (colliders.get(item_index), colliders.get(body_index))
            else {
                continue;
            };
            let arbiter = Arbiter {
                now,
                config: &*config,
                colliders: &colliders,
            };
            let hit = ItemHit {
                item,
                body,
                parent_position: parent_position(&colliders, &bodies, item),
            };
            arbiter.resolve(hit, &mut combatants);
        }
    }

    for collider in &colliders {
        let Ok((_, mut spatial, kinetic, ..)) = bodies.get_mut(collider.entity) else {
            continue;
        };
        if spatial.position != collider.position {
            spatial.position = collider.position;
        }
        if let (Some(mut kinetic), Some(velocity)) = (kinetic, collider.velocity) {
            if kinetic.velocity != velocity {
                kinetic.velocity = velocity;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1, true)]
    #[case(1, 1, false)]
    #[case(2, 1, false)]
    #[case(0, 3, false)]
    fn pair_mut_requires_ordered_indices(#[case] i: usize, #[case] j: usize, #[case] ok: bool) {
        let mut values = [1, 2, 3];
        assert_eq!(pair_mut(&mut values, i, j).is_some(), ok);
    }

    #[rstest]
    fn pair_mut_returns_both_elements() {
        let mut values = [1, 2, 3];
        if let Some((a, b)) = pair_mut(&mut values, 0, 2) {
            std::mem::swap(a, b);
        }
        assert_eq!(values, [3, 2, 1]);
    }
}
