//! Orbital item kinematics and idle rotation.
use bevy::prelude::*;
use log::debug;

use crate::components::{OrbitalLink, Orientation, PlayerId, Spatial, Vitality};
use crate::config::SimConfig;
use crate::geometry::{angle_of, heading, normalize_degrees};
use crate::plugin::SimClock;

type AnchorRow<'w> = (Entity, &'w Spatial, Option<&'w PlayerId>, Has<Vitality>);
type Anchors<'w, 's> = Query<'w, 's, AnchorRow<'static>, Without<OrbitalLink>>;

type OrbiterRow<'w> = (
    Entity,
    &'w mut OrbitalLink,
    &'w mut Spatial,
    Option<&'w mut Orientation>,
);

/// Rotates every non-orbital orientation at the configured idle rate.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn spin_system(
    clock: Res<SimClock>,
    config: Res<SimConfig>,
    mut query: Query<&mut Orientation, Without<OrbitalLink>>,
) {
    let step = config.spin_rate_deg * clock.delta;
    if step == 0.0 {
        return;
    }
    for mut orientation in &mut query {
        let angle = orientation.angle + step;
        orientation.set(angle);
    }
}

/// Position of the closest anchor other than `parent` accepted by `accept`.
fn nearest(
    anchors: &Anchors<'_, '_>,
    parent: Entity,
    origin: Vec2,
    accept: impl Fn(Option<PlayerId>, bool) -> bool,
) -> Option<Vec2> {
    anchors
        .iter()
        .filter(|(entity, _, player, alive)| {
            *entity != parent && accept(player.copied(), *alive)
        })
        .map(|(_, spatial, ..)| spatial.position)
        .min_by(|a, b| a.distance_squared(origin).total_cmp(&b.distance_squared(origin)))
}

/// Picks what an item orbiting `parent` should face: the nearest entity of
/// another player, else the nearest entity with health.
fn facing_target(
    anchors: &Anchors<'_, '_>,
    parent: Entity,
    origin: Vec2,
    owner: Option<PlayerId>,
) -> Option<Vec2> {
    owner
        .and_then(|owner| {
            nearest(anchors, parent, origin, |player, _| player.is_some_and(|p| p != owner))
        })
        .or_else(|| nearest(anchors, parent, origin, |_, alive| alive))
}

/// Moves every orbital item around its parent and turns it towards the
/// nearest opponent.
///
/// Items whose parent no longer exists, or whose parent is itself an
/// orbital item, are despawned.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn orbital_system(
    mut commands: Commands,
    clock: Res<SimClock>,
    anchors: Anchors,
    mut orbiters: Query<OrbiterRow<'_>>,
) {
    for (entity, mut link, mut spatial, orientation) in &mut orbiters {
        let Ok((_, parent_spatial, owner, _)) = anchors.get(link.parent) else {
            debug!("{entity:?} lost its parent {:?}; despawning", link.parent);
            commands.entity(entity).try_despawn();
            continue;
        };
        let origin = parent_spatial.position;

        link.angle = normalize_degrees(link.angle + link.angular_speed * clock.delta);
        spatial.position = origin + heading(link.angle) * link.orbit_radius;

        let Some(mut orientation) = orientation else {
            continue;
        };
        match facing_target(&anchors, link.parent, origin, owner.copied()) {
            Some(target) => orientation.set(angle_of(target - origin)),
            None => orientation.set(link.angle),
        }
    }
}
