//! Removes dead combatants together with the items orbiting them.
use bevy::prelude::*;
use log::info;

use crate::components::{OrbitalLink, PlayerId, Vitality};

/// Despawns every entity whose hit points ran out, cascading to every entity
/// linked to it through an [`OrbitalLink`].
///
/// The dead are collected before anything is despawned.
pub fn mortality_system(
    mut commands: Commands,
    living: Query<(Entity, &Vitality, Option<&PlayerId>)>,
    orbitals: Query<(Entity, &OrbitalLink)>,
) {
    let dead: Vec<(Entity, Option<PlayerId>)> = living
        .iter()
        .filter(|(_, vitality, _)| vitality.is_dead())
        .map(|(entity, _, player)| (entity, player.copied()))
        .collect();

    for (entity, player) in dead {
        for (orbital, link) in &orbitals {
            if link.parent == entity {
                commands.entity(orbital).try_despawn();
            }
        }
        commands.entity(entity).try_despawn();
        match player {
            Some(player) => info!("{player} has been destroyed"),
            None => info!("{entity:?} has been destroyed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use rstest::rstest;

    fn link(parent: Entity) -> OrbitalLink {
        OrbitalLink {
            parent,
            orbit_radius: 40.0,
            angular_speed: 90.0,
            angle: 0.0,
        }
    }

    #[rstest]
    fn dead_parent_takes_items_along() {
        let mut world = World::new();
        let dead = world
            .spawn(Vitality {
                max_hp: 10,
                current_hp: 0,
            })
            .id();
        let alive = world.spawn(Vitality::full(10)).id();
        let dead_item = world.spawn(link(dead)).id();
        let live_item = world.spawn(link(alive)).id();

        world.run_system_once(mortality_system).expect("system runs");

        assert!(world.get_entity(dead).is_err());
        assert!(world.get_entity(dead_item).is_err());
        assert!(world.get_entity(alive).is_ok());
        assert!(world.get_entity(live_item).is_ok());
    }

    #[rstest]
    fn negative_health_counts_as_dead() {
        let mut world = World::new();
        let entity = world
            .spawn((
                Vitality {
                    max_hp: 10,
                    current_hp: -7,
                },
                PlayerId(2),
            ))
            .id();
        world.run_system_once(mortality_system).expect("system runs");
        assert!(world.get_entity(entity).is_err());
    }
}
