//! Per-frame countdowns: spawn protection, mana regeneration, and skill
//! effect ageing.
use bevy::prelude::*;
use log::debug;

use crate::components::{Mana, SpawnProtection, Vitality};
use crate::numeric::truncate_heal;
use crate::plugin::SimClock;
use crate::skills::ActiveEffects;

/// Counts spawn protection down and removes it once it lapses.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn spawn_protection_system(
    mut commands: Commands,
    clock: Res<SimClock>,
    mut query: Query<(Entity, &mut SpawnProtection)>,
) {
    for (entity, mut protection) in &mut query {
        protection.remaining -= clock.delta;
        if protection.remaining <= 0.0 {
            commands.entity(entity).remove::<SpawnProtection>();
        }
    }
}

/// Regenerates mana linearly, capped at the pool maximum.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn mana_regen_system(clock: Res<SimClock>, mut query: Query<&mut Mana>) {
    for mut mana in &mut query {
        mana.current = (mana.current + mana.regen_rate * clock.delta).min(mana.max);
    }
}

/// Ages active effects and releases heals as they expire.
///
/// Boosts and reductions are read by the collision pass; this system only
/// drops them once their time is up. A heal lands exactly once, on the frame
/// its remaining time reaches zero.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn skill_effect_system(
    mut commands: Commands,
    clock: Res<SimClock>,
    mut query: Query<(Entity, &mut ActiveEffects, Option<&mut Vitality>)>,
) {
    for (entity, mut effects, vitality) in &mut query {
        let healed = effects.age(clock.delta);
        if healed > 0.0 {
            if let Some(mut vitality) = vitality {
                let amount = truncate_heal(healed);
                vitality.heal(amount);
                debug!("{entity:?} healed for {amount}");
            }
        }
        if effects.is_empty() {
            commands.entity(entity).remove::<ActiveEffects>();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::{ActiveSkillEffect, EffectKind};
    use bevy::ecs::system::RunSystemOnce;
    use rstest::rstest;

    fn world_with_step(delta: f32) -> World {
        let mut world = World::new();
        world.insert_resource(SimClock {
            delta,
            elapsed: delta,
        });
        world
    }

    fn run<M>(world: &mut World, system: impl IntoSystem<(), (), M>) {
        world.run_system_once(system).expect("system runs");
    }

    #[rstest]
    fn protection_expires() {
        let mut world = world_with_step(0.3);
        let entity = world.spawn(SpawnProtection { remaining: 0.4 }).id();
        run(&mut world, spawn_protection_system);
        assert!(world.get::<SpawnProtection>(entity).is_some());
        run(&mut world, spawn_protection_system);
        assert!(world.get::<SpawnProtection>(entity).is_none());
    }

    #[rstest]
    #[case(10.0, 15.0)]
    #[case(95.0, 100.0)]
    fn mana_regenerates_to_cap(#[case] start: f32, #[case] expected: f32) {
        let mut world = world_with_step(0.5);
        let entity = world
            .spawn(Mana {
                max: 100.0,
                current: start,
                regen_rate: 10.0,
            })
            .id();
        run(&mut world, mana_regen_system);
        assert_eq!(world.get::<Mana>(entity).expect("mana").current, expected);
    }

    #[rstest]
    fn heal_applies_once_on_expiry() {
        let mut world = world_with_step(0.5);
        let entity = world
            .spawn((
                Vitality {
                    max_hp: 100,
                    current_hp: 50,
                },
                ActiveEffects(vec![ActiveSkillEffect {
                    kind: EffectKind::Heal,
                    value: 20.7,
                    remaining: 0.75,
                }]),
            ))
            .id();

        run(&mut world, skill_effect_system);
        assert_eq!(world.get::<Vitality>(entity).expect("hp").current_hp, 50);
        run(&mut world, skill_effect_system);
        assert_eq!(world.get::<Vitality>(entity).expect("hp").current_hp, 70);
        assert!(world.get::<ActiveEffects>(entity).is_none());
        run(&mut world, skill_effect_system);
        assert_eq!(world.get::<Vitality>(entity).expect("hp").current_hp, 70);
    }

    #[rstest]
    fn zero_step_is_idempotent() {
        let mut world = world_with_step(0.0);
        let effect = ActiveSkillEffect {
            kind: EffectKind::DamageReduction,
            value: 0.3,
            remaining: 1.0,
        };
        let entity = world.spawn(ActiveEffects(vec![effect.clone()])).id();
        for _ in 0..5 {
            run(&mut world, skill_effect_system);
        }
        let effects = world.get::<ActiveEffects>(entity).expect("effect kept");
        assert_eq!(effects.0, vec![effect]);
    }
}
