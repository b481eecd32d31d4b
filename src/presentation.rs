//! Presentation layer: popup lifetimes and read-only views for renderers.
//!
//! `PresentationPlugin` stays a passive observer of simulation state. Its only
//! system ages [`DamagePopup`]s in `PostUpdate`, after the simulation chain
//! has spawned the frame's popups. The snapshot functions give a renderer
//! everything it needs to draw health and mana bars, effect icons, skill
//! cooldowns, and floating damage numbers without touching simulation
//! components directly.
use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::components::{DamagePopup, Mana, OrbitalLink, PlayerId, Spatial, Vitality};
use crate::numeric::hp_to_f32;
use crate::plugin::SimClock;
use crate::skills::{ActiveEffects, EffectKind, SkillSlots};

/// Render-layer toggles. The simulation never reads this resource.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresentationOptions {
    /// Draw hitbox outlines and shield facing vectors.
    pub show_hitboxes: bool,
}

/// Plugin owning popup decay and the presentation options.
///
/// Add it alongside [`ArenaPlugin`](crate::ArenaPlugin); it reads the same
/// [`SimClock`].
#[derive(Debug, Default)]
pub struct PresentationPlugin;

impl Plugin for PresentationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimClock>();
        app.init_resource::<PresentationOptions>();
        app.add_systems(PostUpdate, popup_decay_system);
    }
}

/// Counts popups down and removes them when they expire or their target is
/// gone.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn popup_decay_system(
    mut commands: Commands,
    clock: Res<SimClock>,
    mut popups: Query<(Entity, &mut DamagePopup)>,
    entities: Query<Entity>,
) {
    for (entity, mut popup) in &mut popups {
        popup.time_left -= clock.delta;
        if popup.time_left <= 0.0 || !entities.contains(popup.target) {
            commands.entity(entity).try_despawn();
        }
    }
}

/// Health of one combatant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthBar {
    /// Combatant.
    pub entity: Entity,
    /// Controlling player, if any.
    pub player: Option<PlayerId>,
    /// Centre of the combatant.
    pub position: Vec2,
    /// Current hit points.
    pub current: i32,
    /// Maximum hit points.
    pub max: i32,
    /// `current / max` in `[0, 1]`.
    pub fraction: f32,
}

/// Mana of one caster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManaBar {
    /// Caster.
    pub entity: Entity,
    /// Current mana.
    pub current: f32,
    /// Pool size.
    pub max: f32,
    /// `current / max` in `[0, 1]`.
    pub fraction: f32,
}

/// A running effect to show next to its owner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectIcon {
    /// Effect owner.
    pub entity: Entity,
    /// Effect behaviour.
    pub kind: EffectKind,
    /// Seconds left.
    pub remaining: f32,
}

/// Cooldown state of one bound skill.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillCooldown {
    /// Caster.
    pub entity: Entity,
    /// Slot index.
    pub slot: usize,
    /// Skill name.
    pub name: String,
    /// Seconds until the skill is ready, `None` when ready now.
    pub remaining: Option<f32>,
}

/// A floating damage number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupView {
    /// Damage dealt.
    pub amount: i32,
    /// Damaged entity.
    pub target: Entity,
    /// Target position, `None` when the target has no position.
    pub anchor: Option<Vec2>,
    /// Position among the target's popups, newest last.
    pub stack_index: usize,
    /// Elapsed share of the lifetime in `[0, 1]`; renderers fade and lift
    /// the text with it.
    pub progress: f32,
    /// RGB colour.
    pub color: [u8; 3],
}

fn fraction(current: f32, max: f32) -> f32 {
    if max > 0.0 {
        (current / max).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Health bars of every combatant, ordered by entity. Orbital items are not
/// included.
pub fn health_bars(world: &mut World) -> Vec<HealthBar> {
    let mut query = world.query_filtered::<(
        Entity,
        &Vitality,
        &Spatial,
        Option<&PlayerId>,
    ), Without<OrbitalLink>>();
    let mut bars: Vec<HealthBar> = query
        .iter(world)
        .map(|(entity, vitality, spatial, player)| HealthBar {
            entity,
            player: player.copied(),
            position: spatial.position,
            current: vitality.current_hp,
            max: vitality.max_hp,
            fraction: fraction(hp_to_f32(vitality.current_hp), hp_to_f32(vitality.max_hp)),
        })
        .collect();
    bars.sort_by_key(|bar| bar.entity);
    bars
}

/// Mana bars of every caster, ordered by entity.
pub fn mana_bars(world: &mut World) -> Vec<ManaBar> {
    let mut query = world.query::<(Entity, &Mana)>();
    let mut bars: Vec<ManaBar> = query
        .iter(world)
        .map(|(entity, mana)| ManaBar {
            entity,
            current: mana.current,
            max: mana.max,
            fraction: fraction(mana.current, mana.max),
        })
        .collect();
    bars.sort_by_key(|bar| bar.entity);
    bars
}

/// Unexpired effects, grouped by entity in cast order.
pub fn active_effect_icons(world: &mut World) -> Vec<EffectIcon> {
    let mut query = world.query::<(Entity, &ActiveEffects)>();
    let mut icons: Vec<EffectIcon> = query
        .iter(world)
        .flat_map(|(entity, effects)| {
            effects
                .0
                .iter()
                .filter(|effect| effect.remaining > 0.0)
                .map(move |effect| EffectIcon {
                    entity,
                    kind: effect.kind,
                    remaining: effect.remaining,
                })
        })
        .collect();
    icons.sort_by_key(|icon| icon.entity);
    icons
}

/// Cooldowns of every bound skill at the current simulation time.
pub fn skill_cooldowns(world: &mut World) -> Vec<SkillCooldown> {
    let now = world
        .get_resource::<SimClock>()
        .map_or(0.0, SimClock::now);
    let mut query = world.query::<(Entity, &SkillSlots)>();
    let mut cooldowns: Vec<SkillCooldown> = query
        .iter(world)
        .flat_map(|(entity, slots)| {
            slots.iter().map(move |(slot, bound)| SkillCooldown {
                entity,
                slot,
                name: bound.definition.name.clone(),
                remaining: bound.cooldown_remaining(now),
            })
        })
        .collect();
    cooldowns.sort_by_key(|cooldown| (cooldown.entity, cooldown.slot));
    cooldowns
}

/// Live damage popups, stacked per target with the oldest first.
pub fn damage_popups(world: &mut World) -> Vec<PopupView> {
    let mut popups = world.query::<(Entity, &DamagePopup)>();
    let mut by_target: BTreeMap<Entity, Vec<(Entity, DamagePopup)>> = BTreeMap::new();
    for (entity, popup) in popups.iter(world) {
        by_target
            .entry(popup.target)
            .or_default()
            .push((entity, *popup));
    }

    let mut views = Vec::new();
    for (target, mut group) in by_target {
        group.sort_by_key(|(entity, _)| *entity);
        let anchor = world.get::<Spatial>(target).map(|spatial| spatial.position);
        views.extend(group.into_iter().enumerate().map(|(stack_index, (_, popup))| {
            PopupView {
                amount: popup.amount,
                target,
                anchor,
                stack_index,
                progress: 1.0 - fraction(popup.time_left, popup.duration),
                color: popup.color,
            }
        }));
    }
    views
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bevy::ecs::system::RunSystemOnce;
    use rstest::rstest;

    fn popup(target: Entity, time_left: f32) -> DamagePopup {
        DamagePopup {
            amount: 12,
            target,
            duration: 0.9,
            time_left,
            color: [255, 220, 60],
        }
    }

    fn world_with_step(delta: f32) -> World {
        let mut world = World::new();
        world.insert_resource(SimClock {
            delta,
            elapsed: delta,
        });
        world
    }

    #[rstest]
    fn popups_expire_after_their_duration() {
        let mut world = world_with_step(0.5);
        let target = world.spawn(Vitality::full(10)).id();
        let fresh = world.spawn(popup(target, 0.9)).id();
        let stale = world.spawn(popup(target, 0.4)).id();

        world.run_system_once(popup_decay_system).expect("system runs");

        let left = world.get::<DamagePopup>(fresh).expect("fresh popup").time_left;
        assert_relative_eq!(left, 0.4, epsilon = 1e-6);
        assert!(world.get_entity(stale).is_err());
    }

    #[rstest]
    fn popups_follow_their_target_out() {
        let mut world = world_with_step(0.0);
        let target = world.spawn(Vitality::full(10)).id();
        let orphan = world.spawn(popup(target, 0.9)).id();
        world.despawn(target);

        world.run_system_once(popup_decay_system).expect("system runs");
        assert!(world.get_entity(orphan).is_err());
    }

    #[rstest]
    fn health_bars_skip_items_and_report_fraction() {
        let mut world = World::new();
        let ball = world
            .spawn((
                Spatial::new(Vec2::new(5.0, 6.0), 20.0),
                Vitality {
                    max_hp: 200,
                    current_hp: 50,
                },
                PlayerId(1),
            ))
            .id();
        world.spawn((
            Spatial::new(Vec2::ZERO, 6.0),
            Vitality::full(1),
            OrbitalLink {
                parent: ball,
                orbit_radius: 10.0,
                angular_speed: 90.0,
                angle: 0.0,
            },
        ));

        let bars = health_bars(&mut world);
        assert_eq!(bars.len(), 1);
        let bar = bars.first().expect("one bar");
        assert_eq!(bar.player, Some(PlayerId(1)));
        assert_relative_eq!(bar.fraction, 0.25);
    }

    #[rstest]
    fn mana_bar_of_empty_pool_is_zero() {
        let mut world = World::new();
        world.spawn(Mana {
            max: 0.0,
            current: 0.0,
            regen_rate: 1.0,
        });
        let bars = mana_bars(&mut world);
        assert_relative_eq!(bars.first().expect("bar").fraction, 0.0);
    }

    #[rstest]
    fn popups_stack_per_target() {
        let mut world = World::new();
        let a = world.spawn(Spatial::new(Vec2::new(1.0, 2.0), 5.0)).id();
        let b = world.spawn(Spatial::new(Vec2::ZERO, 5.0)).id();
        world.spawn(popup(a, 0.9));
        world.spawn(popup(a, 0.45));
        world.spawn(popup(b, 0.9));

        let views = damage_popups(&mut world);
        let stacks: Vec<(Entity, usize)> =
            views.iter().map(|v| (v.target, v.stack_index)).collect();
        assert_eq!(stacks, vec![(a, 0), (a, 1), (b, 0)]);
        let second = views.get(1).expect("second popup");
        assert_relative_eq!(second.progress, 0.5);
        assert_eq!(second.anchor, Some(Vec2::new(1.0, 2.0)));
    }
}
