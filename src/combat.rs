//! Damage arbitration for item–body contacts.
//!
//! Physics has already run for the pair by the time these rules are
//! consulted. Only an orbital item striking a body changes health; the body
//! may answer with its passive [`BodyDamage`] against the item's parent in the
//! same contact.
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use log::debug;

use crate::collision::{Collider, Role};
use crate::components::{
    BodyDamage, DamageCooldown, DamagePopup, Item, PlayerId, SpawnProtection, Vitality,
};
use crate::config::SimConfig;
use crate::geometry::{circle_rect, direction_or, heading};
use crate::numeric::{hp_to_f32, round_damage};
use crate::skills::{damage_boost_of, damage_reduction_of, ActiveEffects};

/// Combat state read and written during arbitration.
pub type CombatantRow<'w> = (
    Option<&'w mut Vitality>,
    Option<&'w mut DamageCooldown>,
    Has<SpawnProtection>,
    Option<&'w BodyDamage>,
    Option<&'w ActiveEffects>,
    Option<&'w PlayerId>,
);

/// Access to every entity's combat state plus the popup spawner.
#[derive(SystemParam)]
pub struct Combatants<'w, 's> {
    query: Query<'w, 's, CombatantRow<'static>>,
    commands: Commands<'w, 's>,
}

impl Combatants<'_, '_> {
    fn is_protected(&self, entity: Entity) -> bool {
        self.query.get(entity).is_ok_and(|row| row.2)
    }

    fn cooldown_ready(&self, entity: Entity, now: f32) -> bool {
        self.query
            .get(entity)
            .ok()
            .and_then(|row| row.1)
            .is_none_or(|cooldown| cooldown.is_ready(now))
    }

    fn has_vitality(&self, entity: Entity) -> bool {
        self.query.get(entity).is_ok_and(|row| row.0.is_some())
    }

    fn effects(&self, entity: Entity) -> Option<&ActiveEffects> {
        self.query.get(entity).ok().and_then(|row| row.4)
    }

    fn damage_boost(&self, entity: Entity) -> f32 {
        damage_boost_of(self.effects(entity))
    }

    fn damage_reduction(&self, entity: Entity) -> f32 {
        damage_reduction_of(self.effects(entity))
    }

    fn body_damage(&self, entity: Entity) -> f32 {
        self.query
            .get(entity)
            .ok()
            .and_then(|row| row.3)
            .map_or(0.0, |damage| damage.amount)
    }

    fn player(&self, entity: Entity) -> Option<PlayerId> {
        self.query.get(entity).ok().and_then(|row| row.5).copied()
    }

    fn name(&self, entity: Entity) -> String {
        self.player(entity)
            .map_or_else(|| format!("Entity {entity:?}"), |player| player.to_string())
    }

    /// Subtracts `amount` from the target's hit points, stamps its cooldown,
    /// and spawns a popup. Returns `false` when the target has no health.
    fn strike(&mut self, target: Entity, amount: i32, now: f32, config: &SimConfig) -> bool {
        let Ok((Some(mut vitality), cooldown, ..)) = self.query.get_mut(target) else {
            return false;
        };
        vitality.apply_damage(amount);
        if let Some(mut cooldown) = cooldown {
            cooldown.stamp(now);
        }
        self.commands.spawn(DamagePopup {
            amount,
            target,
            duration: config.popup_duration,
            time_left: config.popup_duration,
            color: config.popup_color,
        });
        true
    }
}

/// An item touching a body, as seen by the arbitration rules.
#[derive(Debug, Clone, Copy)]
pub struct ItemHit<'a> {
    /// The striking item.
    pub item: &'a Collider,
    /// The struck body.
    pub body: &'a Collider,
    /// Current position of the item's parent, if it still exists.
    pub parent_position: Option<Vec2>,
}

/// Frame-wide inputs to arbitration.
#[derive(Debug, Clone, Copy)]
pub struct Arbiter<'a> {
    /// Simulation time used for cooldowns.
    pub now: f32,
    /// Tunables.
    pub config: &'a SimConfig,
    /// Every collider of the frame, sorted by entity.
    pub colliders: &'a [Collider],
}

impl Arbiter<'_> {
    /// Applies item and retaliation damage for one contact.
    ///
    /// Self-hits, spawn protection on either side, and an unexpired cooldown
    /// on either side each veto the whole exchange.
    pub fn resolve(&self, hit: ItemHit<'_>, combatants: &mut Combatants<'_, '_>) {
        let Role::Item { parent, item: stats } = &hit.item.role else {
            return;
        };
        let parent = *parent;
        let body = hit.body.entity;
        if parent == body {
            return;
        }
        if combatants.is_protected(body) || combatants.is_protected(parent) {
            return;
        }
        if !combatants.cooldown_ready(body, self.now)
            || !combatants.cooldown_ready(parent, self.now)
        {
            return;
        }

        let source = format!("{}'s item '{}'", combatants.name(parent), stats.name);
        let base = round_damage(stats.damage * combatants.damage_boost(parent));
        if base > 0 && combatants.has_vitality(body) {
            let shield = self.shield_reduction(hit.item, body);
            let skill = combatants.damage_reduction(body);
            let dealt = round_damage(hp_to_f32(base) * (1.0 - shield) * (1.0 - skill));
            if combatants.strike(body, dealt, self.now, self.config) {
                log_damage(&source, &combatants.name(body), dealt, base);
            }
        }

        let raw = combatants.body_damage(body) * combatants.damage_boost(body);
        let block = hit
            .parent_position
            .map_or(0.0, |anchor| self.facing_reduction(hit, stats, anchor));
        let skill = combatants.damage_reduction(parent);
        let retaliation = round_damage(raw * (1.0 - block) * (1.0 - skill));
        if retaliation > 0 && combatants.strike(parent, retaliation, self.now, self.config) {
            let source = format!("{}'s body", combatants.name(body));
            log_damage(&source, &combatants.name(parent), retaliation, round_damage(raw));
        }
    }

    /// Largest reduction among the defender's own shields whose rectangle
    /// currently overlaps the attacking item's circle.
    fn shield_reduction(&self, attacker: &Collider, defender: Entity) -> f32 {
        self.colliders
            .iter()
            .filter_map(|shield| match &shield.role {
                Role::Item { parent, item } if *parent == defender => {
                    shield.hitbox.map(|hitbox| (shield, hitbox, item))
                }
                _ => None,
            })
            .filter(|(shield, hitbox, _)| {
                let rect = hitbox.world_rect(shield.position, shield.angle.unwrap_or(0.0));
                circle_rect(attacker.position, attacker.radius, &rect).is_some()
            })
            .map(|(_, _, item)| item.damage_reduction)
            .fold(0.0_f32, f32::max)
            .clamp(0.0, 1.0)
    }

    /// Reduction the struck item grants its parent when it faces the body,
    /// judged by its position around the parent or by its orientation.
    fn facing_reduction(&self, hit: ItemHit<'_>, stats: &Item, anchor: Vec2) -> f32 {
        let outward = hit.item.position - anchor;
        let towards_body = hit.body.position - anchor;
        if outward.length_squared() <= 0.0 || towards_body.length_squared() <= 0.0 {
            return 0.0;
        }
        let outward = direction_or(outward, Vec2::X);
        let towards_body = direction_or(towards_body, Vec2::X);
        let threshold = self.config.block_cosine();
        let radial = outward.dot(towards_body);
        let facing = hit
            .item
            .angle
            .map_or(radial, |angle| heading(angle).dot(towards_body));
        if radial >= threshold || facing >= threshold {
            stats.damage_reduction.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

fn log_damage(source: &str, target: &str, dealt: i32, unreduced: i32) {
    if dealt == unreduced || unreduced <= 0 {
        debug!("{source} dealt {dealt} damage to {target}");
    } else {
        let percent = (1.0 - hp_to_f32(dealt) / hp_to_f32(unreduced)) * 100.0;
        debug!("{source} dealt {dealt} damage to {target} (reduced from {unreduced} by {percent:.0}%)");
    }
}
