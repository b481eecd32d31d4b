//! Skill loadouts, active effects, and skill casting.
//!
//! A caster carries up to four [`SkillSlot`]s. Casting debits mana, stamps the
//! slot's cooldown, and attaches an [`ActiveSkillEffect`] that the timer and
//! collision systems consult until it expires.
use std::collections::BTreeMap;

use bevy::prelude::*;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::Mana;
use crate::constants::SKILL_SLOT_COUNT;

/// What an active effect does while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Scales incoming damage by `1 - value` while active.
    DamageReduction,
    /// Scales outgoing damage by `value` while active.
    DamageBoost,
    /// Restores `value` hit points once, when the effect expires.
    Heal,
    /// Declarative size buff; only aged by the simulation.
    RadiusBoost,
}

/// Static description of a castable skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    /// Display name.
    pub name: String,
    /// Mana spent per cast.
    pub cost: f32,
    /// Seconds between casts.
    pub cooldown: f32,
    /// Effect attached on cast.
    pub effect: EffectKind,
    /// Magnitude of the effect.
    pub effect_value: f32,
    /// Seconds the effect stays active.
    pub effect_duration: f32,
    /// Free-form data for presentation layers.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// A skill bound to a slot together with its last cast time.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillSlot {
    /// Bound skill.
    pub definition: SkillDefinition,
    /// Simulation time of the last cast, `None` if never cast.
    pub last_cast_time: Option<f32>,
}

impl SkillSlot {
    /// Seconds until the skill can be cast again, or `None` when ready.
    #[must_use]
    pub fn cooldown_remaining(&self, now: f32) -> Option<f32> {
        self.last_cast_time
            .map(|last| self.definition.cooldown - (now - last))
            .filter(|remaining| *remaining > 0.0)
    }
}

/// Fixed set of skill slots attached to a caster.
#[derive(Component, Debug, Clone, PartialEq, Default)]
pub struct SkillSlots {
    slots: [Option<SkillSlot>; SKILL_SLOT_COUNT],
}

impl SkillSlots {
    /// Fills slots in order. Returns `None` when more skills are supplied
    /// than there are slots.
    ///
    /// # Examples
    ///
    /// ```
    /// use arena_duel::skills::SkillSlots;
    /// let slots = SkillSlots::from_definitions(Vec::new()).expect("empty loadout fits");
    /// assert!(slots.get(0).is_none());
    /// ```
    #[must_use]
    pub fn from_definitions(definitions: Vec<SkillDefinition>) -> Option<Self> {
        if definitions.len() > SKILL_SLOT_COUNT {
            return None;
        }
        let mut slots = Self::default();
        for (target, definition) in slots.slots.iter_mut().zip(definitions) {
            *target = Some(SkillSlot {
                definition,
                last_cast_time: None,
            });
        }
        Some(slots)
    }

    /// Skill in `slot`, if any.
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&SkillSlot> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, slot: usize) -> Option<&mut SkillSlot> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    /// Iterates over bound skills with their slot indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &SkillSlot)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|s| (index, s)))
    }
}

/// A running buff or debuff.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSkillEffect {
    /// Effect behaviour.
    pub kind: EffectKind,
    /// Magnitude.
    pub value: f32,
    /// Seconds until expiry.
    pub remaining: f32,
}

impl From<&SkillDefinition> for ActiveSkillEffect {
    fn from(definition: &SkillDefinition) -> Self {
        Self {
            kind: definition.effect,
            value: definition.effect_value,
            remaining: definition.effect_duration,
        }
    }
}

/// Every effect currently running on an entity, oldest first.
///
/// Effects of the same kind are kept side by side and aged independently;
/// readers use the most recent unexpired one.
#[derive(Component, Debug, Clone, PartialEq, Default)]
pub struct ActiveEffects(pub Vec<ActiveSkillEffect>);

impl ActiveEffects {
    /// Appends a new effect.
    pub fn push(&mut self, effect: ActiveSkillEffect) {
        self.0.push(effect);
    }

    /// Most recently added unexpired effect of `kind`.
    #[must_use]
    pub fn latest(&self, kind: EffectKind) -> Option<&ActiveSkillEffect> {
        self.0
            .iter()
            .rev()
            .find(|effect| effect.kind == kind && effect.remaining > 0.0)
    }

    /// Outgoing damage multiplier, `1.0` without an active boost.
    #[must_use]
    pub fn damage_boost(&self) -> f32 {
        self.latest(EffectKind::DamageBoost)
            .map_or(1.0, |effect| effect.value.max(0.0))
    }

    /// Fraction of incoming damage absorbed, `0.0` without an active
    /// reduction.
    #[must_use]
    pub fn damage_reduction(&self) -> f32 {
        self.latest(EffectKind::DamageReduction)
            .map_or(0.0, |effect| effect.value.clamp(0.0, 1.0))
    }

    /// Ages every effect by `dt`, drops the expired ones, and returns the
    /// heal value released by expiring heal effects.
    ///
    /// A step that does not advance time leaves every effect untouched, so
    /// even a heal already at zero waits for the next real step.
    pub fn age(&mut self, dt: f32) -> f32 {
        if dt.is_nan() || dt <= 0.0 {
            return 0.0;
        }
        let mut healed = 0.0;
        self.0.retain_mut(|effect| {
            effect.remaining -= dt;
            if effect.remaining > 0.0 {
                return true;
            }
            if effect.kind == EffectKind::Heal {
                healed += effect.value;
            }
            false
        });
        healed
    }

    /// Returns `true` when no effect is running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outgoing damage multiplier for an optional effect set.
#[must_use]
pub fn damage_boost_of(effects: Option<&ActiveEffects>) -> f32 {
    effects.map_or(1.0, ActiveEffects::damage_boost)
}

/// Incoming damage reduction for an optional effect set.
#[must_use]
pub fn damage_reduction_of(effects: Option<&ActiveEffects>) -> f32 {
    effects.map_or(0.0, ActiveEffects::damage_reduction)
}

/// Reasons a cast is refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CastError {
    /// The caster entity does not exist.
    #[error("caster {0:?} does not exist")]
    UnknownCaster(Entity),
    /// The caster has no skill loadout.
    #[error("caster {0:?} has no skill slots")]
    NoSkillSlots(Entity),
    /// The slot index is past the last slot.
    #[error("slot {slot} is out of range")]
    SlotOutOfRange {
        /// Requested slot.
        slot: usize,
    },
    /// Nothing is bound to the slot.
    #[error("slot {slot} is empty")]
    EmptySlot {
        /// Requested slot.
        slot: usize,
    },
    /// The skill costs mana but the caster has no pool.
    #[error("caster {0:?} has no mana pool")]
    NoMana(Entity),
    /// Not enough mana for the skill.
    #[error("not enough mana: need {required}, have {available}")]
    InsufficientMana {
        /// Cost of the skill.
        required: f32,
        /// Mana on hand.
        available: f32,
    },
    /// The skill was cast too recently.
    #[error("skill is on cooldown for another {remaining:.2}s")]
    OnCooldown {
        /// Seconds left.
        remaining: f32,
    },
}

/// Casts the skill in `slot` for `caster` at simulation time `now`.
///
/// On success mana is debited, the slot's cast time is stamped, and the new
/// effect is attached to the caster and returned.
///
/// # Errors
///
/// Returns a [`CastError`] describing the first failed check; the world is
/// left untouched in that case.
pub fn cast_skill(
    world: &mut World,
    caster: Entity,
    slot: usize,
    now: f32,
) -> Result<ActiveSkillEffect, CastError> {
    let mut entity = world
        .get_entity_mut(caster)
        .map_err(|_| CastError::UnknownCaster(caster))?;

    let definition = {
        let slots = entity
            .get::<SkillSlots>()
            .ok_or(CastError::NoSkillSlots(caster))?;
        if slot >= SKILL_SLOT_COUNT {
            return Err(CastError::SlotOutOfRange { slot });
        }
        let bound = slots.get(slot).ok_or(CastError::EmptySlot { slot })?;
        if let Some(remaining) = bound.cooldown_remaining(now) {
            return Err(CastError::OnCooldown { remaining });
        }
        bound.definition.clone()
    };

    if definition.cost > 0.0 {
        let mut mana = entity
            .get_mut::<Mana>()
            .ok_or(CastError::NoMana(caster))?;
        if mana.current < definition.cost {
            return Err(CastError::InsufficientMana {
                required: definition.cost,
                available: mana.current,
            });
        }
        mana.current -= definition.cost;
    }

    if let Some(mut slots) = entity.get_mut::<SkillSlots>() {
        if let Some(bound) = slots.get_mut(slot) {
            bound.last_cast_time = Some(now);
        }
    }

    let effect = ActiveSkillEffect::from(&definition);
    if let Some(mut effects) = entity.get_mut::<ActiveEffects>() {
        effects.push(effect.clone());
    } else {
        entity.insert(ActiveEffects(vec![effect.clone()]));
    }

    info!("{caster:?} cast '{}'", definition.name);
    debug!("effect {:?} value {} for {}s", effect.kind, effect.value, effect.remaining);
    Ok(effect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn skill(effect: EffectKind, cost: f32, cooldown: f32) -> SkillDefinition {
        SkillDefinition {
            name: format!("{effect:?}"),
            cost,
            cooldown,
            effect,
            effect_value: 0.5,
            effect_duration: 2.0,
            metadata: BTreeMap::new(),
        }
    }

    #[fixture]
    fn caster() -> (World, Entity) {
        let mut world = World::new();
        let slots = SkillSlots::from_definitions(vec![
            skill(EffectKind::DamageBoost, 30.0, 5.0),
            skill(EffectKind::Heal, 0.0, 0.0),
        ])
        .expect("two skills fit");
        let entity = world.spawn((slots, Mana::full(50.0, 0.0))).id();
        (world, entity)
    }

    #[rstest]
    fn cast_debits_mana_and_attaches_effect(caster: (World, Entity)) {
        let (mut world, entity) = caster;
        let effect = cast_skill(&mut world, entity, 0, 1.0).expect("cast succeeds");
        assert_eq!(effect.kind, EffectKind::DamageBoost);
        assert_eq!(world.get::<Mana>(entity).expect("mana").current, 20.0);
        let effects = world.get::<ActiveEffects>(entity).expect("effects attached");
        assert_eq!(effects.0.len(), 1);
        let slots = world.get::<SkillSlots>(entity).expect("slots");
        assert_eq!(slots.get(0).and_then(|s| s.last_cast_time), Some(1.0));
    }

    #[rstest]
    fn cast_respects_cooldown(caster: (World, Entity)) {
        let (mut world, entity) = caster;
        cast_skill(&mut world, entity, 0, 1.0).expect("first cast");
        let err = cast_skill(&mut world, entity, 0, 2.0).expect_err("still cooling down");
        assert!(matches!(err, CastError::OnCooldown { .. }));
    }

    #[rstest]
    fn cast_requires_mana(caster: (World, Entity)) {
        let (mut world, entity) = caster;
        if let Some(mut mana) = world.get_mut::<Mana>(entity) {
            mana.current = 10.0;
        }
        let err = cast_skill(&mut world, entity, 0, 0.0).expect_err("too little mana");
        assert_eq!(
            err,
            CastError::InsufficientMana {
                required: 30.0,
                available: 10.0
            }
        );
        assert!(world.get::<ActiveEffects>(entity).is_none());
    }

    #[rstest]
    #[case(2, CastError::EmptySlot { slot: 2 })]
    #[case(4, CastError::SlotOutOfRange { slot: 4 })]
    fn cast_rejects_bad_slots(
        caster: (World, Entity),
        #[case] slot: usize,
        #[case] expected: CastError,
    ) {
        let (mut world, entity) = caster;
        assert_eq!(cast_skill(&mut world, entity, slot, 0.0), Err(expected));
    }

    #[rstest]
    fn free_skill_needs_no_mana_pool() {
        let mut world = World::new();
        let slots = SkillSlots::from_definitions(vec![skill(EffectKind::Heal, 0.0, 0.0)])
            .expect("one skill fits");
        let entity = world.spawn(slots).id();
        assert!(cast_skill(&mut world, entity, 0, 0.0).is_ok());
    }

    #[rstest]
    fn unknown_caster_is_reported() {
        let mut world = World::new();
        let entity = world.spawn_empty().id();
        world.despawn(entity);
        assert_eq!(
            cast_skill(&mut world, entity, 0, 0.0),
            Err(CastError::UnknownCaster(entity))
        );
    }

    #[rstest]
    fn latest_effect_wins() {
        let mut effects = ActiveEffects::default();
        effects.push(ActiveSkillEffect {
            kind: EffectKind::DamageBoost,
            value: 2.0,
            remaining: 5.0,
        });
        effects.push(ActiveSkillEffect {
            kind: EffectKind::DamageBoost,
            value: 1.5,
            remaining: 1.0,
        });
        assert_eq!(effects.damage_boost(), 1.5);
        effects.age(1.0);
        assert_eq!(effects.damage_boost(), 2.0);
    }

    #[rstest]
    fn zero_duration_heal_waits_for_a_real_step() {
        let heal = ActiveSkillEffect {
            kind: EffectKind::Heal,
            value: 15.0,
            remaining: 0.0,
        };
        let mut effects = ActiveEffects(vec![heal.clone()]);

        assert_eq!(effects.age(0.0), 0.0);
        assert_eq!(effects.age(0.0), 0.0);
        assert_eq!(effects.0, vec![heal]);

        assert_eq!(effects.age(0.1), 15.0);
        assert!(effects.is_empty());
        assert_eq!(effects.age(0.1), 0.0);
    }

    #[rstest]
    fn reduction_is_clamped() {
        let effects = ActiveEffects(vec![ActiveSkillEffect {
            kind: EffectKind::DamageReduction,
            value: 1.7,
            remaining: 1.0,
        }]);
        assert_eq!(effects.damage_reduction(), 1.0);
    }

    #[rstest]
    fn too_many_skills_are_rejected() {
        let skills = vec![skill(EffectKind::Heal, 0.0, 0.0); SKILL_SLOT_COUNT + 1];
        assert!(SkillSlots::from_definitions(skills).is_none());
    }
}
