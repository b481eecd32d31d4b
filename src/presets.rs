//! Class and item presets of the standard roster.
//!
//! A [`PresetCatalog`] turns a class name into a ready-to-spawn [`BallSpec`].
//! The initial velocity is sampled from the class speed range in a uniformly
//! random direction, so callers pass the RNG in and control the seed.
use std::collections::BTreeMap;
use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{Item, PlayerId};
use crate::spawn::{BallSpec, ItemSpec};

/// Errors raised while resolving presets.
#[derive(Debug, Error)]
pub enum PresetError {
    /// No class with this name.
    #[error("unknown class preset '{0}'")]
    UnknownClass(String),
    /// A class refers to an item that is not in the catalog.
    #[error("class '{class}' refers to unknown item '{item}'")]
    UnknownItem {
        /// Referring class.
        class: String,
        /// Missing item.
        item: String,
    },
    /// The class speed range is empty, negative, or not finite.
    #[error("class '{class}' has invalid speed range {min}..={max}")]
    InvalidSpeedRange {
        /// Offending class.
        class: String,
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },
    /// The catalog JSON could not be parsed.
    #[error("failed to parse preset catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// An item preset: the item payload and how it orbits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPreset {
    /// Item payload.
    pub item: Item,
    /// Distance from the carrier's centre.
    pub orbit_radius: f32,
    /// Degrees per second.
    pub angular_speed: f32,
    /// Rectangle width.
    pub hitbox_width: f32,
    /// Rectangle height.
    pub hitbox_height: f32,
}

impl ItemPreset {
    fn new(item: Item, orbit_radius: f32, angular_speed: f32, hitbox: (f32, f32)) -> Self {
        Self {
            item,
            orbit_radius,
            angular_speed,
            hitbox_width: hitbox.0,
            hitbox_height: hitbox.1,
        }
    }

    /// [`ItemSpec`](crate::spawn::ItemSpec) for this item with default collision properties.
    #[must_use]
    pub fn to_spec(&self) -> ItemSpec {
        ItemSpec {
            orbit_radius: self.orbit_radius,
            angular_speed: self.angular_speed,
            hitbox_width: self.hitbox_width,
            hitbox_height: self.hitbox_height,
            ..ItemSpec::new(self.item.clone())
        }
    }
}

/// A playable class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassPreset {
    /// Collision radius.
    pub radius: f32,
    /// Mass.
    pub mass: f32,
    /// Restitution.
    pub restitution: f32,
    /// Inclusive range the initial speed is drawn from.
    pub speed_range: (f32, f32),
    /// Starting hit points.
    pub max_hp: i32,
    /// Passive contact damage.
    pub body_damage: f32,
    /// Item names, resolved against the catalog.
    pub items: Vec<String>,
}

/// Named class and item presets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetCatalog {
    /// Classes by name.
    pub classes: BTreeMap<String, ClassPreset>,
    /// Items by name.
    pub items: BTreeMap<String, ItemPreset>,
}

fn item(name: &str, damage: f32, damage_reduction: f32, knockback_strength: f32) -> Item {
    Item {
        name: name.to_owned(),
        damage,
        damage_reduction,
        speed_boost: 0.0,
        knockback_strength,
    }
}

impl Default for PresetCatalog {
    /// The Knight and Mage roster.
    fn default() -> Self {
        let items = [
            ItemPreset::new(item("Knight Shield", 0.0, 0.4, 40.0), 60.0, 90.0, (80.0, 60.0)),
            ItemPreset::new(item("Knight Sword", 30.0, 0.0, 40.0), 80.0, 90.0, (60.0, 60.0)),
            ItemPreset::new(item("Mage Orb", 30.0, 0.0, 40.0), 120.0, 300.0, (40.0, 40.0)),
            ItemPreset::new(item("Mage Staff", 10.0, 0.0, 70.0), 60.0, 90.0, (60.0, 80.0)),
        ]
        .into_iter()
        .map(|preset| (preset.item.name.clone(), preset))
        .collect();

        let classes = BTreeMap::from([
            (
                "Knight".to_owned(),
                ClassPreset {
                    radius: 40.0,
                    mass: 4.0,
                    restitution: 1.0,
                    speed_range: (600.0, 650.0),
                    max_hp: 200,
                    body_damage: 10.0,
                    items: vec!["Knight Shield".to_owned(), "Knight Sword".to_owned()],
                },
            ),
            (
                "Mage".to_owned(),
                ClassPreset {
                    radius: 30.0,
                    mass: 3.0,
                    restitution: 1.0,
                    speed_range: (500.0, 550.0),
                    max_hp: 180,
                    body_damage: 5.0,
                    items: vec!["Mage Orb".to_owned(), "Mage Staff".to_owned()],
                },
            ),
        ]);

        Self { classes, items }
    }
}

impl PresetCatalog {
    /// Parses a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PresetError::Parse`] for malformed input.
    pub fn from_json_str(json: &str) -> Result<Self, PresetError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Class names in alphabetical order.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Looks up a class.
    ///
    /// # Errors
    ///
    /// Returns [`PresetError::UnknownClass`] when no class has this name.
    pub fn class(&self, name: &str) -> Result<&ClassPreset, PresetError> {
        self.classes
            .get(name)
            .ok_or_else(|| PresetError::UnknownClass(name.to_owned()))
    }

    /// Builds a [`BallSpec`](crate::spawn::BallSpec) for `class` controlled by `player` at `position`.
    ///
    /// The initial speed is drawn uniformly from the class speed range and
    /// also becomes the ball's desired speed.
    ///
    /// # Errors
    ///
    /// Returns a [`PresetError`] for unknown classes or items and for
    /// invalid speed ranges.
    pub fn ball_spec<R: Rng + ?Sized>(
        &self,
        class: &str,
        player: PlayerId,
        position: Vec2,
        rng: &mut R,
    ) -> Result<BallSpec, PresetError> {
        let preset = self.class(class)?;
        let items = preset
            .items
            .iter()
            .map(|name| {
                self.items
                    .get(name)
                    .map(ItemPreset::to_spec)
                    .ok_or_else(|| PresetError::UnknownItem {
                        class: class.to_owned(),
                        item: name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (min, max) = preset.speed_range;
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
            return Err(PresetError::InvalidSpeedRange {
                class: class.to_owned(),
                min,
                max,
            });
        }
        let speed = rng.gen_range(min..=max);
        let direction = Vec2::from_angle(rng.gen_range(0.0..TAU));

        Ok(BallSpec {
            player: Some(player),
            position,
            radius: preset.radius,
            mass: preset.mass,
            restitution: preset.restitution,
            max_hp: preset.max_hp,
            body_damage: preset.body_damage,
            velocity: direction * speed,
            desired_speed: Some(speed),
            items,
            ..BallSpec::default()
        })
    }
}
