//! Tunable simulation parameters.
//!
//! [`SimConfig`] is inserted as a resource by [`ArenaPlugin`](crate::ArenaPlugin)
//! and read by the collision and orientation systems. It can be loaded from
//! JSON so balance tweaks do not require a rebuild.
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DAMAGE_POPUP_COLOR, DAMAGE_POPUP_DURATION, SHIELD_BLOCK_HALF_ANGLE_DEG, SPIN_RATE_DEG,
};

/// Errors raised while loading a [`SimConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The input was not valid JSON for the config schema.
    #[error("failed to parse simulation config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field holds a value outside its accepted range.
    #[error("config field `{field}` is out of range: {value}")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Value that was rejected.
        value: f32,
    },
}

/// Balance knobs shared by the simulation systems.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// An item only blocks retaliation damage when the body lies within this
    /// many degrees of its facing.
    pub shield_block_half_angle_deg: f32,
    /// Lifetime of spawned damage popups in seconds.
    pub popup_duration: f32,
    /// Colour of spawned damage popups.
    pub popup_color: [u8; 3],
    /// Idle rotation applied to non-orbital orientations, in degrees per
    /// second.
    pub spin_rate_deg: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            shield_block_half_angle_deg: SHIELD_BLOCK_HALF_ANGLE_DEG,
            popup_duration: DAMAGE_POPUP_DURATION,
            popup_color: DAMAGE_POPUP_COLOR,
            spin_rate_deg: SPIN_RATE_DEG,
        }
    }
}

impl SimConfig {
    /// Parses and validates a JSON document. Missing fields keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::OutOfRange`] when a value fails validation.
    ///
    /// # Examples
    ///
    /// ```
    /// use arena_duel::config::SimConfig;
    /// let config = SimConfig::from_json_str(r#"{ "popup_duration": 1.5 }"#)
    ///     .expect("valid config");
    /// assert_eq!(config.popup_duration, 1.5);
    /// assert_eq!(config.spin_rate_deg, 180.0);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let angle = self.shield_block_half_angle_deg;
        if !(0.0..=180.0).contains(&angle) {
            return Err(ConfigError::OutOfRange {
                field: "shield_block_half_angle_deg",
                value: angle,
            });
        }
        if !self.popup_duration.is_finite() || self.popup_duration <= 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "popup_duration",
                value: self.popup_duration,
            });
        }
        if !self.spin_rate_deg.is_finite() {
            return Err(ConfigError::OutOfRange {
                field: "spin_rate_deg",
                value: self.spin_rate_deg,
            });
        }
        Ok(())
    }

    /// Cosine threshold that a facing dot product must reach to block.
    #[must_use]
    pub fn block_cosine(&self) -> f32 {
        self.shield_block_half_angle_deg.to_radians().cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn empty_object_yields_defaults() {
        let config = SimConfig::from_json_str("{}").expect("empty config parses");
        assert_eq!(config, SimConfig::default());
    }

    #[rstest]
    #[case(r#"{ "shield_block_half_angle_deg": 200.0 }"#, "shield_block_half_angle_deg")]
    #[case(r#"{ "popup_duration": 0.0 }"#, "popup_duration")]
    fn rejects_out_of_range(#[case] json: &str, #[case] expected: &str) {
        match SimConfig::from_json_str(json) {
            Err(ConfigError::OutOfRange { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected out of range error, got {other:?}"),
        }
    }

    #[rstest]
    fn reports_parse_errors() {
        let err = SimConfig::from_json_str("{ not json").expect_err("invalid json");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[rstest]
    fn default_block_cosine_is_half() {
        let cosine = SimConfig::default().block_cosine();
        assert!((cosine - 0.5).abs() < 1e-6);
    }
}
