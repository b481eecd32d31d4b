//! Numeric conversion helpers for combat arithmetic.
//!
//! Damage and healing are computed in floating point and stored as whole hit
//! points. These helpers guard the conversion so non-finite or out-of-range
//! values never reach a [`Vitality`](crate::components::Vitality).

/// Round a damage amount to the nearest whole hit point, flooring at zero.
///
/// Ties round to the even neighbour. Non-finite inputs yield zero.
///
/// # Examples
///
/// ```
/// use arena_duel::numeric::round_damage;
/// assert_eq!(round_damage(5.5), 6);
/// assert_eq!(round_damage(4.5), 4);
/// assert_eq!(round_damage(-3.0), 0);
/// assert_eq!(round_damage(f32::NAN), 0);
/// ```
#[expect(
    clippy::cast_possible_truncation,
    reason = "The value is clamped to the i32 domain before casting."
)]
#[must_use]
pub fn round_damage(value: f32) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    let rounded = f64::from(value).round_ties_even();
    rounded.clamp(0.0, f64::from(i32::MAX)) as i32
}

/// Truncate a heal amount towards zero, clamping into the `i32` domain.
///
/// # Examples
///
/// ```
/// use arena_duel::numeric::truncate_heal;
/// assert_eq!(truncate_heal(12.9), 12);
/// assert_eq!(truncate_heal(f32::INFINITY), 0);
/// ```
#[expect(
    clippy::cast_possible_truncation,
    reason = "The value is clamped to the i32 bounds before casting."
)]
#[must_use]
pub fn truncate_heal(value: f32) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    let truncated = f64::from(value).trunc();
    truncated.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

/// Convert hit points to `f32` for multiplier arithmetic.
#[expect(
    clippy::cast_precision_loss,
    reason = "Hit point totals stay far below f32's exact integer range."
)]
#[must_use]
pub fn hp_to_f32(value: i32) -> f32 {
    value as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(10.0, 10)]
    #[case(5.999, 6)]
    #[case(2.5, 2)]
    #[case(3.5, 4)]
    #[case(0.4, 0)]
    #[case(-0.6, 0)]
    #[case(1e20, i32::MAX)]
    fn rounds_and_floors_damage(#[case] input: f32, #[case] expected: i32) {
        assert_eq!(round_damage(input), expected);
    }

    #[rstest]
    #[case(40.0, 40)]
    #[case(39.99, 39)]
    #[case(-5.5, -5)]
    #[case(f32::NAN, 0)]
    fn truncates_heals(#[case] input: f32, #[case] expected: i32) {
        assert_eq!(truncate_heal(input), expected);
    }
}
