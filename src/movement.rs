//! Explicit Euler integration of positions.
use bevy::prelude::*;

use crate::components::{Kinetic, Spatial};
use crate::plugin::SimClock;

/// Advances every moving entity by `velocity * dt`.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn movement_system(clock: Res<SimClock>, mut query: Query<(&mut Spatial, &Kinetic)>) {
    let dt = clock.delta;
    for (mut spatial, kinetic) in &mut query {
        spatial.position += kinetic.velocity * dt;
    }
}
