//! Physical response to a detected contact.
//!
//! Every function takes the pair in detection order; the contact normal
//! points from `first` to `second`.
use glam::Vec2;

use super::Collider;
use crate::constants::{MASS_EPSILON, SPEED_EPSILON};
use crate::geometry::Contact;

/// Pushes the pair apart along the normal. Each side moves by the other's
/// share of the total mass, so the heavier entity moves less.
pub fn separate(first: &mut Collider, second: &mut Collider, contact: &Contact) {
    let mut total = first.props.mass + second.props.mass;
    if total == 0.0 {
        total = 1.0;
    }
    let push = contact.normal * contact.overlap;
    first.position -= push * (second.props.mass / total);
    second.position += push * (first.props.mass / total);
}

fn inverse_masses(first: &Collider, second: &Collider) -> (f32, f32) {
    (first.props.inverse_mass(), second.props.inverse_mass())
}

/// Elastic impulse along the normal using the smaller restitution.
///
/// Skipped unless both sides move and they are approaching.
pub fn exchange_impulse(first: &mut Collider, second: &mut Collider, contact: &Contact) {
    let (Some(v1), Some(v2)) = (first.velocity, second.velocity) else {
        return;
    };
    let approach = (v2 - v1).dot(contact.normal);
    if approach > 0.0 {
        return;
    }
    let restitution = first.props.restitution.min(second.props.restitution);
    let (inv1, inv2) = inverse_masses(first, second);
    let denominator = inv1 + inv2;
    if denominator <= MASS_EPSILON {
        return;
    }
    let magnitude = -(1.0 + restitution) * approach / denominator;
    apply_impulse(first, second, contact.normal * magnitude);
}

/// Extra impulse of `strength` along the normal, scaled by inverse mass on
/// each side. Only applies when both sides move.
pub fn knockback(first: &mut Collider, second: &mut Collider, contact: &Contact, strength: f32) {
    if strength <= 0.0 || first.velocity.is_none() || second.velocity.is_none() {
        return;
    }
    apply_impulse(first, second, contact.normal * strength);
}

fn apply_impulse(first: &mut Collider, second: &mut Collider, impulse: Vec2) {
    let (inv1, inv2) = inverse_masses(first, second);
    if let Some(velocity) = first.velocity.as_mut() {
        *velocity -= impulse * inv1;
    }
    if let Some(velocity) = second.velocity.as_mut() {
        *velocity += impulse * inv2;
    }
}

/// Rescales the velocity to the desired speed, keeping its direction.
/// Near-zero velocities have no direction and are left alone.
pub fn restore_speed(collider: &mut Collider) {
    let (Some(velocity), Some(target)) = (collider.velocity.as_mut(), collider.desired_speed)
    else {
        return;
    };
    let magnitude = velocity.length();
    if magnitude > SPEED_EPSILON && target > 0.0 {
        *velocity *= target / magnitude;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::Role;
    use crate::components::PhysicalProps;
    use approx::assert_relative_eq;
    use bevy::prelude::Entity;
    use rstest::rstest;

    fn ball(x: f32, vx: f32, mass: f32) -> Collider {
        Collider {
            entity: Entity::PLACEHOLDER,
            position: Vec2::new(x, 0.0),
            radius: 10.0,
            velocity: Some(Vec2::new(vx, 0.0)),
            props: PhysicalProps::new(mass, 1.0),
            hitbox: None,
            angle: None,
            desired_speed: None,
            role: Role::Body,
        }
    }

    fn contact_x(overlap: f32) -> Contact {
        Contact {
            normal: Vec2::X,
            overlap,
        }
    }

    #[rstest]
    fn heavier_entity_moves_less() {
        let mut light = ball(0.0, 0.0, 1.0);
        let mut heavy = ball(15.0, 0.0, 3.0);
        separate(&mut light, &mut heavy, &contact_x(4.0));
        assert_relative_eq!(light.position.x, -3.0);
        assert_relative_eq!(heavy.position.x, 16.0);
    }

    #[rstest]
    fn equal_masses_swap_velocities() {
        let mut a = ball(0.0, 5.0, 2.0);
        let mut b = ball(15.0, -5.0, 2.0);
        exchange_impulse(&mut a, &mut b, &contact_x(5.0));
        assert_relative_eq!(a.velocity.map_or(0.0, |v| v.x), -5.0);
        assert_relative_eq!(b.velocity.map_or(0.0, |v| v.x), 5.0);
    }

    #[rstest]
    fn separating_pair_keeps_velocity() {
        let mut a = ball(0.0, -5.0, 2.0);
        let mut b = ball(15.0, 5.0, 2.0);
        exchange_impulse(&mut a, &mut b, &contact_x(5.0));
        assert_eq!(a.velocity, Some(Vec2::new(-5.0, 0.0)));
        assert_eq!(b.velocity, Some(Vec2::new(5.0, 0.0)));
    }

    #[rstest]
    fn knockback_needs_two_moving_sides() {
        let mut a = ball(0.0, 0.0, 1.0);
        let mut b = ball(15.0, 0.0, 1.0);
        b.velocity = None;
        knockback(&mut a, &mut b, &contact_x(1.0), 40.0);
        assert_eq!(a.velocity, Some(Vec2::ZERO));
    }

    #[rstest]
    fn speed_is_restored_along_current_direction() {
        let mut a = ball(0.0, 3.0, 1.0);
        a.velocity = Some(Vec2::new(3.0, 4.0));
        a.desired_speed = Some(10.0);
        restore_speed(&mut a);
        let velocity = a.velocity.unwrap_or_default();
        assert_relative_eq!(velocity.x, 6.0);
        assert_relative_eq!(velocity.y, 8.0);
    }

    #[rstest]
    fn resting_entity_is_not_restored() {
        let mut a = ball(0.0, 0.0, 1.0);
        a.desired_speed = Some(10.0);
        restore_speed(&mut a);
        assert_eq!(a.velocity, Some(Vec2::ZERO));
    }
}
