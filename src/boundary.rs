//! Keeps moving entities inside the arena rectangle.
//!
//! Circles are tested with their radius, entities carrying an
//! [`OrientedHitbox`] with the bounding box of the rotated rectangle. Each
//! axis is handled independently so a corner hit bounces on both.
use bevy::prelude::*;

use crate::components::{
    ArenaBounds, Kinetic, Orientation, OrientedHitbox, PhysicalProps, Spatial,
};
use crate::geometry::Aabb;

type BoundaryRow<'w> = (
    &'w mut Spatial,
    &'w mut Kinetic,
    &'w PhysicalProps,
    Option<&'w OrientedHitbox>,
    Option<&'w Orientation>,
);

/// Extent of an entity as a box around its position.
fn extent(spatial: &Spatial, hitbox: Option<&OrientedHitbox>, angle: f32) -> Aabb {
    match hitbox {
        Some(hitbox) => hitbox.world_rect(spatial.position, angle).aabb(),
        None => Aabb {
            min: spatial.position - Vec2::splat(spatial.radius),
            max: spatial.position + Vec2::splat(spatial.radius),
        },
    }
}

/// Resolves one axis. Returns the positional correction and the new
/// velocity component.
fn resolve_axis(
    low: f32,
    high: f32,
    wall_low: f32,
    wall_high: f32,
    velocity: f32,
    restitution: f32,
) -> (f32, f32) {
    if low < wall_low {
        (wall_low - low, -velocity * restitution)
    } else if high > wall_high {
        (wall_high - high, -velocity * restitution)
    } else {
        (0.0, velocity)
    }
}

/// Pushes entities back inside [`ArenaBounds`] and reflects their velocity
/// on the violated axis, scaled by restitution. Does nothing without an
/// arena.
pub fn boundary_system(arena: Query<&ArenaBounds>, mut query: Query<BoundaryRow<'_>>) {
    let Some(bounds) = arena.iter().next() else {
        return;
    };
    let (wall_min, wall_max) = (bounds.min(), bounds.max());

    for (mut spatial, mut kinetic, props, hitbox, orientation) in &mut query {
        let angle = orientation.map_or(0.0, |o| o.angle);
        let aabb = extent(&spatial, hitbox, angle);

        let (dx, vx) = resolve_axis(
            aabb.min.x,
            aabb.max.x,
            wall_min.x,
            wall_max.x,
            kinetic.velocity.x,
            props.restitution,
        );
        let (dy, vy) = resolve_axis(
            aabb.min.y,
            aabb.max.y,
            wall_min.y,
            wall_max.y,
            kinetic.velocity.y,
            props.restitution,
        );

        if dx != 0.0 || dy != 0.0 {
            spatial.position += Vec2::new(dx, dy);
            kinetic.velocity = Vec2::new(vx, vy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn world() -> World {
        let mut world = World::new();
        world.spawn(ArenaBounds {
            origin: Vec2::ZERO,
            size: Vec2::new(200.0, 100.0),
        });
        world
    }

    fn run(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(boundary_system);
        schedule.run(world);
    }

    #[rstest]
    fn circle_bounces_off_left_wall(mut world: World) {
        let ball = world
            .spawn((
                Spatial::new(Vec2::new(5.0, 50.0), 10.0),
                Kinetic::new(Vec2::new(-20.0, 3.0)),
                PhysicalProps::new(1.0, 0.5),
            ))
            .id();
        run(&mut world);

        let spatial = world.get::<Spatial>(ball).expect("spatial");
        assert_relative_eq!(spatial.position.x, 10.0);
        let kinetic = world.get::<Kinetic>(ball).expect("kinetic");
        assert_relative_eq!(kinetic.velocity.x, 10.0);
        assert_relative_eq!(kinetic.velocity.y, 3.0);
    }

    #[rstest]
    fn corner_hit_reflects_both_axes(mut world: World) {
        let ball = world
            .spawn((
                Spatial::new(Vec2::new(195.0, 98.0), 10.0),
                Kinetic::new(Vec2::new(5.0, 5.0)),
                PhysicalProps::new(1.0, 1.0),
            ))
            .id();
        run(&mut world);

        let spatial = world.get::<Spatial>(ball).expect("spatial");
        assert_relative_eq!(spatial.position.x, 190.0);
        assert_relative_eq!(spatial.position.y, 90.0);
        let kinetic = world.get::<Kinetic>(ball).expect("kinetic");
        assert_eq!(kinetic.velocity, Vec2::new(-5.0, -5.0));
    }

    #[rstest]
    fn rotated_hitbox_uses_rotated_extent(mut world: World) {
        // A 40x4 bar rotated upright reaches 20 units above its centre.
        let bar = world
            .spawn((
                Spatial::new(Vec2::new(100.0, 15.0), 1.0),
                Kinetic::new(Vec2::new(0.0, -1.0)),
                PhysicalProps::new(1.0, 1.0),
                OrientedHitbox::centered(40.0, 4.0),
                Orientation::new(90.0),
            ))
            .id();
        run(&mut world);

        let spatial = world.get::<Spatial>(bar).expect("spatial");
        assert_relative_eq!(spatial.position.y, 20.0, epsilon = 1e-4);
        let kinetic = world.get::<Kinetic>(bar).expect("kinetic");
        assert_relative_eq!(kinetic.velocity.y, 1.0);
    }

    #[rstest]
    fn no_arena_is_a_no_op() {
        let mut world = World::new();
        let ball = world
            .spawn((
                Spatial::new(Vec2::new(-50.0, -50.0), 10.0),
                Kinetic::new(Vec2::new(-1.0, 0.0)),
                PhysicalProps::new(1.0, 1.0),
            ))
            .id();
        run(&mut world);
        let spatial = world.get::<Spatial>(ball).expect("spatial");
        assert_eq!(spatial.position, Vec2::new(-50.0, -50.0));
    }
}
