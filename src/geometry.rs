//! Planar geometry helpers for the narrow phase and orientation logic.
//!
//! Angles are expressed in degrees with 0 pointing along +X and positive
//! angles rotating towards +Y (screen space, Y down). Every helper tolerates
//! degenerate input: zero-length vectors fall back to [`CANONICAL_NORMAL`]
//! instead of producing `NaN`.
use glam::Vec2;

/// Direction used whenever a normal cannot be derived from the input.
pub const CANONICAL_NORMAL: Vec2 = Vec2::X;

/// Returns the unit vector of `vector`, or `fallback` when it is zero-length
/// or not finite.
///
/// # Examples
///
/// ```
/// use arena_duel::geometry::direction_or;
/// use glam::Vec2;
/// assert_eq!(direction_or(Vec2::new(0.0, 2.0), Vec2::X), Vec2::Y);
/// assert_eq!(direction_or(Vec2::ZERO, Vec2::X), Vec2::X);
/// ```
#[must_use]
pub fn direction_or(vector: Vec2, fallback: Vec2) -> Vec2 {
    if !vector.is_finite() {
        return fallback;
    }
    vector.try_normalize().unwrap_or(fallback)
}

/// Rotates `vector` by `degrees`.
#[must_use]
pub fn rotate(vector: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(vector)
}

/// Unit vector pointing along `degrees`.
#[must_use]
pub fn heading(degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians())
}

/// Angle of `vector` in degrees, in `(-180, 180]`.
#[must_use]
pub fn angle_of(vector: Vec2) -> f32 {
    vector.y.atan2(vector.x).to_degrees()
}

/// Wraps an angle into `[0, 360)`.
///
/// # Examples
///
/// ```
/// use arena_duel::geometry::normalize_degrees;
/// assert_eq!(normalize_degrees(370.0), 10.0);
/// assert_eq!(normalize_degrees(-90.0), 270.0);
/// ```
#[must_use]
pub fn normalize_degrees(degrees: f32) -> f32 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec2,
    /// Maximum corner.
    pub max: Vec2,
}

impl Aabb {
    /// Returns `true` when the boxes overlap or touch.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// Rectangle defined in its own frame and rotated about its centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedRect {
    /// World-space centre.
    pub center: Vec2,
    /// Half width and half height in the local frame.
    pub half_extents: Vec2,
    /// Rotation in degrees.
    pub angle: f32,
}

impl OrientedRect {
    /// Builds a rectangle from a centre, full width and height, and angle.
    #[must_use]
    pub fn new(center: Vec2, width: f32, height: f32, angle: f32) -> Self {
        Self {
            center,
            half_extents: Vec2::new(width, height) * 0.5,
            angle,
        }
    }

    /// World-space corners, counter-clockwise from the local top-left.
    #[must_use]
    pub fn corners(&self) -> [Vec2; 4] {
        let Vec2 { x: hw, y: hh } = self.half_extents;
        [
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ]
        .map(|corner| rotate(corner, self.angle) + self.center)
    }

    /// Bounding box of the rotated corners.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        let corners = self.corners();
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for corner in corners {
            min = min.min(corner);
            max = max.max(corner);
        }
        Aabb { min, max }
    }

    /// Expresses a world-space point in the rectangle's local frame.
    #[must_use]
    pub fn to_local(&self, point: Vec2) -> Vec2 {
        rotate(point - self.center, -self.angle)
    }
}

/// Collision normal and penetration depth for an overlapping pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal. Its orientation is documented per test function.
    pub normal: Vec2,
    /// Penetration depth along `normal`.
    pub overlap: f32,
}

/// Circle against circle.
///
/// The normal points from the first circle towards the second. Coincident
/// centres have no meaningful normal and are reported as no contact.
#[must_use]
pub fn circle_circle(
    first: Vec2,
    first_radius: f32,
    second: Vec2,
    second_radius: f32,
) -> Option<Contact> {
    let delta = second - first;
    let distance_sq = delta.length_squared();
    let min_distance = first_radius + second_radius;
    if distance_sq >= min_distance * min_distance || distance_sq <= 0.0 {
        return None;
    }
    let distance = distance_sq.sqrt();
    Some(Contact {
        normal: delta / distance,
        overlap: min_distance - distance,
    })
}

/// Circle against a rotated rectangle.
///
/// The normal points from the nearest point on the rectangle towards the
/// circle centre. A centre lying inside the rectangle yields the local +X
/// axis rotated into world space.
#[must_use]
pub fn circle_rect(center: Vec2, radius: f32, rect: &OrientedRect) -> Option<Contact> {
    let local = rect.to_local(center);
    let nearest = local.clamp(-rect.half_extents, rect.half_extents);
    let offset = local - nearest;
    let distance_sq = offset.length_squared();
    if distance_sq >= radius * radius {
        return None;
    }
    let distance = if distance_sq > 0.0 {
        distance_sq.sqrt()
    } else {
        0.0
    };
    let local_normal = if distance > 0.0 {
        offset / distance
    } else {
        CANONICAL_NORMAL
    };
    Some(Contact {
        normal: rotate(local_normal, rect.angle),
        overlap: radius - distance,
    })
}

/// Rectangle against rectangle, using the bounding boxes of both rotated
/// rectangles.
///
/// This is a conservative test rather than a separating-axis test: rotated
/// rectangles whose boxes overlap near the corners are reported as touching.
/// The normal points from the first centre towards the second and the overlap
/// is the smaller per-axis box overlap, or the larger one when an axis reports
/// none.
#[must_use]
pub fn rect_rect(first: &OrientedRect, second: &OrientedRect) -> Option<Contact> {
    let a = first.aabb();
    let b = second.aabb();
    if !a.intersects(&b) {
        return None;
    }
    let normal = direction_or(second.center - first.center, CANONICAL_NORMAL);
    let overlap_x = if a.max.x > b.min.x {
        (a.max.x - b.min.x).min(b.max.x - a.min.x)
    } else {
        0.0
    };
    let overlap_y = if a.max.y > b.min.y {
        (a.max.y - b.min.y).min(b.max.y - a.min.y)
    } else {
        0.0
    };
    let overlap = if overlap_x > 0.0 && overlap_y > 0.0 {
        overlap_x.min(overlap_y)
    } else {
        overlap_x.max(overlap_y)
    };
    Some(Contact { normal, overlap })
}
