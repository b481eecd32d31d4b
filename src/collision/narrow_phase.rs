//! Shape dispatch for the pairwise overlap test.
use glam::Vec2;

use crate::geometry::{circle_circle, circle_rect, rect_rect, Contact, OrientedRect};

/// Collision shape of one entity for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Circle described by its centre and radius.
    Circle {
        /// World-space centre.
        center: Vec2,
        /// Radius.
        radius: f32,
    },
    /// Rotated rectangle.
    Rect(OrientedRect),
}

/// Tests two shapes for overlap.
///
/// The returned normal always points from `first` towards `second`,
/// whichever shapes are involved.
#[must_use]
pub fn contact(first: &Shape, second: &Shape) -> Option<Contact> {
    match (first, second) {
        (
            Shape::Circle {
                center: a,
                radius: ra,
            },
            Shape::Circle {
                center: b,
                radius: rb,
            },
        ) => circle_circle(*a, *ra, *b, *rb),
        // The circle test reports a normal from the rectangle to the circle.
        (Shape::Circle { center, radius }, Shape::Rect(rect)) => {
            circle_rect(*center, *radius, rect).map(|c| Contact {
                normal: -c.normal,
                overlap: c.overlap,
            })
        }
        (Shape::Rect(rect), Shape::Circle { center, radius }) => {
            circle_rect(*center, *radius, rect)
        }
        (Shape::Rect(a), Shape::Rect(b)) => rect_rect(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn circle(x: f32, radius: f32) -> Shape {
        Shape::Circle {
            center: Vec2::new(x, 0.0),
            radius,
        }
    }

    fn square(x: f32, side: f32) -> Shape {
        Shape::Rect(OrientedRect::new(Vec2::new(x, 0.0), side, side, 0.0))
    }

    #[rstest]
    #[case::circle_circle(circle(0.0, 5.0), circle(8.0, 5.0))]
    #[case::circle_rect(circle(0.0, 5.0), square(8.0, 8.0))]
    #[case::rect_circle(square(0.0, 8.0), circle(8.0, 5.0))]
    #[case::rect_rect(square(0.0, 8.0), square(6.0, 8.0))]
    fn normal_points_from_first_to_second(#[case] first: Shape, #[case] second: Shape) {
        let forward = contact(&first, &second).expect("shapes overlap");
        assert_relative_eq!(forward.normal.x, 1.0, epsilon = 1e-5);
        let backward = contact(&second, &first).expect("shapes overlap");
        assert_relative_eq!(backward.normal.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(forward.overlap, backward.overlap, epsilon = 1e-5);
    }
}
