//! Geometry primitives shared across the layout engine.
//!
//! Rectangles are stored as `(center, halfSize)` rather than
//! `(origin, size)`. This makes translation and bounding-box aggregation
//! commutative with resizing, which the snap resolver relies on heavily.

use serde::{Deserialize, Serialize};

/// A point in screen-pixel space (or a displacement vector, depending on context).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }

    #[must_use]
    pub const fn zero() -> Self { Self { x: 0.0, y: 0.0 } }

    #[must_use]
    pub fn add(self, other: Self) -> Self { Self::new(self.x + other.x, self.y + other.y) }

    #[must_use]
    pub fn sub(self, other: Self) -> Self { Self::new(self.x - other.x, self.y - other.y) }

    #[must_use]
    pub fn scale(self, factor: f64) -> Self { Self::new(self.x * factor, self.y * factor) }

    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let d = self.sub(other);
        d.x.hypot(d.y)
    }
}

/// Which screen axis a value or edge varies along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// The outer edge of a rectangle, in the direction a moving rectangle
/// approaches from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Top,
    Bottom,
}

impl Direction {
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Left | Self::Right => Axis::Horizontal,
            Self::Top | Self::Bottom => Axis::Vertical,
        }
    }
}

/// A rectangle expressed as a center point and a half-extent.
///
/// `width = 2 * half_size.x`, `height = 2 * half_size.y`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub center: Point,
    pub half_size: Point,
}

impl Rect {
    #[must_use]
    pub const fn new(center: Point, half_size: Point) -> Self { Self { center, half_size } }

    #[must_use]
    pub const fn zero() -> Self { Self { center: Point::zero(), half_size: Point::zero() } }

    #[must_use]
    pub fn from_min_max(min: Point, max: Point) -> Self {
        let center = Point::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
        let half_size = Point::new((max.x - min.x) / 2.0, (max.y - min.y) / 2.0);
        Self { center, half_size }
    }

    #[must_use]
    pub fn width(&self) -> f64 { self.half_size.x * 2.0 }

    #[must_use]
    pub fn height(&self) -> f64 { self.half_size.y * 2.0 }

    #[must_use]
    pub fn min(&self) -> Point { self.center.sub(self.half_size) }

    #[must_use]
    pub fn max(&self) -> Point { self.center.add(self.half_size) }

    #[must_use]
    pub fn translated(&self, delta: Point) -> Self {
        Self { center: self.center.add(delta), half_size: self.half_size }
    }

    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        let min = self.min();
        let max = self.max();
        p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
    }

    /// Interior-overlap area with another rect (0 if disjoint or merely touching).
    #[must_use]
    pub fn overlap_area(&self, other: &Self) -> f64 {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        let ox = (a_max.x.min(b_max.x) - a_min.x.max(b_min.x)).max(0.0);
        let oy = (a_max.y.min(b_max.y) - a_min.y.max(b_min.y)).max(0.0);
        ox * oy
    }

    /// Edge-to-edge gap and overlap along one axis pairing, used by the snap resolver.
    ///
    /// `delta` is the signed distance from `self`'s edge in `direction` to the
    /// matching edge of `other`; `overlap` is the extent the two rects share on
    /// the perpendicular axis.
    #[must_use]
    pub fn edge_gap(&self, other: &Self, direction: Direction) -> (f64, f64) {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        match direction {
            Direction::Right => {
                let delta = b_min.x - a_max.x;
                let overlap = a_max.y.min(b_max.y) - a_min.y.max(b_min.y);
                (delta, overlap)
            }
            Direction::Left => {
                let delta = a_min.x - b_max.x;
                let overlap = a_max.y.min(b_max.y) - a_min.y.max(b_min.y);
                (delta, overlap)
            }
            Direction::Bottom => {
                let delta = b_min.y - a_max.y;
                let overlap = a_max.x.min(b_max.x) - a_min.x.max(b_min.x);
                (delta, overlap)
            }
            Direction::Top => {
                let delta = a_min.y - b_max.y;
                let overlap = a_max.x.min(b_max.x) - a_min.x.max(b_min.x);
                (delta, overlap)
            }
        }
    }
}

impl Default for Rect {
    fn default() -> Self { Self::zero() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_min_max_roundtrips() {
        let r = Rect::from_min_max(Point::new(0.0, 0.0), Point::new(100.0, 50.0));
        assert_eq!(r.center, Point::new(50.0, 25.0));
        assert_eq!(r.half_size, Point::new(50.0, 25.0));
        assert_eq!(r.width(), 100.0);
        assert_eq!(r.height(), 50.0);
    }

    #[test]
    fn edge_gap_right() {
        let a = Rect::new(Point::new(100.0, 100.0), Point::new(50.0, 50.0));
        let b = Rect::new(Point::new(220.0, 100.0), Point::new(50.0, 50.0));
        let (delta, overlap) = a.edge_gap(&b, Direction::Right);
        assert_eq!(delta, 20.0);
        assert_eq!(overlap, 100.0);
    }

    #[test]
    fn contains_point_is_inclusive() {
        let r = Rect::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        assert!(r.contains_point(Point::new(10.0, 10.0)));
        assert!(!r.contains_point(Point::new(10.1, 0.0)));
    }
}
