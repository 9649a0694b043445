// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Snapping policies that derive visual positions from intended positions.

use core::fmt::Debug;

use kurbo::Point;

/// Maps an intended position to the position that is displayed.
pub trait SnapPolicy: Debug {
    /// Snap `point`.
    fn snap(&self, point: Point) -> Point;
}

/// Identity policy: the visual position is the intended position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NoSnap;

impl SnapPolicy for NoSnap {
    fn snap(&self, point: Point) -> Point {
        point
    }
}

/// Round both coordinates to the nearest multiple of `spacing`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSnap {
    /// Grid spacing in world units. Non-positive spacing disables snapping.
    pub spacing: f64,
}

impl GridSnap {
    /// Create a grid policy.
    pub fn new(spacing: f64) -> Self {
        Self { spacing }
    }
}

impl SnapPolicy for GridSnap {
    fn snap(&self, point: Point) -> Point {
        if self.spacing <= 0.0 {
            return point;
        }
        Point::new(
            (point.x / self.spacing).round() * self.spacing,
            (point.y / self.spacing).round() * self.spacing,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_rounds_to_nearest() {
        let grid = GridSnap::new(20.0);
        assert_eq!(grid.snap(Point::new(29.0, -31.0)), Point::new(20.0, -40.0));
        assert_eq!(grid.snap(Point::new(31.0, 9.0)), Point::new(40.0, 0.0));
        assert_eq!(GridSnap::new(0.0).snap(Point::new(3.3, 4.4)), Point::new(3.3, 4.4));
        assert_eq!(NoSnap.snap(Point::new(3.3, 4.4)), Point::new(3.3, 4.4));
    }
}
