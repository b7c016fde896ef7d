// Copyright 2025 the Areo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Analytic trapezoid/pixel coverage.

use crate::flatten::Point;
use crate::strip::{Line, intersect};

/// A region bounded by two horizontal lines and two lines parametric in y.
///
/// ```text
///    y1    --------
///         /       /
///        /       /
///       /       /
///    y0 --------
///      x0 x1   x2 x3
/// ```
///
/// `x0`/`x1` are the left boundary's x at `y0`/`y1`, `x2`/`x3` the right
/// boundary's. [`Trapezoid::normalized`] reorders each pair so that
/// `x0 <= x1` and `x2 <= x3`, the form [`Trapezoid::pixel_coverage`]
/// expects.
#[derive(Clone, Copy, Debug)]
pub struct Trapezoid {
    pub y0: f32,
    pub y1: f32,
    pub x0: f32,
    pub x1: f32,
    pub x2: f32,
    pub x3: f32,
}

impl Trapezoid {
    /// The trapezoid between two boundary lines over `[y0, y1]`.
    pub fn between(y0: f32, y1: f32, left: Line, right: Line) -> Self {
        Self {
            y0,
            y1,
            x0: left.x_at(y0),
            x1: left.x_at(y1),
            x2: right.x_at(y0),
            x3: right.x_at(y1),
        }
    }

    const fn new(y0: f32, y1: f32, x0: f32, x1: f32, x2: f32, x3: f32) -> Self {
        Self {
            y0,
            y1,
            x0,
            x1,
            x2,
            x3,
        }
    }

    /// The signed area.
    pub fn area(&self) -> f32 {
        (self.y1 - self.y0) * (self.x2 + self.x3 - self.x0 - self.x1) * 0.5
    }

    /// Reorder the boundary x pairs so each is ascending.
    pub fn normalized(mut self) -> Self {
        if self.x0 > self.x1 {
            core::mem::swap(&mut self.x0, &mut self.x1);
        }
        if self.x2 > self.x3 {
            core::mem::swap(&mut self.x2, &mut self.x3);
        }
        self
    }

    /// The exact area of the intersection of this trapezoid with the pixel
    /// column `[x, x + 1]`, assuming the trapezoid is normalized and spans
    /// no more than one pixel row in y.
    ///
    /// Starts from the full column height (the area when the column lies
    /// strictly between the boundary lines) and subtracts the slivers cut
    /// off by the left and right boundaries where the assumption fails.
    /// Each sliver is itself a trapezoid, possibly split at the
    /// intersection of a boundary line with a vertical pixel edge.
    ///
    /// The column must intersect the trapezoid's x range: `x + 1 > x0` and
    /// `x < x3`. The sliver construction extrapolates boundary lines from
    /// the column edges, which is only meaningful there; the rasterizer's
    /// column loop (`crate::strip`) never leaves that range.
    pub fn pixel_coverage(&self, x: f32) -> f32 {
        let Self {
            y0,
            y1,
            x0,
            x1,
            x2,
            x3,
        } = *self;
        let x4 = x;
        let x5 = x + 1.;

        // Area assuming x4 >= x1 && x5 <= x2.
        let mut area = y1 - y0;

        // Correct at the left boundary.
        if x4 < x1 {
            let l0 = Line::through(Point::new(x0, y0), Point::new(x1, y1));
            if x4 < x0 {
                area -= Trapezoid::new(y0, y1, x4, x4, x0, x1).area();
            } else {
                let iy = intersect(l0, Line::vertical(x4));
                area -= Trapezoid::new(iy, y1, x4, x4, x4, x1).area();
            }
            if x5 < x1 {
                let iy = intersect(l0, Line::vertical(x5));
                area += Trapezoid::new(iy, y1, x5, x5, x5, x1).area();
            }
        }
        // And mirror it at the right boundary.
        if x5 > x2 {
            let l1 = Line::through(Point::new(x2, y0), Point::new(x3, y1));
            if x5 > x3 {
                area -= Trapezoid::new(y0, y1, x2, x3, x5, x5).area();
            } else {
                let iy = intersect(l1, Line::vertical(x5));
                area -= Trapezoid::new(y0, iy, x2, x5, x5, x5).area();
            }
            if x4 > x2 {
                let iy = intersect(l1, Line::vertical(x4));
                area += Trapezoid::new(y0, iy, x2, x4, x4, x4).area();
            }
        }

        area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trapezoid(y0: f32, y1: f32, x0: f32, x1: f32, x2: f32, x3: f32) -> Trapezoid {
        Trapezoid::new(y0, y1, x0, x1, x2, x3).normalized()
    }

    /// Column-by-column coverage over the valid column range must tile the
    /// trapezoid's total area.
    fn assert_tiles(t: Trapezoid) {
        let mut sum = 0.;
        let mut x = t.x0.floor();
        while x < t.x3 {
            let coverage = t.pixel_coverage(x);
            assert!(
                (-1e-5..=1. + 1e-5).contains(&coverage),
                "coverage {coverage} at column {x}"
            );
            sum += coverage;
            x += 1.;
        }
        assert!(
            (sum - t.area()).abs() < 1e-4,
            "tiled {sum}, area {}",
            t.area()
        );
    }

    #[test]
    fn full_column_inside() {
        let t = trapezoid(0., 1., 0., 0., 10., 10.);
        assert_eq!(t.pixel_coverage(4.), 1.);
    }

    #[test]
    fn half_covered_boundary_columns() {
        // An axis-aligned band from x = 2.5 to x = 7.5.
        let t = trapezoid(0., 1., 2.5, 2.5, 7.5, 7.5);
        assert!((t.pixel_coverage(2.) - 0.5).abs() < 1e-6);
        assert!((t.pixel_coverage(7.) - 0.5).abs() < 1e-6);
        assert_eq!(t.pixel_coverage(4.), 1.);
        assert_tiles(t);
    }

    #[test]
    fn slanted_boundaries_tile() {
        assert_tiles(trapezoid(0., 1., 0.3, 2.7, 5.1, 9.9));
        assert_tiles(trapezoid(0.25, 0.75, -1.5, 3.5, 4.0, 4.0));
        assert_tiles(trapezoid(3.0, 3.5, 0.0, 0.5, 0.25, 8.25));
    }

    #[test]
    fn narrow_trapezoid_inside_one_column() {
        let t = trapezoid(0., 1., 4.25, 4.25, 4.75, 4.75);
        assert!((t.pixel_coverage(4.) - 0.5).abs() < 1e-6);
        assert_tiles(t);
    }

    #[test]
    fn triangle_corner_coverage() {
        // Degenerate trapezoid: a triangle with vertices (0,0), (2,0), (0,2)
        // restricted to the first row; left boundary x = 0, right boundary
        // the hypotenuse from (2,0) to (0,2).
        let left = Line::vertical(0.);
        let right = Line::through(Point::new(2., 0.), Point::new(0., 2.));
        let t = Trapezoid::between(0., 1., left, right).normalized();
        // Row area is 1.5, split 1.0 in column 0 and 0.5 in column 1.
        assert!((t.pixel_coverage(0.) - 1.0).abs() < 1e-6);
        assert!((t.pixel_coverage(1.) - 0.5).abs() < 1e-6);
        assert_tiles(t);
    }
}
