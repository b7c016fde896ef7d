// Copyright 2025 the Areo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path construction.
//!
//! [`PathBuilder`] wraps a [`BezPath`] with the operations a path-command
//! stream needs: the current point is tracked across subpaths, quadratics
//! and cubics append directly, and elliptic arcs in SVG endpoint
//! parameterization are lowered to cubic Bézier slices of at most a quarter
//! turn each.

use crate::kurbo::{Affine, BezPath, Point, Vec2};

/// Incrementally builds a [`BezPath`].
#[derive(Debug, Default)]
pub struct PathBuilder {
    path: BezPath,
    start: Point,
    current: Point,
    open: bool,
}

impl PathBuilder {
    /// Create an empty builder.
    ///
    /// The current point of an empty builder is `(0, 0)`.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current point: the last point of the last subpath, or the
    /// subpath's start right after a close.
    pub fn current_point(&self) -> Point {
        self.current
    }

    /// Start a new subpath at `p`.
    pub fn move_to(&mut self, p: Point) {
        self.path.move_to(p);
        self.start = p;
        self.current = p;
        self.open = true;
    }

    /// Append a line to `p`.
    pub fn line_to(&mut self, p: Point) {
        self.ensure_open();
        self.path.line_to(p);
        self.current = p;
    }

    /// Append a quadratic Bézier with control point `p1` ending at `p2`.
    pub fn quad_to(&mut self, p1: Point, p2: Point) {
        self.ensure_open();
        self.path.quad_to(p1, p2);
        self.current = p2;
    }

    /// Append a cubic Bézier with control points `p1`, `p2` ending at `p3`.
    pub fn curve_to(&mut self, p1: Point, p2: Point, p3: Point) {
        self.ensure_open();
        self.path.curve_to(p1, p2, p3);
        self.current = p3;
    }

    /// Append an elliptic arc from the current point to `end`, in SVG
    /// endpoint parameterization.
    ///
    /// `radii` are the ellipse semi-axes, `x_rotation` the axis rotation in
    /// radians. Out-of-range radii are corrected per the SVG rules: signs
    /// are dropped and too-small radii are scaled up uniformly. A zero
    /// radius degenerates to a straight line.
    pub fn arc_to(&mut self, radii: Vec2, x_rotation: f64, large_arc: bool, sweep: bool, end: Point) {
        self.ensure_open();
        let p0 = self.current;
        if p0 == end {
            return;
        }
        let mut rx = radii.x.abs();
        let mut ry = radii.y.abs();
        if rx == 0.0 || ry == 0.0 {
            self.line_to(end);
            return;
        }

        // Endpoint to center parameterization (SVG 1.1 appendix F.6.5).
        let (sin_phi, cos_phi) = x_rotation.sin_cos();
        let d = (p0 - end) * 0.5;
        let x1p = cos_phi * d.x + sin_phi * d.y;
        let y1p = -sin_phi * d.x + cos_phi * d.y;

        let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
        if lambda > 1.0 {
            let scale = lambda.sqrt();
            rx *= scale;
            ry *= scale;
        }

        let rx2 = rx * rx;
        let ry2 = ry * ry;
        let num = (rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p).max(0.0);
        let den = rx2 * y1p * y1p + ry2 * x1p * x1p;
        let mut coef = (num / den).sqrt();
        if large_arc == sweep {
            coef = -coef;
        }
        let cxp = coef * rx * y1p / ry;
        let cyp = -coef * ry * x1p / rx;

        let mid = p0.midpoint(end);
        let center = Point::new(
            cos_phi * cxp - sin_phi * cyp + mid.x,
            sin_phi * cxp + cos_phi * cyp + mid.y,
        );

        let theta1 = angle((x1p - cxp) / rx, (y1p - cyp) / ry);
        let theta2 = angle((-x1p - cxp) / rx, (-y1p - cyp) / ry);
        let mut delta = (theta2 - theta1).rem_euclid(core::f64::consts::TAU);
        if !sweep && delta > 0.0 {
            delta -= core::f64::consts::TAU;
        }

        // Slice into arcs of at most a quarter turn and approximate each
        // with one cubic, using the h = (4/3) tan(delta/4) handle length.
        let n = (delta.abs() / core::f64::consts::FRAC_PI_2).ceil().max(1.0);
        let step = delta / n;
        let h = (4.0 / 3.0) * (step / 4.0).tan();

        let ellipse_point = |theta: f64| {
            let (sin_t, cos_t) = theta.sin_cos();
            Point::new(
                center.x + rx * cos_t * cos_phi - ry * sin_t * sin_phi,
                center.y + rx * cos_t * sin_phi + ry * sin_t * cos_phi,
            )
        };
        let ellipse_derivative = |theta: f64| {
            let (sin_t, cos_t) = theta.sin_cos();
            Vec2::new(
                -rx * sin_t * cos_phi - ry * cos_t * sin_phi,
                -rx * sin_t * sin_phi + ry * cos_t * cos_phi,
            )
        };

        let mut theta = theta1;
        let mut p = ellipse_point(theta);
        for i in 0..n as usize {
            let next_theta = theta + step;
            // Land exactly on the requested endpoint.
            let next = if i + 1 == n as usize {
                end
            } else {
                ellipse_point(next_theta)
            };
            let c1 = p + ellipse_derivative(theta) * h;
            let c2 = next - ellipse_derivative(next_theta) * h;
            self.curve_to(c1, c2, next);
            theta = next_theta;
            p = next;
        }
    }

    /// Close the current subpath.
    pub fn close(&mut self) {
        if self.open {
            self.path.close_path();
            self.current = self.start;
            self.open = false;
        }
    }

    /// Whether no subpath has been started.
    pub fn is_empty(&self) -> bool {
        self.path.elements().is_empty()
    }

    /// Finish building and return the path.
    pub fn finish(self) -> BezPath {
        self.path
    }

    /// Drawing without a preceding move starts a subpath at the current
    /// point, which is `(0, 0)` for an empty path.
    fn ensure_open(&mut self) {
        if !self.open {
            self.move_to(self.current);
        }
    }
}

fn angle(x: f64, y: f64) -> f64 {
    y.atan2(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kurbo::{PathEl, Shape};

    #[test]
    fn current_point_tracking() {
        let mut b = PathBuilder::new();
        assert_eq!(b.current_point(), Point::ZERO);
        b.move_to(Point::new(1.0, 2.0));
        b.line_to(Point::new(3.0, 4.0));
        assert_eq!(b.current_point(), Point::new(3.0, 4.0));
        b.close();
        assert_eq!(b.current_point(), Point::new(1.0, 2.0));
    }

    #[test]
    fn line_without_move_starts_at_origin() {
        let mut b = PathBuilder::new();
        b.line_to(Point::new(5.0, 0.0));
        let path = b.finish();
        assert_eq!(path.elements()[0], PathEl::MoveTo(Point::ZERO));
    }

    #[test]
    fn zero_radius_arc_is_a_line() {
        let mut b = PathBuilder::new();
        b.move_to(Point::ZERO);
        b.arc_to(Vec2::new(0.0, 10.0), 0.0, false, true, Point::new(10.0, 0.0));
        let path = b.finish();
        assert_eq!(path.elements()[1], PathEl::LineTo(Point::new(10.0, 0.0)));
    }

    #[test]
    fn half_circle_arc_endpoints_and_extent() {
        let mut b = PathBuilder::new();
        b.move_to(Point::new(0.0, 0.0));
        b.arc_to(Vec2::new(5.0, 5.0), 0.0, false, true, Point::new(10.0, 0.0));
        assert_eq!(b.current_point(), Point::new(10.0, 0.0));
        let path = b.finish();
        // A half turn needs two quarter-turn cubics.
        let cubics = path
            .elements()
            .iter()
            .filter(|el| matches!(el, PathEl::CurveTo(..)))
            .count();
        assert_eq!(cubics, 2);
        // The sweep-positive arc runs clockwise over the top, reaching y = -5.
        let bbox = path.bounding_box();
        assert!((bbox.min_y() + 5.0).abs() < 0.05);
        assert!(bbox.max_y().abs() < 0.05);
    }

    #[test]
    fn small_radii_are_scaled_up() {
        let mut b = PathBuilder::new();
        b.move_to(Point::ZERO);
        // Radii too small to span the endpoints; the SVG rules scale them.
        b.arc_to(Vec2::new(1.0, 1.0), 0.0, false, true, Point::new(10.0, 0.0));
        assert_eq!(b.current_point(), Point::new(10.0, 0.0));
    }
}
