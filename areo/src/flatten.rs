// Copyright 2025 the Areo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flattening filled and stroked paths into line segments.
//!
//! All curves are reduced to straight lines here, in device space, so the
//! rasterizer only ever sees line segments. Cubics are subdivided until the
//! control points sit close enough to the chord; quadratics are raised to
//! cubics first. Elliptic arcs never reach this module: they are lowered to
//! cubics at path-building time (see [`crate::path`]).

use crate::kurbo::{Affine, PathEl};
use log::warn;

/// Flattening tolerance, in device pixels.
pub const TOLERANCE: f32 = 0.1;

const TOLERANCE_2: f32 = TOLERANCE * TOLERANCE;

/// Subdivision cutoff. Each level shrinks the error estimate by roughly 8x,
/// so this is never reached for finite inputs.
const MAX_DEPTH: u8 = 24;

/// A point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    /// The x coordinate of the point.
    pub x: f32,
    /// The y coordinate of the point.
    pub y: f32,
}

impl Point {
    /// The point `(0, 0)`.
    pub const ZERO: Self = Self::new(0., 0.);

    /// Create a new point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Dot product of the point with another, both taken as vectors.
    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// Squared length of the point taken as a vector.
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    fn is_nan(self) -> bool {
        self.x.is_nan() || self.y.is_nan()
    }
}

impl core::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl core::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl core::ops::Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// A line.
#[derive(Clone, Copy, Debug)]
pub struct Line {
    /// The start point of the line.
    pub p0: Point,
    /// The end point of the line.
    pub p1: Point,
}

impl Line {
    /// Create a new line.
    pub fn new(p0: Point, p1: Point) -> Self {
        Self { p0, p1 }
    }
}

/// Flatten a filled bezier path into line segments.
///
/// Every subpath is closed for filling: a closing segment back to the
/// subpath's start is emitted whether or not the path contains an explicit
/// close element.
pub fn fill(path: impl IntoIterator<Item = PathEl>, affine: Affine, line_buf: &mut Vec<Line>) {
    line_buf.clear();

    let mut flattener = Flattener::new(line_buf);
    for el in path {
        flattener.element(affine * el);
    }
    flattener.finish();

    // A path that contains NaN is ill-defined, so ignore it.
    if flattener.is_nan {
        warn!("A path contains NaN, ignoring it.");

        line_buf.clear();
    }
}

/// Flatten a stroked bezier path into line segments.
///
/// The stroke is expanded to a fill outline by offsetting each flattened
/// segment by half the width along its normal. Consecutive offset segments
/// are joined by straight connectors; there is no join or cap geometry, so
/// ends are butt ends. Closed subpaths produce two opposite-winding rings
/// whose fill is the stroked annulus. The width is measured in device
/// pixels; callers that want a user-space width scale it by the transform
/// before calling (see [`crate::scene::Scene::stroke_path`]).
pub fn stroke(
    path: impl IntoIterator<Item = PathEl>,
    width: f32,
    affine: Affine,
    line_buf: &mut Vec<Line>,
) {
    line_buf.clear();

    let mut collector = SubpathCollector::default();
    for el in path {
        collector.element(affine * el);
    }

    if collector.is_nan {
        warn!("A path contains NaN, ignoring it.");
        return;
    }

    let radius = width * 0.5;
    for subpath in &collector.subpaths {
        outline_subpath(subpath, radius, line_buf);
    }
}

/// Incremental path-element flattener emitting fill segments.
struct Flattener<'a> {
    line_buf: &'a mut Vec<Line>,
    start: Point,
    p0: Point,
    open: bool,
    is_nan: bool,
}

impl<'a> Flattener<'a> {
    fn new(line_buf: &'a mut Vec<Line>) -> Self {
        Self {
            line_buf,
            start: Point::ZERO,
            p0: Point::ZERO,
            open: false,
            is_nan: false,
        }
    }

    fn element(&mut self, el: PathEl) {
        match el {
            PathEl::MoveTo(p) => {
                self.close_subpath();
                let p = to_f32(p);
                self.is_nan |= p.is_nan();
                self.start = p;
                self.p0 = p;
                self.open = true;
            }
            PathEl::LineTo(p) => {
                self.open_at_current();
                let p = to_f32(p);
                self.is_nan |= p.is_nan();
                self.line_buf.push(Line::new(self.p0, p));
                self.p0 = p;
            }
            PathEl::QuadTo(p1, p2) => {
                self.open_at_current();
                let (p1, p2) = (to_f32(p1), to_f32(p2));
                self.is_nan |= p1.is_nan() || p2.is_nan();
                let (c1, c2) = quad_to_cubic(self.p0, p1, p2);
                flatten_cubic(self.p0, c1, c2, p2, 0, self.line_buf);
                self.p0 = p2;
            }
            PathEl::CurveTo(p1, p2, p3) => {
                self.open_at_current();
                let (p1, p2, p3) = (to_f32(p1), to_f32(p2), to_f32(p3));
                self.is_nan |= p1.is_nan() || p2.is_nan() || p3.is_nan();
                flatten_cubic(self.p0, p1, p2, p3, 0, self.line_buf);
                self.p0 = p3;
            }
            PathEl::ClosePath => {
                self.close_subpath();
            }
        }
    }

    fn close_subpath(&mut self) {
        if self.open {
            self.line_buf.push(Line::new(self.p0, self.start));
            self.p0 = self.start;
            self.open = false;
        }
    }

    /// Drawing without a preceding move opens a subpath at the current
    /// point, so the implicit fill-closing segment still has an anchor.
    fn open_at_current(&mut self) {
        if !self.open {
            self.start = self.p0;
            self.open = true;
        }
    }

    fn finish(&mut self) {
        self.close_subpath();
    }
}

/// Collects flattened subpaths as point chains, for stroke expansion.
#[derive(Default)]
struct SubpathCollector {
    subpaths: Vec<Subpath>,
    is_nan: bool,
}

struct Subpath {
    points: Vec<Point>,
    closed: bool,
}

impl SubpathCollector {
    fn current(&mut self) -> &mut Subpath {
        if self.subpaths.is_empty() {
            self.subpaths.push(Subpath {
                points: vec![Point::ZERO],
                closed: false,
            });
        }
        self.subpaths.last_mut().unwrap()
    }

    fn element(&mut self, el: PathEl) {
        match el {
            PathEl::MoveTo(p) => {
                let p = to_f32(p);
                self.is_nan |= p.is_nan();
                self.subpaths.push(Subpath {
                    points: vec![p],
                    closed: false,
                });
            }
            PathEl::LineTo(p) => {
                let p = to_f32(p);
                self.is_nan |= p.is_nan();
                self.current().points.push(p);
            }
            PathEl::QuadTo(p1, p2) => {
                let (p1, p2) = (to_f32(p1), to_f32(p2));
                self.is_nan |= p1.is_nan() || p2.is_nan();
                let subpath = self.current();
                let p0 = *subpath.points.last().unwrap();
                let (c1, c2) = quad_to_cubic(p0, p1, p2);
                flatten_cubic_points(p0, c1, c2, p2, &mut subpath.points);
            }
            PathEl::CurveTo(p1, p2, p3) => {
                let (p1, p2, p3) = (to_f32(p1), to_f32(p2), to_f32(p3));
                self.is_nan |= p1.is_nan() || p2.is_nan() || p3.is_nan();
                let subpath = self.current();
                let p0 = *subpath.points.last().unwrap();
                flatten_cubic_points(p0, p1, p2, p3, &mut subpath.points);
            }
            PathEl::ClosePath => {
                self.current().closed = true;
            }
        }
    }
}

fn to_f32(p: crate::kurbo::Point) -> Point {
    Point::new(p.x as f32, p.y as f32)
}

/// Raise a quadratic to a cubic with the same image.
fn quad_to_cubic(p0: Point, p1: Point, p2: Point) -> (Point, Point) {
    let c1 = (p0 + p1 * 2.) * (1. / 3.);
    let c2 = (p1 * 2. + p2) * (1. / 3.);
    (c1, c2)
}

/// Squared flattening error of a cubic.
///
/// `e1` and `e2` are the control point offsets with their projection on the
/// chord removed, so the estimate is the larger rejection scaled by the
/// chord length. Zero for collinear control points, which makes straight
/// cubics flatten to a single segment.
fn cubic_error_squared(p0: Point, p1: Point, p2: Point, p3: Point) -> f32 {
    let d = p3 - p0;
    let dd = d.length_squared();
    let e1 = p1 - p0;
    let e2 = p2 - p0;
    if dd <= f32::EPSILON {
        // Degenerate chord; fall back to the raw control point offsets so
        // looping cubics still subdivide.
        return e1.length_squared().max(e2.length_squared());
    }
    let r1 = e1 - d * (e1.dot(d) / dd);
    let r2 = e2 - d * (e2.dot(d) / dd);
    r1.length_squared().max(r2.length_squared()) * dd
}

fn flatten_cubic(p0: Point, p1: Point, p2: Point, p3: Point, depth: u8, line_buf: &mut Vec<Line>) {
    if depth >= MAX_DEPTH || cubic_error_squared(p0, p1, p2, p3) < TOLERANCE_2 {
        line_buf.push(Line::new(p0, p3));
        return;
    }
    let (a, b) = subdivide(p0, p1, p2, p3);
    flatten_cubic(a.0, a.1, a.2, a.3, depth + 1, line_buf);
    flatten_cubic(b.0, b.1, b.2, b.3, depth + 1, line_buf);
}

fn flatten_cubic_points(p0: Point, p1: Point, p2: Point, p3: Point, points: &mut Vec<Point>) {
    fn rec(p0: Point, p1: Point, p2: Point, p3: Point, depth: u8, points: &mut Vec<Point>) {
        if depth >= MAX_DEPTH || cubic_error_squared(p0, p1, p2, p3) < TOLERANCE_2 {
            points.push(p3);
            return;
        }
        let (a, b) = subdivide(p0, p1, p2, p3);
        rec(a.0, a.1, a.2, a.3, depth + 1, points);
        rec(b.0, b.1, b.2, b.3, depth + 1, points);
    }
    rec(p0, p1, p2, p3, 0, points);
}

type Cubic = (Point, Point, Point, Point);

/// De Casteljau subdivision at `t = 1/2`.
fn subdivide(p0: Point, p1: Point, p2: Point, p3: Point) -> (Cubic, Cubic) {
    let q0 = (p0 + p1) * 0.5;
    let q1 = (p1 + p2) * 0.5;
    let q2 = (p2 + p3) * 0.5;
    let r0 = (q0 + q1) * 0.5;
    let r1 = (q1 + q2) * 0.5;
    let s = (r0 + r1) * 0.5;
    ((p0, q0, r0, s), (s, r1, q2, p3))
}

/// Emit the stroke outline of one flattened subpath.
fn outline_subpath(subpath: &Subpath, radius: f32, line_buf: &mut Vec<Line>) {
    // Zero-length segments contribute no direction and are dropped.
    let mut points: Vec<Point> = Vec::with_capacity(subpath.points.len());
    for &p in &subpath.points {
        if points.last().is_none_or(|&q| (p - q).length_squared() > 0.) {
            points.push(p);
        }
    }
    if subpath.closed && points.len() > 1 {
        let (first, last) = (points[0], *points.last().unwrap());
        if (first - last).length_squared() == 0. {
            points.pop();
        }
    }
    if points.len() < 2 {
        return;
    }

    if subpath.closed {
        // Two opposite-winding rings; their fill is the stroked annulus.
        emit_offset_ring(&points, radius, line_buf);
        let reversed: Vec<Point> = points.iter().rev().copied().collect();
        emit_offset_ring(&reversed, radius, line_buf);
    } else {
        // Forward side, then the reverse side with the normal still on the
        // left, forming a single closed outline with butt ends.
        let mut ring: Vec<Point> = Vec::with_capacity(points.len() * 4);
        push_offsets(&points, radius, &mut ring);
        let reversed: Vec<Point> = points.iter().rev().copied().collect();
        push_offsets(&reversed, radius, &mut ring);
        emit_ring(&ring, line_buf);
    }
}

/// Offset each segment of `points` by `radius` along its left normal and
/// append both offset endpoints to `ring`.
fn push_offsets(points: &[Point], radius: f32, ring: &mut Vec<Point>) {
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let d = b - a;
        let len = d.length_squared().sqrt();
        let n = Point::new(d.y / len, -d.x / len) * radius;
        ring.push(a + n);
        ring.push(b + n);
    }
}

fn emit_offset_ring(points: &[Point], radius: f32, line_buf: &mut Vec<Line>) {
    let mut ring: Vec<Point> = Vec::with_capacity(points.len() * 2 + 2);
    push_offsets(points, radius, &mut ring);
    // The closing segment from the last point back to the first.
    push_offsets(&[*points.last().unwrap(), points[0]], radius, &mut ring);
    emit_ring(&ring, line_buf);
}

fn emit_ring(ring: &[Point], line_buf: &mut Vec<Line>) {
    if ring.len() < 2 {
        return;
    }
    for pair in ring.windows(2) {
        line_buf.push(Line::new(pair[0], pair[1]));
    }
    line_buf.push(Line::new(*ring.last().unwrap(), ring[0]));
}
