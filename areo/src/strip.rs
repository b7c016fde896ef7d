// Copyright 2025 the Areo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Strip rasterization.
//!
//! A strip is a horizontal band in which the set of active edges is
//! constant and no two edges cross, so sorting the edges once by x gives
//! their left-to-right order everywhere inside the band. Walking that order
//! while accumulating per-shape winding counts yields, between every pair
//! of adjacent edges, the set of shapes covering the trapezoid they bound.
//! Each covered trapezoid is clipped against the pixel grid analytically
//! (see [`crate::trapezoid`]) and accumulated into the pixmap.

use crate::color::{PremulColor, Srgb};
use crate::flatten;
use crate::kurbo::Point;
use crate::paint::{blend, scale};
use crate::pixmap::Pixmap;
use crate::scene::Shape;
use crate::trapezoid::Trapezoid;

/// A line parametrized in y: `x(y) = m * y + x0`.
///
/// Horizontal lines have no such parametrization and are never admitted;
/// the flattener and scene assembly drop them before segments are built.
#[derive(Clone, Copy, Debug)]
pub struct Line {
    /// Inverse slope.
    pub m: f32,
    /// x at `y = 0`.
    pub x0: f32,
}

impl Line {
    /// The line through two points with distinct y coordinates.
    pub fn through(p0: flatten::Point, p1: flatten::Point) -> Self {
        let m = (p1.x - p0.x) / (p1.y - p0.y);
        Self {
            m,
            x0: p0.x - m * p0.y,
        }
    }

    /// The vertical line at `x`.
    pub fn vertical(x: f32) -> Self {
        Self { m: 0., x0: x }
    }

    /// The x coordinate at `y`.
    pub fn x_at(self, y: f32) -> f32 {
        self.m * y + self.x0
    }
}

/// The y coordinate where two lines of distinct slope intersect.
pub fn intersect(l0: Line, l1: Line) -> f32 {
    (l1.x0 - l0.x0) / (l0.m - l1.m)
}

/// A directed non-horizontal edge, normalized so `y0 < y1`.
#[derive(Clone, Copy, Debug)]
pub struct Segment {
    /// Top of the edge's y range.
    pub y0: f32,
    /// Bottom of the edge's y range.
    pub y1: f32,
    /// The carrying line.
    pub line: Line,
    /// +1 if the original edge pointed down (increasing y), -1 if up.
    pub winding: i8,
}

impl Segment {
    /// Build a segment from a flattened edge, or `None` for horizontal
    /// edges, which contribute no coverage.
    pub fn from_line(l: flatten::Line) -> Option<Self> {
        if l.p0.y == l.p1.y {
            return None;
        }
        let line = Line::through(l.p0, l.p1);
        Some(if l.p0.y < l.p1.y {
            Self {
                y0: l.p0.y,
                y1: l.p1.y,
                line,
                winding: 1,
            }
        } else {
            Self {
                y0: l.p1.y,
                y1: l.p0.y,
                line,
                winding: -1,
            }
        })
    }
}

/// An edge inside a strip, tagged with its owning shape.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StripLine {
    pub line: Line,
    pub winding: i8,
    /// Index into the scene's shape arena.
    pub shape: u32,
}

/// Per-shape winding counts, kept sorted by shape index so that blending
/// the active shapes walks them in insertion (paint) order.
#[derive(Debug, Default)]
pub(crate) struct ShapeWindings {
    entries: Vec<(u32, i32)>,
}

impl ShapeWindings {
    fn clear(&mut self) {
        self.entries.clear();
    }

    fn modify(&mut self, shape: u32, winding: i8) {
        match self.entries.binary_search_by_key(&shape, |e| e.0) {
            Ok(i) => {
                self.entries[i].1 += i32::from(winding);
                if self.entries[i].1 == 0 {
                    self.entries.remove(i);
                }
            }
            Err(i) => self.entries.insert(i, (shape, i32::from(winding))),
        }
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The shapes with non-zero winding blended bottom-up at `p`.
    fn color_at(&self, p: Point, shapes: &[Shape]) -> PremulColor<Srgb> {
        let mut color = PremulColor::new([0.0; 4]);
        for &(shape, _) in &self.entries {
            color = blend(color, shapes[shape as usize].paint.eval(p));
        }
        color
    }
}

/// Rasterize the strip `[y0, y1]` whose edges are sorted left to right.
pub(crate) fn render_strip(
    lines: &[StripLine],
    y0: f32,
    y1: f32,
    shapes: &[Shape],
    pixmap: &mut Pixmap,
    windings: &mut ShapeWindings,
) {
    let y_top = y0.max(0.);
    let y_bottom = y1.min(f32::from(pixmap.height()) - 0.5);
    let mut row = y_top as u16;
    while f32::from(row) < y_bottom {
        render_row(lines, y0, y1, row, shapes, pixmap, windings);
        row += 1;
    }
}

/// Rasterize the part of the strip intersecting pixel row `row`.
fn render_row(
    lines: &[StripLine],
    y0: f32,
    y1: f32,
    row: u16,
    shapes: &[Shape],
    pixmap: &mut Pixmap,
    windings: &mut ShapeWindings,
) {
    let row_y0 = f32::from(row).max(y0);
    let row_y1 = (f32::from(row) + 1.).min(y1);
    if row_y1 <= row_y0 {
        // A numerical sliver; it covers no area.
        return;
    }
    windings.clear();
    for i in 1..lines.len() {
        let l0 = &lines[i - 1];
        windings.modify(l0.shape, l0.winding);
        if windings.is_empty() {
            continue;
        }
        let l1 = &lines[i];
        let trapezoid = Trapezoid::between(row_y0, row_y1, l0.line, l1.line).normalized();
        let x_first = trapezoid.x0.max(0.);
        let x_last = trapezoid.x3.min(f32::from(pixmap.width()) - 0.5);
        let mut x = x_first as u16;
        while f32::from(x) < x_last {
            let coverage = trapezoid.pixel_coverage(f32::from(x));
            debug_assert!(
                (-1e-3..=1. + 1e-3).contains(&coverage),
                "pixel coverage out of range: {coverage}"
            );
            let center = Point::new(f64::from(x) + 0.5, f64::from(row) + 0.5);
            let color = windings.color_at(center, shapes);
            pixmap.add_pixel(x, row, scale(color, coverage));
            x += 1;
        }
    }
    // To the right of the rightmost edge every winding count is zero.
    #[cfg(debug_assertions)]
    if let Some(last) = lines.last() {
        windings.modify(last.shape, last.winding);
        debug_assert!(
            windings.is_empty(),
            "shape windings must cancel at the right edge of a strip"
        );
    }
}
