// Copyright 2025 the Areo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene assembly.
//!
//! A [`Scene`] collects shapes in paint order: the order in which paths are
//! filled or stroked is the bottom-up compositing order. Assembly follows a
//! render-context style: set the current transform, paint, stroke width and
//! opacity, then fill or stroke paths. Paints are resolved against the
//! current transform at insertion time, so later state changes don't affect
//! earlier shapes.

use crate::color::palette::css::BLACK;
use crate::flatten;
use crate::kurbo::{Affine, BezPath};
use crate::paint::{Paint, PaintType};
use crate::pixmap::Pixmap;
use crate::render;
use crate::strip::Segment;

/// A shape ready for rasterization: directed non-horizontal edges plus the
/// resolved paint.
#[derive(Debug)]
pub struct Shape {
    segments: Vec<Segment>,
    pub(crate) paint: Paint,
}

impl Shape {
    /// The shape's edges.
    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// A scene: a sized canvas and a stack of shapes in paint order.
#[derive(Debug)]
pub struct Scene {
    width: u16,
    height: u16,
    shapes: Vec<Shape>,
    transform: Affine,
    paint: PaintType,
    stroke_width: f64,
    opacity: f32,
    line_buf: Vec<flatten::Line>,
}

impl Scene {
    /// Create an empty scene with the given canvas size in pixels.
    ///
    /// The initial state is the identity transform, opaque black paint,
    /// stroke width 1 and opacity 1.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            shapes: Vec::new(),
            transform: Affine::IDENTITY,
            paint: BLACK.into(),
            stroke_width: 1.0,
            opacity: 1.0,
            line_buf: Vec::new(),
        }
    }

    /// The canvas width in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// The canvas height in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The shapes collected so far, in paint order.
    pub(crate) fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Set the current transform, applied to paths at fill/stroke time.
    pub fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    /// Reset the current transform to the identity.
    pub fn reset_transform(&mut self) {
        self.transform = Affine::IDENTITY;
    }

    /// Set the current paint.
    pub fn set_paint(&mut self, paint: impl Into<PaintType>) {
        self.paint = paint.into();
    }

    /// Set the current stroke width, in user space.
    pub fn set_stroke_width(&mut self, width: f64) {
        self.stroke_width = width;
    }

    /// Set the current opacity, folded into the paint of subsequent shapes.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Fill a path with the current paint under the current transform.
    pub fn fill_path(&mut self, path: &BezPath) {
        flatten::fill(path, self.transform, &mut self.line_buf);
        self.push_shape();
    }

    /// Stroke a path with the current paint under the current transform.
    ///
    /// The stroke width is scaled by the transform's uniform scale factor
    /// (the square root of its determinant), so anisotropic transforms
    /// stroke with an averaged width.
    pub fn stroke_path(&mut self, path: &BezPath) {
        let width = self.stroke_width * self.transform.determinant().abs().sqrt();
        flatten::stroke(path, width as f32, self.transform, &mut self.line_buf);
        self.push_shape();
    }

    /// Draw a path with a full style, as a parsed document does.
    pub fn draw(&mut self, path: &BezPath, style: &Style, transform: Affine) {
        self.set_transform(transform);
        if let Some(fill) = &style.fill {
            if style.fill_opacity > 0.0 {
                self.set_paint(fill.clone());
                self.set_opacity(style.fill_opacity);
                self.fill_path(path);
            }
        }
        if let Some(stroke) = &style.stroke {
            if style.stroke_width > 0.0 && style.stroke_opacity > 0.0 {
                self.set_paint(stroke.clone());
                self.set_opacity(style.stroke_opacity);
                self.set_stroke_width(style.stroke_width);
                self.stroke_path(path);
            }
        }
    }

    /// Rasterize the scene into an existing pixmap.
    pub fn render_to_pixmap(&self, pixmap: &mut Pixmap) {
        render::render(self, pixmap);
    }

    /// Rasterize the scene into a freshly allocated pixmap of its size.
    pub fn render(&self) -> Pixmap {
        let mut pixmap = Pixmap::new(self.width, self.height);
        self.render_to_pixmap(&mut pixmap);
        pixmap
    }

    /// Turn the flattened edges in `line_buf` into a shape. Horizontal
    /// edges contribute no coverage and are dropped here.
    fn push_shape(&mut self) {
        let segments: Vec<Segment> = self
            .line_buf
            .iter()
            .copied()
            .filter_map(Segment::from_line)
            .collect();
        if segments.is_empty() {
            return;
        }
        let paint = self.paint.clone().into_paint(self.transform, self.opacity);
        self.shapes.push(Shape { segments, paint });
    }
}

/// Fill and stroke styling for [`Scene::draw`].
#[derive(Debug, Clone)]
pub struct Style {
    /// The fill paint, if any.
    pub fill: Option<PaintType>,
    /// Fill opacity in `[0, 1]`.
    pub fill_opacity: f32,
    /// The stroke paint, if any.
    pub stroke: Option<PaintType>,
    /// Stroke opacity in `[0, 1]`.
    pub stroke_opacity: f32,
    /// Stroke width in user space.
    pub stroke_width: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: Some(BLACK.into()),
            fill_opacity: 1.0,
            stroke: None,
            stroke_opacity: 1.0,
            stroke_width: 1.0,
        }
    }
}
