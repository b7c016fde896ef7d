// Copyright 2025 the Areo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An SVG front end for the [`areo`] renderer.
//!
//! [`parse`] reads an SVG document and assembles an [`areo::Scene`] ready
//! for rendering. The supported subset covers paths with the full path-data
//! grammar, the basic shapes, groups with transforms and inherited
//! presentation attributes, and solid or gradient paints:
//!
//! ```
//! let scene = areo_svg::parse(
//!     r##"<svg width="4" height="4"><rect width="4" height="4" fill="red"/></svg>"##,
//! )
//! .unwrap();
//! let pixmap = scene.render();
//! assert_eq!(pixmap.sample(1, 1).components, [1.0, 0.0, 0.0, 1.0]);
//! ```
//!
//! Unsupported constructs (text, images, filters, clipping) are skipped
//! with a warning rather than failing the parse.

#![forbid(unsafe_code)]

mod gradient;
mod path_data;
mod transform;

pub use path_data::parse_path_data;
pub use transform::parse_transform;

use areo::Scene;
use areo::color::{AlphaColor, DynamicColor, Srgb, palette::css};
use areo::kurbo::{Affine, BezPath, Circle, Ellipse, Point, Rect, RoundedRect, Shape as _};
use areo::paint::PaintType;
use areo::scene::Style;
use gradient::{GradientStore, parse_length, parse_number};
use log::warn;
use roxmltree::{Document, Node};
use thiserror::Error as ThisError;

/// Errors surfaced while reading an SVG document.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The document is not well-formed XML.
    #[error("invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),
    /// The root element is not `<svg>`.
    #[error("the document has no <svg> root element")]
    NotSvg,
    /// Malformed path data.
    #[error("malformed path data at byte {offset}: {message}")]
    PathData {
        /// What was expected.
        message: String,
        /// Byte offset into the `d` attribute.
        offset: usize,
    },
    /// A malformed transform list.
    #[error("malformed transform near '{context}': {message}")]
    Transform {
        /// What was expected.
        message: String,
        /// The offending input fragment.
        context: String,
    },
    /// A malformed numeric attribute.
    #[error("malformed number '{0}'")]
    Number(String),
}

/// The viewport lengths percentage units resolve against.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// The reference length for radii, per the SVG percentage rules.
    pub fn normalized_diagonal(self) -> f64 {
        ((self.width * self.width + self.height * self.height) * 0.5).sqrt()
    }
}

/// Parse an SVG document into a renderable scene.
pub fn parse(text: &str) -> Result<Scene, Error> {
    let doc = Document::parse(text)?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(Error::NotSvg);
    }

    let view_box = parse_view_box(&root)?;
    let width = size_attribute(&root, "width")?
        .or(view_box.map(|vb| vb.width()))
        .unwrap_or(300.0);
    let height = size_attribute(&root, "height")?
        .or(view_box.map(|vb| vb.height()))
        .unwrap_or(150.0);

    // The root transform maps viewBox coordinates onto the canvas.
    let root_transform = match view_box {
        Some(vb) if vb.width() > 0.0 && vb.height() > 0.0 => {
            Affine::scale_non_uniform(width / vb.width(), height / vb.height())
                * Affine::translate((-vb.x0, -vb.y0))
        }
        _ => Affine::IDENTITY,
    };

    let viewport = match view_box {
        Some(vb) => Viewport {
            width: vb.width(),
            height: vb.height(),
        },
        None => Viewport { width, height },
    };

    let gradients = GradientStore::collect(&doc, viewport)?;
    let mut scene = Scene::new(
        width.round().clamp(0.0, f64::from(u16::MAX)) as u16,
        height.round().clamp(0.0, f64::from(u16::MAX)) as u16,
    );

    let properties = Properties::default();
    for child in root.children() {
        walk(&child, root_transform, &properties, &gradients, &mut scene)?;
    }
    Ok(scene)
}

/// Inheritable presentation state, accumulated down the element tree.
#[derive(Clone)]
struct Properties {
    fill: PaintRef,
    stroke: PaintRef,
    fill_opacity: f32,
    stroke_opacity: f32,
    /// Product of ancestor `opacity` attributes.
    opacity: f32,
    stroke_width: f64,
}

#[derive(Clone)]
enum PaintRef {
    None,
    Color(AlphaColor<Srgb>),
    Reference(String),
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            fill: PaintRef::Color(css::BLACK),
            stroke: PaintRef::None,
            fill_opacity: 1.0,
            stroke_opacity: 1.0,
            opacity: 1.0,
            stroke_width: 1.0,
        }
    }
}

impl Properties {
    /// The properties in effect at `node`, given the inherited ones.
    fn apply(&self, node: &Node<'_, '_>) -> Result<Self, Error> {
        let mut properties = self.clone();
        if let Some(fill) = node.attribute("fill") {
            properties.fill = parse_paint_ref(fill);
        }
        if let Some(stroke) = node.attribute("stroke") {
            properties.stroke = parse_paint_ref(stroke);
        }
        if let Some(text) = node.attribute("fill-opacity") {
            properties.fill_opacity = parse_opacity(text);
        }
        if let Some(text) = node.attribute("stroke-opacity") {
            properties.stroke_opacity = parse_opacity(text);
        }
        if let Some(text) = node.attribute("opacity") {
            properties.opacity *= parse_opacity(text);
        }
        if let Some(text) = node.attribute("stroke-width") {
            properties.stroke_width = parse_length(text, 1.0)?;
        }
        Ok(properties)
    }

    fn style(&self, gradients: &GradientStore) -> Style {
        Style {
            fill: resolve_paint_ref(&self.fill, gradients),
            fill_opacity: self.fill_opacity * self.opacity,
            stroke: resolve_paint_ref(&self.stroke, gradients),
            stroke_opacity: self.stroke_opacity * self.opacity,
            stroke_width: self.stroke_width,
        }
    }
}

fn walk(
    node: &Node<'_, '_>,
    transform: Affine,
    inherited: &Properties,
    gradients: &GradientStore,
    scene: &mut Scene,
) -> Result<(), Error> {
    if !node.is_element() {
        return Ok(());
    }
    let properties = inherited.apply(node)?;
    let transform = match node.attribute("transform") {
        Some(text) => transform * parse_transform(text)?,
        None => transform,
    };

    match node.tag_name().name() {
        "g" => {
            for child in node.children() {
                walk(&child, transform, &properties, gradients, scene)?;
            }
        }
        "path" => {
            if let Some(data) = node.attribute("d") {
                let path = parse_path_data(data)?;
                scene.draw(&path, &properties.style(gradients), transform);
            }
        }
        "rect" => {
            if let Some(path) = rect_path(node)? {
                scene.draw(&path, &properties.style(gradients), transform);
            }
        }
        "circle" => {
            let cx = number_attribute(node, "cx", 0.0)?;
            let cy = number_attribute(node, "cy", 0.0)?;
            let r = number_attribute(node, "r", 0.0)?;
            if r > 0.0 {
                let path = Circle::new((cx, cy), r).to_path(SHAPE_TOLERANCE);
                scene.draw(&path, &properties.style(gradients), transform);
            }
        }
        "ellipse" => {
            let cx = number_attribute(node, "cx", 0.0)?;
            let cy = number_attribute(node, "cy", 0.0)?;
            let rx = number_attribute(node, "rx", 0.0)?;
            let ry = number_attribute(node, "ry", 0.0)?;
            if rx > 0.0 && ry > 0.0 {
                let path = Ellipse::new((cx, cy), (rx, ry), 0.0).to_path(SHAPE_TOLERANCE);
                scene.draw(&path, &properties.style(gradients), transform);
            }
        }
        "line" => {
            let mut path = BezPath::new();
            path.move_to(Point::new(
                number_attribute(node, "x1", 0.0)?,
                number_attribute(node, "y1", 0.0)?,
            ));
            path.line_to(Point::new(
                number_attribute(node, "x2", 0.0)?,
                number_attribute(node, "y2", 0.0)?,
            ));
            // A line has no interior; only its stroke renders.
            let style = Style {
                fill: None,
                ..properties.style(gradients)
            };
            scene.draw(&path, &style, transform);
        }
        "polyline" | "polygon" => {
            if let Some(points) = node.attribute("points") {
                let close = node.tag_name().name() == "polygon";
                if let Some(path) = points_path(points, close)? {
                    scene.draw(&path, &properties.style(gradients), transform);
                }
            }
        }
        // Definitions and metadata render nothing themselves.
        "defs" | "linearGradient" | "radialGradient" | "stop" | "title" | "desc"
        | "metadata" => {}
        other => {
            warn!("unhandled element <{other}>");
        }
    }
    Ok(())
}

const SHAPE_TOLERANCE: f64 = 0.01;

fn rect_path(node: &Node<'_, '_>) -> Result<Option<BezPath>, Error> {
    let x = number_attribute(node, "x", 0.0)?;
    let y = number_attribute(node, "y", 0.0)?;
    let width = number_attribute(node, "width", 0.0)?;
    let height = number_attribute(node, "height", 0.0)?;
    if width <= 0.0 || height <= 0.0 {
        return Ok(None);
    }
    let rx = match node.attribute("rx").or_else(|| node.attribute("ry")) {
        Some(text) => parse_number(text)?.clamp(0.0, width.min(height) * 0.5),
        None => 0.0,
    };
    let rect = Rect::new(x, y, x + width, y + height);
    let path = if rx > 0.0 {
        RoundedRect::from_rect(rect, rx).to_path(SHAPE_TOLERANCE)
    } else {
        rect.to_path(SHAPE_TOLERANCE)
    };
    Ok(Some(path))
}

fn points_path(text: &str, close: bool) -> Result<Option<BezPath>, Error> {
    let coords: Vec<f64> = text
        .split([',', ' ', '\t', '\n', '\r'])
        .filter(|s| !s.is_empty())
        .map(parse_number)
        .collect::<Result<_, _>>()?;
    let mut pairs = coords.chunks_exact(2);
    let Some(first) = pairs.next() else {
        return Ok(None);
    };
    let mut path = BezPath::new();
    path.move_to(Point::new(first[0], first[1]));
    for pair in pairs {
        path.line_to(Point::new(pair[0], pair[1]));
    }
    if close {
        path.close_path();
    }
    Ok(Some(path))
}

fn parse_paint_ref(text: &str) -> PaintRef {
    let text = text.trim();
    if text == "none" {
        return PaintRef::None;
    }
    if let Some(reference) = text
        .strip_prefix("url(#")
        .and_then(|rest| rest.split(')').next())
    {
        return PaintRef::Reference(reference.trim().to_owned());
    }
    PaintRef::Color(parse_color_attribute(text))
}

fn resolve_paint_ref(paint: &PaintRef, gradients: &GradientStore) -> Option<PaintType> {
    match paint {
        PaintRef::None => None,
        PaintRef::Color(color) => Some(PaintType::Solid(*color)),
        PaintRef::Reference(id) => {
            let resolved = gradients.resolve(id);
            if resolved.is_none() {
                warn!("reference to unknown paint server '{id}'");
            }
            resolved
        }
    }
}

pub(crate) fn parse_color_attribute(text: &str) -> AlphaColor<Srgb> {
    areo::color::parse_color(text.trim())
        .map(DynamicColor::to_alpha_color)
        .unwrap_or_else(|_| {
            warn!("could not parse color '{text}'");
            css::FUCHSIA.with_alpha(0.5)
        })
}

fn parse_opacity(text: &str) -> f32 {
    let text = text.trim();
    let value: f32 = if let Some(percentage) = text.strip_suffix('%') {
        percentage.trim().parse().unwrap_or(100.0) / 100.0
    } else {
        text.parse().unwrap_or(1.0)
    };
    value.clamp(0.0, 1.0)
}

fn parse_view_box(root: &Node<'_, '_>) -> Result<Option<Rect>, Error> {
    let Some(text) = root.attribute("viewBox") else {
        return Ok(None);
    };
    let values: Vec<f64> = text
        .split([',', ' ', '\t', '\n', '\r'])
        .filter(|s| !s.is_empty())
        .map(parse_number)
        .collect::<Result<_, _>>()?;
    let &[x, y, width, height] = values.as_slice() else {
        return Err(Error::Number(text.chars().take(32).collect()));
    };
    Ok(Some(Rect::new(x, y, x + width, y + height)))
}

/// A plain numeric size attribute; percentages fall back to the viewBox.
fn size_attribute(root: &Node<'_, '_>, name: &str) -> Result<Option<f64>, Error> {
    match root.attribute(name) {
        Some(text) if text.trim().ends_with('%') => Ok(None),
        Some(text) => parse_length(text, 0.0).map(Some),
        None => Ok(None),
    }
}

fn number_attribute(node: &Node<'_, '_>, name: &str, default: f64) -> Result<f64, Error> {
    match node.attribute(name) {
        Some(text) => parse_number(text),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_fill() {
        let scene = parse(
            r##"<svg width="4" height="4">
                <rect x="0" y="0" width="4" height="4" fill="blue"/>
            </svg>"##,
        )
        .unwrap();
        assert_eq!(scene.width(), 4);
        assert_eq!(scene.height(), 4);
        let pixmap = scene.render();
        assert_eq!(pixmap.sample(2, 2).components, [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn default_fill_is_black() {
        let scene = parse(
            r##"<svg width="4" height="4"><rect width="4" height="4"/></svg>"##,
        )
        .unwrap();
        let pixmap = scene.render();
        assert_eq!(pixmap.sample(1, 1).components, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn fill_none_renders_nothing() {
        let scene = parse(
            r##"<svg width="4" height="4"><rect width="4" height="4" fill="none"/></svg>"##,
        )
        .unwrap();
        let pixmap = scene.render();
        assert_eq!(pixmap.sample(1, 1).components, [0.0; 4]);
    }

    #[test]
    fn group_transform_applies() {
        let scene = parse(
            r##"<svg width="8" height="8">
                <g transform="translate(4, 0)">
                    <rect width="4" height="8" fill="red"/>
                </g>
            </svg>"##,
        )
        .unwrap();
        let pixmap = scene.render();
        assert_eq!(pixmap.sample(1, 4).components, [0.0; 4]);
        assert_eq!(pixmap.sample(6, 4).components, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn view_box_scales_to_canvas() {
        let scene = parse(
            r##"<svg width="10" height="10" viewBox="0 0 1 1">
                <rect width="1" height="1" fill="green"/>
            </svg>"##,
        )
        .unwrap();
        let pixmap = scene.render();
        // #008000 green fills the whole canvas after viewBox scaling.
        let c = pixmap.sample(9, 9).components;
        assert!(c[3] > 0.999 && c[1] > 0.4 && c[1] < 0.6);
    }

    #[test]
    fn path_element_renders() {
        let scene = parse(
            r##"<svg width="4" height="4">
                <path d="M0 0 H4 V4 H0 Z" fill="white"/>
            </svg>"##,
        )
        .unwrap();
        let pixmap = scene.render();
        assert_eq!(pixmap.sample(2, 2).components, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn opacity_compounds_through_groups() {
        let scene = parse(
            r##"<svg width="4" height="4">
                <g opacity="0.5">
                    <rect width="4" height="4" fill="red" fill-opacity="0.5"/>
                </g>
            </svg>"##,
        )
        .unwrap();
        let pixmap = scene.render();
        let c = pixmap.sample(2, 2).components;
        assert!((c[3] - 0.25).abs() < 1e-4, "{c:?}");
    }

    #[test]
    fn linear_gradient_reference() {
        let scene = parse(
            r##"<svg width="10" height="10">
                <defs>
                    <linearGradient id="fade" gradientUnits="userSpaceOnUse"
                        x1="0" y1="0" x2="10" y2="0">
                        <stop offset="0" stop-color="black"/>
                        <stop offset="1" stop-color="white"/>
                    </linearGradient>
                </defs>
                <rect width="10" height="10" fill="url(#fade)"/>
            </svg>"##,
        )
        .unwrap();
        let pixmap = scene.render();
        let left = pixmap.sample(0, 5).components[0];
        let mid = pixmap.sample(5, 5).components[0];
        let right = pixmap.sample(9, 5).components[0];
        assert!(left < 0.1, "left {left}");
        assert!((mid - 0.55).abs() < 0.05, "mid {mid}");
        assert!(right > 0.9, "right {right}");
    }

    #[test]
    fn gradient_stop_inheritance_via_href() {
        let scene = parse(
            r##"<svg width="10" height="10">
                <linearGradient id="base">
                    <stop offset="0" stop-color="red"/>
                    <stop offset="1" stop-color="red"/>
                </linearGradient>
                <linearGradient id="derived" href="#base" gradientUnits="userSpaceOnUse"
                    x1="0" y1="0" x2="10" y2="0"/>
                <rect width="10" height="10" fill="url(#derived)"/>
            </svg>"##,
        )
        .unwrap();
        let pixmap = scene.render();
        assert_eq!(pixmap.sample(5, 5).components, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn unknown_paint_reference_renders_nothing() {
        let scene = parse(
            r##"<svg width="4" height="4">
                <rect width="4" height="4" fill="url(#missing)"/>
            </svg>"##,
        )
        .unwrap();
        let pixmap = scene.render();
        assert_eq!(pixmap.sample(2, 2).components, [0.0; 4]);
    }

    #[test]
    fn stroke_renders_outline() {
        let scene = parse(
            r##"<svg width="10" height="10">
                <line x1="0" y1="5" x2="10" y2="5" stroke="white" stroke-width="2"/>
            </svg>"##,
        )
        .unwrap();
        let pixmap = scene.render();
        assert_eq!(pixmap.sample(5, 4).components, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(pixmap.sample(5, 8).components, [0.0; 4]);
    }

    #[test]
    fn polygon_closes_itself() {
        let scene = parse(
            r##"<svg width="10" height="10">
                <polygon points="0,0 10,0 10,10 0,10" fill="red"/>
            </svg>"##,
        )
        .unwrap();
        let pixmap = scene.render();
        assert_eq!(pixmap.sample(5, 5).components, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(matches!(parse("<svg"), Err(Error::Xml(_))));
        assert!(matches!(parse("<div/>"), Err(Error::NotSvg)));
    }

    #[test]
    fn malformed_path_is_an_error() {
        let result = parse(
            r##"<svg width="4" height="4"><path d="M 1 quux" fill="red"/></svg>"##,
        );
        assert!(matches!(result, Err(Error::PathData { .. })));
    }
}
