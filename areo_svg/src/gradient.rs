// Copyright 2025 the Areo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gradient definitions (`<linearGradient>`, `<radialGradient>`).
//!
//! Gradients are collected from the whole document up front and resolved
//! lazily when a `fill="url(#id)"` reference names them. Stops may be
//! inherited from another gradient through `href`.

use crate::{Error, Viewport, parse_color_attribute};
use areo::kurbo::{Affine, Point};
use areo::paint::{LinearGradient, PaintType, RadialGradient, Stop};
use crate::transform::parse_transform;
use log::warn;
use roxmltree::{Document, Node};
use std::collections::HashMap;

const XLINK: &str = "http://www.w3.org/1999/xlink";

/// All gradient definitions of a document, by id.
pub(crate) struct GradientStore {
    servers: HashMap<String, Server>,
}

enum Kind {
    Linear {
        start: Point,
        end: Point,
    },
    Radial {
        center: Point,
        radius: f64,
        focal: Point,
        focal_radius: f64,
    },
}

struct Server {
    kind: Kind,
    stops: Vec<Stop>,
    transform: Affine,
    href: Option<String>,
}

impl GradientStore {
    /// Collect every gradient element in the document.
    pub fn collect(doc: &Document<'_>, viewport: Viewport) -> Result<Self, Error> {
        let mut servers = HashMap::new();
        for node in doc.descendants().filter(Node::is_element) {
            let kind = match node.tag_name().name() {
                "linearGradient" => parse_linear(&node, viewport)?,
                "radialGradient" => parse_radial(&node, viewport)?,
                _ => continue,
            };
            let Some(id) = node.attribute("id") else {
                continue;
            };
            check_units(&node, id);
            if let Some(method) = node.attribute("spreadMethod") {
                if method != "pad" {
                    warn!("gradient '{id}': spreadMethod '{method}' is not supported, using pad");
                }
            }
            let transform = match node.attribute("gradientTransform") {
                Some(text) => parse_transform(text)?,
                None => Affine::IDENTITY,
            };
            let href = node
                .attribute("href")
                .or_else(|| node.attribute((XLINK, "href")))
                .and_then(|href| href.strip_prefix('#'))
                .map(str::to_owned);
            servers.insert(
                id.to_owned(),
                Server {
                    kind,
                    stops: parse_stops(&node)?,
                    transform,
                    href,
                },
            );
        }
        Ok(Self { servers })
    }

    /// Resolve a gradient id into a paint.
    pub fn resolve(&self, id: &str) -> Option<PaintType> {
        let server = self.servers.get(id)?;
        let stops = self.resolve_stops(server);
        Some(match server.kind {
            Kind::Linear { start, end } => PaintType::Linear(LinearGradient {
                start,
                end,
                stops,
                transform: server.transform,
            }),
            Kind::Radial {
                center,
                radius,
                focal,
                focal_radius,
            } => PaintType::Radial(RadialGradient {
                center,
                radius: radius as f32,
                focal,
                focal_radius: focal_radius as f32,
                stops,
                transform: server.transform,
            }),
        })
    }

    /// A gradient without stops of its own inherits them through `href`.
    fn resolve_stops(&self, server: &Server) -> Vec<Stop> {
        let mut current = server;
        for _ in 0..8 {
            if !current.stops.is_empty() {
                return current.stops.clone();
            }
            match current.href.as_deref().and_then(|id| self.servers.get(id)) {
                Some(next) => current = next,
                None => break,
            }
        }
        Vec::new()
    }
}

fn check_units(node: &Node<'_, '_>, id: &str) {
    match node.attribute("gradientUnits") {
        Some("userSpaceOnUse") => {}
        _ => {
            // The SVG default. Proper support would need the referencing
            // shape's bounding box at resolve time.
            warn!(
                "gradient '{id}': objectBoundingBox units are not implemented, \
                 coordinates are interpreted in user space"
            );
        }
    }
}

fn parse_linear(node: &Node<'_, '_>, viewport: Viewport) -> Result<Kind, Error> {
    let x1 = length_attribute(node, "x1", viewport.width, 0.0)?;
    let y1 = length_attribute(node, "y1", viewport.height, 0.0)?;
    let x2 = length_attribute(node, "x2", viewport.width, viewport.width)?;
    let y2 = length_attribute(node, "y2", viewport.height, 0.0)?;
    Ok(Kind::Linear {
        start: Point::new(x1, y1),
        end: Point::new(x2, y2),
    })
}

fn parse_radial(node: &Node<'_, '_>, viewport: Viewport) -> Result<Kind, Error> {
    let cx = length_attribute(node, "cx", viewport.width, viewport.width * 0.5)?;
    let cy = length_attribute(node, "cy", viewport.height, viewport.height * 0.5)?;
    let r = length_attribute(node, "r", viewport.normalized_diagonal(), viewport.normalized_diagonal() * 0.5)?;
    let fx = length_attribute(node, "fx", viewport.width, cx)?;
    let fy = length_attribute(node, "fy", viewport.height, cy)?;
    let fr = length_attribute(node, "fr", viewport.normalized_diagonal(), 0.0)?;
    Ok(Kind::Radial {
        center: Point::new(cx, cy),
        radius: r,
        focal: Point::new(fx, fy),
        focal_radius: fr,
    })
}

/// A coordinate attribute; percentages resolve against the given viewport
/// reference length.
fn length_attribute(
    node: &Node<'_, '_>,
    name: &str,
    reference: f64,
    default: f64,
) -> Result<f64, Error> {
    match node.attribute(name) {
        Some(text) => parse_length(text, reference),
        None => Ok(default),
    }
}

pub(crate) fn parse_length(text: &str, reference: f64) -> Result<f64, Error> {
    let text = text.trim();
    if let Some(percentage) = text.strip_suffix('%') {
        let value: f64 = parse_number(percentage)?;
        return Ok(value / 100.0 * reference);
    }
    parse_number(text.strip_suffix("px").unwrap_or(text))
}

pub(crate) fn parse_number(text: &str) -> Result<f64, Error> {
    text.trim()
        .parse()
        .map_err(|_| Error::Number(text.chars().take(32).collect()))
}

fn parse_stops(node: &Node<'_, '_>) -> Result<Vec<Stop>, Error> {
    let mut stops: Vec<Stop> = Vec::new();
    for stop in node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "stop")
    {
        let mut offset = match stop.attribute("offset") {
            Some(text) => parse_length(text, 1.0)?.clamp(0.0, 1.0) as f32,
            None => 0.0,
        };
        // Offsets are non-decreasing; out-of-order stops snap forward.
        if let Some(previous) = stops.last() {
            offset = offset.max(previous.offset);
        }
        let color = parse_color_attribute(stop.attribute("stop-color").unwrap_or("black"));
        let opacity = match stop.attribute("stop-opacity") {
            Some(text) => parse_number(text)?.clamp(0.0, 1.0) as f32,
            None => 1.0,
        };
        let mut components = color.components;
        components[3] *= opacity;
        stops.push(Stop {
            offset,
            color: areo::color::AlphaColor::new(components),
        });
    }
    Ok(stops)
}
