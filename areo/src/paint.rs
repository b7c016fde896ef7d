// Copyright 2025 the Areo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paints: solid colors and gradients.
//!
//! [`PaintType`] is the user-facing description a scene is assembled with.
//! At shape-insertion time it is resolved into a [`Paint`] via
//! [`PaintType::into_paint`], which bakes in the shape's user transform
//! (gradients evaluate in their defining space, so they are wrapped in the
//! inverse) and folds opacity. `Paint::eval` is pure: the color at a point
//! depends on nothing but the point.
//!
//! All evaluation produces premultiplied colors, and gradient stops are
//! interpolated on premultiplied components, which is what the blending
//! pipeline consumes.

use crate::color::{AlphaColor, PremulColor, Srgb};
use crate::kurbo::{Affine, Point, Vec2};

/// Porter-Duff "over" on premultiplied colors.
pub fn blend(dst: PremulColor<Srgb>, src: PremulColor<Srgb>) -> PremulColor<Srgb> {
    let d = dst.components;
    let s = src.components;
    let k = 1.0 - s[3];
    PremulColor::new([
        s[0] + d[0] * k,
        s[1] + d[1] * k,
        s[2] + d[2] * k,
        s[3] + d[3] * k,
    ])
}

/// Scale all components of a premultiplied color, alpha included.
pub fn scale(c: PremulColor<Srgb>, f: f32) -> PremulColor<Srgb> {
    let c = c.components;
    PremulColor::new([c[0] * f, c[1] * f, c[2] * f, c[3] * f])
}

fn transparent() -> PremulColor<Srgb> {
    PremulColor::new([0.0; 4])
}

/// A gradient color stop.
#[derive(Debug, Clone, Copy)]
pub struct Stop {
    /// The offset of the stop along the gradient axis.
    pub offset: f32,
    /// The color of the stop.
    pub color: AlphaColor<Srgb>,
}

/// A linear gradient between two points.
///
/// Offsets outside the stop range clamp to the end colors.
#[derive(Debug, Clone)]
pub struct LinearGradient {
    /// The start point, where the gradient parameter is 0.
    pub start: Point,
    /// The end point, where the gradient parameter is 1.
    pub end: Point,
    /// The color stops, ascending by offset.
    pub stops: Vec<Stop>,
    /// Transform from gradient space to user space.
    pub transform: Affine,
}

/// A radial gradient between a focal circle and an outer circle.
///
/// The gradient parameter at a point is the `t` for which the point lies on
/// the circle interpolated between the focal circle (`t = 0`) and the outer
/// circle (`t = 1`).
#[derive(Debug, Clone)]
pub struct RadialGradient {
    /// Center of the outer circle.
    pub center: Point,
    /// Radius of the outer circle.
    pub radius: f32,
    /// Center of the focal circle.
    pub focal: Point,
    /// Radius of the focal circle.
    pub focal_radius: f32,
    /// The color stops, ascending by offset.
    pub stops: Vec<Stop>,
    /// Transform from gradient space to user space.
    pub transform: Affine,
}

/// A paint description, before resolution against a user transform.
#[derive(Debug, Clone)]
pub enum PaintType {
    /// A solid color.
    Solid(AlphaColor<Srgb>),
    /// A linear gradient.
    Linear(LinearGradient),
    /// A radial gradient.
    Radial(RadialGradient),
}

impl From<AlphaColor<Srgb>> for PaintType {
    fn from(value: AlphaColor<Srgb>) -> Self {
        Self::Solid(value)
    }
}

impl From<LinearGradient> for PaintType {
    fn from(value: LinearGradient) -> Self {
        Self::Linear(value)
    }
}

impl From<RadialGradient> for PaintType {
    fn from(value: RadialGradient) -> Self {
        Self::Radial(value)
    }
}

impl PaintType {
    /// Resolve into an evaluatable [`Paint`].
    ///
    /// `transform` is the user transform active when the owning shape is
    /// inserted; gradients are wrapped in its inverse (composed with their
    /// own transform) so evaluation happens in gradient space. `opacity`
    /// multiplies the result. A non-invertible gradient transform resolves
    /// to transparent black.
    pub fn into_paint(self, transform: Affine, opacity: f32) -> Paint {
        match self {
            Self::Solid(color) => Paint::Solid(scale(color.premultiply(), opacity)),
            Self::Linear(gradient) => {
                let total = transform * gradient.transform;
                let paint = Paint::Linear(LinearPaint::new(
                    gradient.start,
                    gradient.end,
                    Ramp::new(&gradient.stops),
                ));
                wrap(paint, total, opacity)
            }
            Self::Radial(gradient) => {
                let total = transform * gradient.transform;
                let paint = Paint::Radial(RadialPaint::new(
                    gradient.center,
                    gradient.radius,
                    gradient.focal,
                    gradient.focal_radius,
                    Ramp::new(&gradient.stops),
                ));
                wrap(paint, total, opacity)
            }
        }
    }
}

/// Wrap a gradient paint in the inverse user transform and an opacity
/// wrapper where they are not identities.
fn wrap(paint: Paint, total: Affine, opacity: f32) -> Paint {
    if total.determinant().abs() < 1e-12 {
        return Paint::Solid(transparent());
    }
    let mut paint = if total == Affine::IDENTITY {
        paint
    } else {
        Paint::Transformed(Box::new(paint), total.inverse())
    };
    if opacity < 1.0 {
        paint = Paint::Opacity(Box::new(paint), opacity);
    }
    paint
}

/// A resolved paint, evaluatable at a point.
#[derive(Debug, Clone)]
pub enum Paint {
    /// A constant premultiplied color.
    Solid(PremulColor<Srgb>),
    /// A linear gradient, evaluated in gradient space.
    Linear(LinearPaint),
    /// A radial gradient, evaluated in gradient space.
    Radial(RadialPaint),
    /// Scales the wrapped paint's result, alpha included.
    Opacity(Box<Paint>, f32),
    /// Evaluates the wrapped paint at the transformed point.
    Transformed(Box<Paint>, Affine),
}

impl Paint {
    /// The premultiplied color of this paint at `p`.
    pub fn eval(&self, p: Point) -> PremulColor<Srgb> {
        match self {
            Self::Solid(color) => *color,
            Self::Linear(linear) => linear.eval(p),
            Self::Radial(radial) => radial.eval(p),
            Self::Opacity(inner, opacity) => scale(inner.eval(p), *opacity),
            Self::Transformed(inner, transform) => inner.eval(*transform * p),
        }
    }
}

/// A resolved linear gradient.
#[derive(Debug, Clone)]
pub struct LinearPaint {
    start: Point,
    /// The gradient direction scaled so that a dot product with it yields
    /// the gradient parameter directly.
    matrix: Vec2,
    ramp: Ramp,
}

impl LinearPaint {
    fn new(start: Point, end: Point, ramp: Ramp) -> Self {
        let d = end - start;
        Self {
            start,
            matrix: d / d.hypot2(),
            ramp,
        }
    }

    fn eval(&self, p: Point) -> PremulColor<Srgb> {
        let t = self.matrix.dot(p - self.start);
        self.ramp.eval(t as f32)
    }
}

/// A resolved radial gradient.
#[derive(Debug, Clone)]
pub struct RadialPaint {
    radius: f64,
    focal: Point,
    focal_radius: f64,
    /// Vector from the focal center to the outer center.
    cf: Vec2,
    /// Leading coefficient of the parameter quadratic; constant per paint.
    a: f64,
    ramp: Ramp,
}

impl RadialPaint {
    fn new(center: Point, radius: f32, focal: Point, focal_radius: f32, ramp: Ramp) -> Self {
        let radius = f64::from(radius);
        let focal_radius = f64::from(focal_radius);
        let cf = center - focal;
        let dr = radius - focal_radius;
        Self {
            radius,
            focal,
            focal_radius,
            cf,
            a: cf.hypot2() - dr * dr,
            ramp,
        }
    }

    /// Solve `|f + (c - f) t - p| = fr + (r - fr) t` for `t`.
    fn eval(&self, p: Point) -> PremulColor<Srgb> {
        let fp = self.focal - p;
        let dr = self.radius - self.focal_radius;
        let b = self.cf.dot(fp) - self.focal_radius * dr;
        let c = fp.hypot2() - self.focal_radius * self.focal_radius;

        let t = if self.a == 0.0 {
            if b == 0.0 {
                return transparent();
            }
            -c / (2.0 * b)
        } else {
            let d = b * b - self.a * c;
            if d < 0.0 {
                return transparent();
            }
            if self.focal_radius > self.radius {
                (-b + d.sqrt()) / self.a
            } else {
                (-b - d.sqrt()) / self.a
            }
        };
        self.ramp.eval(t as f32)
    }
}

/// Premultiplied stop table shared by the gradient paints.
#[derive(Debug, Clone)]
struct Ramp {
    stops: Vec<RampStop>,
}

#[derive(Debug, Clone, Copy)]
struct RampStop {
    offset: f32,
    color: [f32; 4],
}

impl Ramp {
    fn new(stops: &[Stop]) -> Self {
        Self {
            stops: stops
                .iter()
                .map(|stop| RampStop {
                    offset: stop.offset,
                    color: stop.color.premultiply().components,
                })
                .collect(),
        }
    }

    fn eval(&self, t: f32) -> PremulColor<Srgb> {
        let Some((first, rest)) = self.stops.split_first() else {
            // A gradient without stops paints nothing.
            return transparent();
        };
        if t.is_nan() {
            return transparent();
        }
        if t <= first.offset || rest.is_empty() {
            return PremulColor::new(first.color);
        }
        let last = self.stops.last().unwrap();
        if t >= last.offset {
            return PremulColor::new(last.color);
        }
        // First stop at or past t; the clamps above keep this in range.
        let i = self.stops.partition_point(|stop| stop.offset < t);
        let (s0, s1) = (&self.stops[i - 1], &self.stops[i]);
        let span = s1.offset - s0.offset;
        if span <= 0.0 {
            return PremulColor::new(s1.color);
        }
        let factor = (t - s0.offset) / span;
        let mut color = [0.0; 4];
        for (out, (&c0, &c1)) in color.iter_mut().zip(s0.color.iter().zip(&s1.color)) {
            *out = c0 * (1.0 - factor) + c1 * factor;
        }
        PremulColor::new(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::palette::css;

    fn stops_black_white() -> Vec<Stop> {
        vec![
            Stop {
                offset: 0.0,
                color: css::BLACK,
            },
            Stop {
                offset: 1.0,
                color: css::WHITE,
            },
        ]
    }

    fn assert_color(c: PremulColor<Srgb>, expected: [f32; 4]) {
        for (a, b) in c.components.iter().zip(expected) {
            assert!((a - b).abs() < 1e-5, "{:?} != {expected:?}", c.components);
        }
    }

    #[test]
    fn linear_endpoint_clamping() {
        let paint = PaintType::from(LinearGradient {
            start: Point::new(10.0, 0.0),
            end: Point::new(20.0, 0.0),
            stops: stops_black_white(),
            transform: Affine::IDENTITY,
        })
        .into_paint(Affine::IDENTITY, 1.0);
        assert_color(paint.eval(Point::new(0.0, 5.0)), [0.0, 0.0, 0.0, 1.0]);
        assert_color(paint.eval(Point::new(30.0, 5.0)), [1.0, 1.0, 1.0, 1.0]);
        assert_color(paint.eval(Point::new(15.0, 5.0)), [0.5, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn linear_three_stop_lookup() {
        let stops = vec![
            Stop {
                offset: 0.0,
                color: css::BLACK,
            },
            Stop {
                offset: 0.5,
                color: css::RED,
            },
            Stop {
                offset: 1.0,
                color: css::WHITE,
            },
        ];
        let paint = PaintType::from(LinearGradient {
            start: Point::new(0.0, 0.0),
            end: Point::new(100.0, 0.0),
            stops,
            transform: Affine::IDENTITY,
        })
        .into_paint(Affine::IDENTITY, 1.0);
        assert_color(paint.eval(Point::new(50.0, 0.0)), [1.0, 0.0, 0.0, 1.0]);
        assert_color(paint.eval(Point::new(25.0, 0.0)), [0.5, 0.0, 0.0, 1.0]);
        assert_color(paint.eval(Point::new(75.0, 0.0)), [1.0, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn radial_concentric_parameter() {
        let paint = PaintType::from(RadialGradient {
            center: Point::new(0.0, 0.0),
            radius: 10.0,
            focal: Point::new(0.0, 0.0),
            focal_radius: 0.0,
            stops: stops_black_white(),
            transform: Affine::IDENTITY,
        })
        .into_paint(Affine::IDENTITY, 1.0);
        // t is distance / radius for a concentric gradient.
        assert_color(paint.eval(Point::new(5.0, 0.0)), [0.5, 0.5, 0.5, 1.0]);
        assert_color(paint.eval(Point::new(0.0, 10.0)), [1.0, 1.0, 1.0, 1.0]);
        assert_color(paint.eval(Point::new(20.0, 0.0)), [1.0, 1.0, 1.0, 1.0]);
        assert_color(paint.eval(Point::new(0.0, 0.0)), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn radial_focal_offset_stays_finite() {
        let paint = PaintType::from(RadialGradient {
            center: Point::new(10.0, 0.0),
            radius: 10.0,
            focal: Point::new(5.0, 0.0),
            focal_radius: 0.0,
            stops: stops_black_white(),
            transform: Affine::IDENTITY,
        })
        .into_paint(Affine::IDENTITY, 1.0);
        // On the outer circle the parameter is exactly 1.
        assert_color(paint.eval(Point::new(20.0, 0.0)), [1.0, 1.0, 1.0, 1.0]);
        // At the focal point it is 0.
        assert_color(paint.eval(Point::new(5.0, 0.0)), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn empty_gradient_is_transparent() {
        let paint = PaintType::from(LinearGradient {
            start: Point::new(0.0, 0.0),
            end: Point::new(1.0, 0.0),
            stops: Vec::new(),
            transform: Affine::IDENTITY,
        })
        .into_paint(Affine::IDENTITY, 1.0);
        assert_color(paint.eval(Point::new(0.5, 0.0)), [0.0; 4]);
    }

    #[test]
    fn singular_transform_is_transparent() {
        let paint = PaintType::from(LinearGradient {
            start: Point::new(0.0, 0.0),
            end: Point::new(1.0, 0.0),
            stops: stops_black_white(),
            transform: Affine::scale(0.0),
        })
        .into_paint(Affine::IDENTITY, 1.0);
        assert_color(paint.eval(Point::new(0.5, 0.0)), [0.0; 4]);
    }

    #[test]
    fn opacity_scales_all_components() {
        let paint = PaintType::from(css::RED).into_paint(Affine::IDENTITY, 0.5);
        assert_color(paint.eval(Point::ZERO), [0.5, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn gradient_transform_moves_evaluation_space() {
        let paint = PaintType::from(LinearGradient {
            start: Point::new(0.0, 0.0),
            end: Point::new(10.0, 0.0),
            stops: stops_black_white(),
            transform: Affine::IDENTITY,
        })
        .into_paint(Affine::translate((100.0, 0.0)), 1.0);
        // The shape was translated by 100, so the gradient follows it.
        assert_color(paint.eval(Point::new(105.0, 0.0)), [0.5, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn blend_over_premultiplied() {
        let blue = AlphaColor::<Srgb>::new([0.0, 0.0, 1.0, 1.0]).premultiply();
        let half_yellow = scale(
            AlphaColor::<Srgb>::new([1.0, 1.0, 0.0, 1.0]).premultiply(),
            0.5,
        );
        let out = blend(blue, half_yellow);
        assert_color(out, [0.5, 0.5, 0.5, 1.0]);
    }
}
