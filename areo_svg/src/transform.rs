// Copyright 2025 the Areo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The SVG transform list grammar.

use crate::Error;
use areo::kurbo::{Affine, Vec2};

/// Parse a transform list like `translate(10, 20) rotate(45)` into a
/// single affine. Functions compose left to right.
pub fn parse_transform(text: &str) -> Result<Affine, Error> {
    let mut transform = Affine::IDENTITY;
    let mut rest = text.trim();
    while !rest.is_empty() {
        let open = rest
            .find('(')
            .ok_or_else(|| malformed(rest, "expected '('"))?;
        let name = rest[..open].trim();
        let close = rest
            .find(')')
            .ok_or_else(|| malformed(rest, "expected ')'"))?;
        if close < open {
            return Err(malformed(rest, "unbalanced parentheses"));
        }
        let args = arguments(&rest[open + 1..close])?;
        transform *= function(name, &args).ok_or_else(|| malformed(rest, "unknown transform"))?;
        rest = rest[close + 1..].trim_start_matches([' ', '\t', '\n', '\r', ',']);
    }
    Ok(transform)
}

fn function(name: &str, args: &[f64]) -> Option<Affine> {
    Some(match (name, args) {
        ("matrix", &[a, b, c, d, e, f]) => Affine::new([a, b, c, d, e, f]),
        ("translate", &[x]) => Affine::translate(Vec2::new(x, 0.0)),
        ("translate", &[x, y]) => Affine::translate(Vec2::new(x, y)),
        ("scale", &[s]) => Affine::scale(s),
        ("scale", &[x, y]) => Affine::scale_non_uniform(x, y),
        ("rotate", &[a]) => Affine::rotate(a.to_radians()),
        ("rotate", &[a, cx, cy]) => {
            Affine::translate(Vec2::new(cx, cy))
                * Affine::rotate(a.to_radians())
                * Affine::translate(Vec2::new(-cx, -cy))
        }
        ("skewX", &[a]) => Affine::new([1.0, 0.0, a.to_radians().tan(), 1.0, 0.0, 0.0]),
        ("skewY", &[a]) => Affine::new([1.0, a.to_radians().tan(), 0.0, 1.0, 0.0, 0.0]),
        _ => return None,
    })
}

fn arguments(text: &str) -> Result<Vec<f64>, Error> {
    text.split([',', ' ', '\t', '\n', '\r'])
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().map_err(|_| malformed(s, "expected a number")))
        .collect()
}

fn malformed(context: &str, message: &str) -> Error {
    Error::Transform {
        message: message.into(),
        context: context.chars().take(32).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use areo::kurbo::Point;

    fn assert_affine(a: Affine, b: Affine) {
        for (x, y) in a.as_coeffs().iter().zip(b.as_coeffs()) {
            assert!((x - y).abs() < 1e-9, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn matrix() {
        let t = parse_transform("matrix(1 2 3 4 5 6)").unwrap();
        assert_affine(t, Affine::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
    }

    #[test]
    fn translate_and_scale_compose() {
        let t = parse_transform("translate(10, 20) scale(2)").unwrap();
        assert_eq!(t * Point::new(1.0, 1.0), Point::new(12.0, 22.0));
    }

    #[test]
    fn one_argument_forms() {
        assert_affine(
            parse_transform("translate(5)").unwrap(),
            Affine::translate(Vec2::new(5.0, 0.0)),
        );
        assert_affine(parse_transform("scale(3)").unwrap(), Affine::scale(3.0));
    }

    #[test]
    fn rotate_about_center() {
        let t = parse_transform("rotate(90 10 10)").unwrap();
        let p = t * Point::new(10.0, 0.0);
        assert!((p.x - 20.0).abs() < 1e-9);
        assert!((p.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn skew_x() {
        let t = parse_transform("skewX(45)").unwrap();
        let p = t * Point::new(0.0, 1.0);
        assert!((p.x - 1.0).abs() < 1e-9);
    }

    #[test]
    fn comma_separated_list() {
        let t = parse_transform("translate(1,2),scale(3,4)").unwrap();
        assert_eq!(t * Point::new(1.0, 1.0), Point::new(4.0, 6.0));
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_transform("translate(1").is_err());
        assert!(parse_transform("frobnicate(1)").is_err());
        assert!(parse_transform("scale(a)").is_err());
    }
}
