// Copyright 2025 the Areo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The SVG path data (`d` attribute) grammar.
//!
//! Supports the full SVG 1.1 command set with implicit repetition:
//! M/m, L/l, H/h, V/v, C/c, S/s, Q/q, T/t, A/a and Z/z.

use crate::Error;
use areo::kurbo::{BezPath, Point, Vec2};
use areo::path::PathBuilder;

/// Parse path data into a path.
pub fn parse_path_data(data: &str) -> Result<BezPath, Error> {
    let mut parser = PathParser {
        lexer: Lexer::new(data),
        builder: PathBuilder::new(),
        last_cubic_control: None,
        last_quad_control: None,
    };
    parser.parse()?;
    Ok(parser.builder.finish())
}

struct PathParser<'a> {
    lexer: Lexer<'a>,
    builder: PathBuilder,
    /// Second control point of the previous C/S command, for S reflection.
    last_cubic_control: Option<Point>,
    /// Control point of the previous Q/T command, for T reflection.
    last_quad_control: Option<Point>,
}

impl PathParser<'_> {
    fn parse(&mut self) -> Result<(), Error> {
        self.lexer.skip_whitespace();
        if self.lexer.at_end() {
            return Ok(());
        }
        // Path data must begin with a moveto.
        match self.lexer.peek() {
            Some(b'M' | b'm') => {}
            _ => return Err(self.lexer.error("expected a moveto command")),
        }
        while !self.lexer.at_end() {
            let command = self
                .lexer
                .next_byte()
                .ok_or_else(|| self.lexer.error("expected a command"))?;
            self.command(command)?;
            self.lexer.skip_separators();
        }
        Ok(())
    }

    fn command(&mut self, command: u8) -> Result<(), Error> {
        let relative = command.is_ascii_lowercase();
        match command.to_ascii_uppercase() {
            b'M' => {
                let p = self.point(relative)?;
                self.builder.move_to(p);
                self.reset_controls();
                // Further coordinate pairs are implicit linetos.
                while self.lexer.starts_number() {
                    let p = self.point(relative)?;
                    self.builder.line_to(p);
                }
            }
            b'L' => loop {
                let p = self.point(relative)?;
                self.builder.line_to(p);
                self.reset_controls();
                if !self.lexer.starts_number() {
                    break;
                }
            },
            b'H' => loop {
                let x = self.lexer.number()?;
                let current = self.builder.current_point();
                let x = if relative { current.x + x } else { x };
                self.builder.line_to(Point::new(x, current.y));
                self.reset_controls();
                if !self.lexer.starts_number() {
                    break;
                }
            },
            b'V' => loop {
                let y = self.lexer.number()?;
                let current = self.builder.current_point();
                let y = if relative { current.y + y } else { y };
                self.builder.line_to(Point::new(current.x, y));
                self.reset_controls();
                if !self.lexer.starts_number() {
                    break;
                }
            },
            b'C' => loop {
                let p1 = self.point(relative)?;
                let p2 = self.point(relative)?;
                let p3 = self.point(relative)?;
                self.builder.curve_to(p1, p2, p3);
                self.last_cubic_control = Some(p2);
                self.last_quad_control = None;
                if !self.lexer.starts_number() {
                    break;
                }
            },
            b'S' => loop {
                let p1 = self.reflected_cubic_control();
                let p2 = self.point(relative)?;
                let p3 = self.point(relative)?;
                self.builder.curve_to(p1, p2, p3);
                self.last_cubic_control = Some(p2);
                self.last_quad_control = None;
                if !self.lexer.starts_number() {
                    break;
                }
            },
            b'Q' => loop {
                let p1 = self.point(relative)?;
                let p2 = self.point(relative)?;
                self.builder.quad_to(p1, p2);
                self.last_quad_control = Some(p1);
                self.last_cubic_control = None;
                if !self.lexer.starts_number() {
                    break;
                }
            },
            b'T' => loop {
                let p1 = self.reflected_quad_control();
                let p2 = self.point(relative)?;
                self.builder.quad_to(p1, p2);
                self.last_quad_control = Some(p1);
                self.last_cubic_control = None;
                if !self.lexer.starts_number() {
                    break;
                }
            },
            b'A' => loop {
                let rx = self.lexer.number()?;
                let ry = self.lexer.number()?;
                let rotation = self.lexer.number()?.to_radians();
                let large_arc = self.lexer.flag()?;
                let sweep = self.lexer.flag()?;
                let end = self.point(relative)?;
                self.builder
                    .arc_to(Vec2::new(rx, ry), rotation, large_arc, sweep, end);
                self.reset_controls();
                if !self.lexer.starts_number() {
                    break;
                }
            },
            b'Z' => {
                self.builder.close();
                self.reset_controls();
            }
            _ => return Err(self.lexer.error("unexpected command")),
        }
        Ok(())
    }

    fn point(&mut self, relative: bool) -> Result<Point, Error> {
        let x = self.lexer.number()?;
        let y = self.lexer.number()?;
        let p = Point::new(x, y);
        Ok(if relative {
            let current = self.builder.current_point();
            Point::new(current.x + p.x, current.y + p.y)
        } else {
            p
        })
    }

    fn reflected_cubic_control(&self) -> Point {
        let current = self.builder.current_point();
        match self.last_cubic_control {
            Some(control) => Point::new(2.0 * current.x - control.x, 2.0 * current.y - control.y),
            None => current,
        }
    }

    fn reflected_quad_control(&self) -> Point {
        let current = self.builder.current_point();
        match self.last_quad_control {
            Some(control) => Point::new(2.0 * current.x - control.x, 2.0 * current.y - control.y),
            None => current,
        }
    }

    fn reset_controls(&mut self) {
        self.last_cubic_control = None;
        self.last_quad_control = None;
    }
}

/// Byte-level lexer over path data: commands, numbers and flags separated
/// by whitespace and commas.
struct Lexer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(data: &'a str) -> Self {
        Self {
            data: data.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn next_byte(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r' | b',')) {
            self.pos += 1;
        }
    }

    /// Whether a number (and thus an implicit command repetition) follows.
    fn starts_number(&mut self) -> bool {
        self.skip_separators();
        matches!(self.peek(), Some(b'0'..=b'9' | b'-' | b'+' | b'.'))
    }

    fn number(&mut self) -> Result<f64, Error> {
        self.skip_separators();
        let start = self.pos;
        if matches!(self.peek(), Some(b'-' | b'+')) {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'-' | b'+')) {
                self.pos += 1;
            }
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        let text = core::str::from_utf8(&self.data[start..self.pos]).expect("scanned ASCII");
        text.parse()
            .map_err(|_| self.error("expected a number"))
    }

    /// An arc flag: a single `0` or `1`, possibly unseparated from what
    /// follows.
    fn flag(&mut self) -> Result<bool, Error> {
        self.skip_separators();
        match self.next_byte() {
            Some(b'0') => Ok(false),
            Some(b'1') => Ok(true),
            _ => Err(self.error("expected an arc flag")),
        }
    }

    fn error(&self, message: &str) -> Error {
        Error::PathData {
            message: message.into(),
            offset: self.pos,
        }
    }
}
