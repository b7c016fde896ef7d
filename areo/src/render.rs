// Copyright 2025 the Areo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The sweep over a scene's edges.
//!
//! Every edge contributes a start and an end event, ordered by y in a
//! min-heap. Between events the active edge set is constant; the sweep
//! additionally splits the band below the current y at the first
//! intersection of x-adjacent edges, so each emitted strip satisfies the
//! strip invariant: constant edge set, no crossings. Strip rasterization is
//! in [`crate::strip`].

use crate::pixmap::Pixmap;
use crate::scene::Scene;
use crate::strip::{self, Segment, ShapeWindings, StripLine, intersect};
use core::cmp::Reverse;
use std::collections::BinaryHeap;

/// Rasterize all shapes of a scene into the pixmap.
pub fn render(scene: &Scene, pixmap: &mut Pixmap) {
    // Stage A: collect directed edges and their y events.
    let mut edges: Vec<Edge> = Vec::new();
    let mut events: BinaryHeap<Reverse<Event>> = BinaryHeap::new();
    for (shape_index, shape) in scene.shapes().iter().enumerate() {
        for &segment in shape.segments() {
            let index = edges.len() as u32;
            events.push(Reverse(Event {
                y: segment.y0,
                kind: EventKind::Start,
                index,
            }));
            events.push(Reverse(Event {
                y: segment.y1,
                kind: EventKind::End,
                index,
            }));
            edges.push(Edge {
                segment,
                shape: shape_index as u32,
            });
        }
    }

    // Stage B: sweep.
    let mut active: Vec<u32> = Vec::new();
    let mut strip_lines: Vec<StripLine> = Vec::new();
    let mut windings = ShapeWindings::default();

    let Some(Reverse(first)) = events.peek() else {
        return;
    };
    let mut y = first.y;

    while let Some(Reverse(event)) = events.pop() {
        while y < event.y {
            // Left-to-right order at the strip top; ties are broken by
            // slope so the orders above and below a shared vertex agree.
            active.sort_by(|&i, &j| {
                let (a, b) = (edges[i as usize].segment.line, edges[j as usize].segment.line);
                a.x_at(y)
                    .total_cmp(&b.x_at(y))
                    .then(a.m.total_cmp(&b.m))
            });

            // The strip may not contain a crossing; clamp its bottom to
            // the first intersection of now-adjacent edges.
            let mut next_y = event.y;
            for pair in active.windows(2) {
                let l0 = edges[pair[0] as usize].segment.line;
                let l1 = edges[pair[1] as usize].segment.line;
                if l0.m != l1.m {
                    let crossing = intersect(l0, l1);
                    if y < crossing && crossing < next_y {
                        next_y = crossing;
                    }
                }
            }

            strip_lines.clear();
            strip_lines.extend(active.iter().map(|&i| {
                let edge = &edges[i as usize];
                StripLine {
                    line: edge.segment.line,
                    winding: edge.segment.winding,
                    shape: edge.shape,
                }
            }));
            strip::render_strip(&strip_lines, y, next_y, scene.shapes(), pixmap, &mut windings);
            y = next_y;
        }

        match event.kind {
            EventKind::Start => active.push(event.index),
            EventKind::End => {
                if let Some(pos) = active.iter().position(|&i| i == event.index) {
                    active.remove(pos);
                }
            }
        }
    }
}

/// An edge of the sweep, tagged with its owning shape.
#[derive(Clone, Copy, Debug)]
struct Edge {
    segment: Segment,
    shape: u32,
}

/// The kind of a y event. Ends sort before starts at equal y so an edge
/// set never transiently contains both an edge and its replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind {
    End,
    Start,
}

/// A y event, ordered by `(y, kind, edge index)` for a deterministic sweep.
#[derive(Clone, Copy, Debug)]
struct Event {
    y: f32,
    kind: EventKind,
    index: u32,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == core::cmp::Ordering::Equal
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.y
            .total_cmp(&other.y)
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.index.cmp(&other.index))
    }
}
