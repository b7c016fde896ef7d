// Copyright 2025 the Areo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An analytic-coverage CPU rasterizer for 2D vector scenes.
//!
//! `areo` renders a stack of filled and stroked Bézier paths with solid or
//! gradient paints into a premultiplied-alpha [`Pixmap`][pixmap::Pixmap].
//! Antialiasing falls out of the algorithm itself: a sweep over the scene's
//! edges cuts the plane into horizontal strips in which no two edges cross,
//! and within a strip the exact area of every trapezoid/pixel intersection
//! is computed in closed form. There is no supersampling and no coverage
//! approximation.
//!
//! # Contents
//!
//! - Path construction and flattening ([`path`], [`flatten`])
//! - Solid and gradient paints ([`paint`])
//! - Scene assembly in paint order ([`scene`])
//! - The sweep rasterizer ([`render`], [`strip`], [`trapezoid`])
//! - The premultiplied pixel buffer and PNG output ([`pixmap`], [`dither`])
//!
//! Scenes are assembled through [`Scene`][scene::Scene], which follows a
//! render-context style API: set the current transform and paint, then fill
//! or stroke paths.

#![forbid(unsafe_code)]

pub mod dither;
pub mod flatten;
pub mod paint;
pub mod path;
pub mod pixmap;
pub mod render;
pub mod scene;
pub mod strip;
pub mod trapezoid;

pub use peniko;
pub use peniko::color;
pub use peniko::kurbo;

pub use pixmap::Pixmap;
pub use scene::Scene;
