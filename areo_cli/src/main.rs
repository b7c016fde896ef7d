// Copyright 2025 the Areo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render an SVG document to a PNG file.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// Render an SVG document to a PNG file.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// The SVG file to render.
    input: PathBuf,
    /// The PNG file to write.
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let scene = areo_svg::parse(&text)
        .with_context(|| format!("failed to parse {}", args.input.display()))?;
    log::debug!(
        "rendering {}x{} canvas",
        scene.width(),
        scene.height()
    );
    let pixmap = scene.render();

    let file = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    pixmap
        .write_png(BufWriter::new(file))
        .with_context(|| format!("failed to encode {}", args.output.display()))?;
    Ok(())
}
