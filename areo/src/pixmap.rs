// Copyright 2025 the Areo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The premultiplied pixel buffer.

use crate::color::{AlphaColor, PremulColor, Srgb};
use crate::dither::Random;
use std::io::Write;

/// A pixmap of premultiplied RGBA values backed by f32 components.
///
/// Coverage-scaled colors accumulate additively during rasterization, so
/// components may transiently exceed 1 inside a strip; after a full render
/// of well-formed shapes every pixel is a valid premultiplied color again.
#[derive(Debug, Clone)]
pub struct Pixmap {
    /// Width of the pixmap in pixels.
    width: u16,
    /// Height of the pixmap in pixels.
    height: u16,
    /// Buffer of the pixmap in row-major order.
    buf: Vec<PremulColor<Srgb>>,
}

impl Pixmap {
    /// Create a new pixmap with the given width and height in pixels.
    ///
    /// All pixels are initialized to transparent black.
    pub fn new(width: u16, height: u16) -> Self {
        let buf = vec![PremulColor::new([0.0; 4]); usize::from(width) * usize::from(height)];
        Self { width, height, buf }
    }

    /// Return the width of the pixmap.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Return the height of the pixmap.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Returns a reference to the underlying data, in row-major order.
    pub fn data(&self) -> &[PremulColor<Srgb>] {
        &self.buf
    }

    /// Sample a pixel from the pixmap.
    #[inline(always)]
    pub fn sample(&self, x: u16, y: u16) -> PremulColor<Srgb> {
        let idx = usize::from(self.width) * usize::from(y) + usize::from(x);
        self.buf[idx]
    }

    /// Add a color onto the pixel at the given coordinates, componentwise
    /// and without clamping.
    #[inline(always)]
    pub fn add_pixel(&mut self, x: u16, y: u16, color: PremulColor<Srgb>) {
        let idx = usize::from(self.width) * usize::from(y) + usize::from(x);
        let c = &mut self.buf[idx];
        let mut components = c.components;
        for (out, add) in components.iter_mut().zip(color.components) {
            *out += add;
        }
        *c = PremulColor::new(components);
    }

    /// Consume the pixmap, returning the premultiplied data.
    pub fn take(self) -> Vec<PremulColor<Srgb>> {
        self.buf
    }

    /// Consume the pixmap, returning the data as straight (unpremultiplied)
    /// colors. Zero-alpha pixels become transparent black.
    pub fn take_unpremultiplied(self) -> Vec<AlphaColor<Srgb>> {
        self.buf.into_iter().map(unpremultiply).collect()
    }

    /// Encode the pixmap as an 8-bit sRGB RGBA PNG into `writer`.
    ///
    /// Each pixel is unpremultiplied and each channel dithered with
    /// deterministic noise before quantization, which removes banding in
    /// gradients. Encoding the same pixmap always produces identical bytes.
    pub fn write_png<W: Write>(&self, writer: W) -> Result<(), png::EncodingError> {
        let mut encoder = png::Encoder::new(writer, u32::from(self.width), u32::from(self.height));
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_source_srgb(png::SrgbRenderingIntent::Perceptual);
        let mut png_writer = encoder.write_header()?;

        let mut random = Random::new();
        let mut data = Vec::with_capacity(self.buf.len() * 4);
        for &pixel in &self.buf {
            let color = unpremultiply(pixel);
            for channel in color.components {
                data.push(random.dither(channel));
            }
        }
        png_writer.write_image_data(&data)?;
        png_writer.finish()
    }
}

fn unpremultiply(c: PremulColor<Srgb>) -> AlphaColor<Srgb> {
    let [r, g, b, a] = c.components;
    if a == 0.0 {
        AlphaColor::new([0.0; 4])
    } else {
        AlphaColor::new([r / a, g / a, b / a, a])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_pixel_accumulates() {
        let mut pixmap = Pixmap::new(4, 4);
        pixmap.add_pixel(1, 2, PremulColor::new([0.25, 0.0, 0.0, 0.25]));
        pixmap.add_pixel(1, 2, PremulColor::new([0.25, 0.0, 0.0, 0.25]));
        assert_eq!(pixmap.sample(1, 2).components, [0.5, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn unpremultiply_zero_alpha() {
        let mut pixmap = Pixmap::new(1, 1);
        pixmap.add_pixel(0, 0, PremulColor::new([0.5, 0.5, 0.5, 0.0]));
        let data = pixmap.take_unpremultiplied();
        assert_eq!(data[0].components, [0.0; 4]);
    }

    #[test]
    fn png_encoding_is_deterministic() {
        let mut pixmap = Pixmap::new(8, 8);
        for x in 0..8 {
            for y in 0..8 {
                let v = (x as f32) / 7.0;
                pixmap.add_pixel(x, y, PremulColor::new([v, v * 0.5, 1.0 - v, 1.0]));
            }
        }
        let mut first = Vec::new();
        let mut second = Vec::new();
        pixmap.write_png(&mut first).unwrap();
        pixmap.write_png(&mut second).unwrap();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }
}
