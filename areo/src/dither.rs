// Copyright 2025 the Areo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic dithering for 8-bit quantization.
//!
//! Quantizing a smooth gradient to 8 bits produces visible banding; adding
//! uniform noise in `[0, 1)` before truncation trades the bands for
//! imperceptible per-pixel grain. The noise source is xorshift128+ with a
//! fixed seed, so the same pixmap always encodes to the same bytes.

const SEED: u64 = 0xC0DE_C0DE_C0DE_C0DE;

/// Seeded xorshift128+ generator.
#[derive(Debug, Clone)]
pub struct Random {
    s: [u64; 2],
}

impl Random {
    /// Create a generator with the fixed seed.
    pub fn new() -> Self {
        Self { s: [SEED, SEED] }
    }

    /// The next 64-bit word.
    pub fn next_u64(&mut self) -> u64 {
        let [s0, s1] = self.s;
        let result = s0.wrapping_add(s1);
        let x = s0 ^ (s0 << 23);
        self.s = [s1, x ^ s1 ^ (x >> 18) ^ (s1 >> 5)];
        result
    }

    /// The next word mapped to the unit interval.
    pub fn next_f32(&mut self) -> f32 {
        const SCALE: f32 = 1.0 / 18_446_744_073_709_551_616.0;
        self.next_u64() as f32 * SCALE
    }

    /// Quantize a channel in `[0, 1]` to 8 bits with dither noise.
    pub fn dither(&mut self, value: f32) -> u8 {
        (value * 255.0 + self.next_f32()).clamp(0.0, 255.0) as u8
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::new()
    }
}
