// SPDX-License-Identifier: GPL-3.0-only

//! Grayscale filter (BT.601 luma)

use super::Filter;
use crate::constants::luma::{SCALE, WEIGHT_B, WEIGHT_G, WEIGHT_R};
use crate::media::PixelBuffer;
use rayon::prelude::*;

/// BT.601 luma `round(0.299 R + 0.587 G + 0.114 B)`, clamped to 0..=255
///
/// Computed with weights scaled by 1000 so the result is exact: adding
/// half the scale before dividing rounds halves up, matching
/// round-to-nearest for non-negative values.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = WEIGHT_R * r as u32 + WEIGHT_G * g as u32 + WEIGHT_B * b as u32;
    ((weighted + SCALE / 2) / SCALE).min(255) as u8
}

/// Replaces R, G and B with luma, keeping alpha
#[derive(Debug, Clone, Copy, Default)]
pub struct Grayscale;

impl Filter for Grayscale {
    fn name(&self) -> &'static str {
        "grayscale"
    }

    fn apply(&self, input: &PixelBuffer) -> PixelBuffer {
        let mut output = input.clone();
        let width = output.width() as usize;

        // Row-based parallelism; each output pixel only reads its own input pixel
        output.pixels_mut().par_chunks_exact_mut(width).for_each(|row| {
            for pixel in row {
                let y = luma(pixel.r, pixel.g, pixel.b);
                pixel.r = y;
                pixel.g = y;
                pixel.b = y;
            }
        });

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::Rgba;

    #[test]
    fn test_luma_extremes() {
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(128, 128, 128), 128);
    }

    #[test]
    fn test_luma_single_channels() {
        // 0.299 * 255 = 76.245
        assert_eq!(luma(255, 0, 0), 76);
        // 0.587 * 255 = 149.685
        assert_eq!(luma(0, 255, 0), 150);
        // 0.114 * 255 = 29.07
        assert_eq!(luma(0, 0, 255), 29);
    }

    #[test]
    fn test_luma_rounds_half_up() {
        // 0.299 * 10 + 0.587 * 0 + 0.114 * 5 = 3.56 -> 4
        assert_eq!(luma(10, 0, 5), 4);
        // 0.114 * 25 = 2.85 -> 3, 0.299 * 5 = 1.495 -> 1
        assert_eq!(luma(0, 0, 25), 3);
        assert_eq!(luma(5, 0, 0), 1);
    }

    #[test]
    fn test_grayscale_preserves_alpha_and_equalizes_channels() {
        let mut input = PixelBuffer::new(4, 3).unwrap();
        for y in 0..3 {
            for x in 0..4 {
                let pixel = Rgba::new((x * 60) as u8, (y * 90) as u8, 33, (x * 10 + y) as u8);
                input.set_pixel(x, y, pixel).unwrap();
            }
        }

        let output = Grayscale.apply(&input);
        assert_eq!(output.width(), 4);
        assert_eq!(output.height(), 3);
        for (src, dst) in input.pixels().iter().zip(output.pixels()) {
            assert_eq!(dst.r, dst.g);
            assert_eq!(dst.g, dst.b);
            assert_eq!(dst.r, luma(src.r, src.g, src.b));
            assert_eq!(dst.a, src.a);
        }
    }

    #[test]
    fn test_grayscale_leaves_input_untouched() {
        let input = PixelBuffer::filled(2, 2, Rgba::new(255, 0, 0, 255)).unwrap();
        let snapshot = input.clone();
        let _ = Grayscale.apply(&input);
        assert_eq!(input, snapshot);
    }
}
