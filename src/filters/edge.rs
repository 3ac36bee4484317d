// SPDX-License-Identifier: GPL-3.0-only

//! Sobel edge detection
//!
//! Two stages, kept separate so results are reproducible bit for bit:
//!
//! 1. Reduce the frame to a single-channel intensity plane with [`luma`].
//! 2. Convolve the interior of that plane with the 3x3 Sobel kernels and
//!    write the clamped gradient magnitude as an opaque gray pixel.
//!
//! Pixels on the outer ring have no full neighborhood and are written as
//! opaque black instead of being sampled with clamped or wrapped edges.

use super::{Filter, luma};
use crate::media::{PixelBuffer, Rgba};
use rayon::prelude::*;

/// Sobel gradient magnitude filter
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetect;

impl Filter for EdgeDetect {
    fn name(&self) -> &'static str {
        "edge"
    }

    fn apply(&self, input: &PixelBuffer) -> PixelBuffer {
        let width = input.width() as usize;
        let height = input.height() as usize;
        let plane = intensity_plane(input);

        let mut output = input.clone();
        output.pixels_mut().fill(Rgba::OPAQUE_BLACK);

        if width < 3 || height < 3 {
            return output;
        }

        output
            .pixels_mut()
            .par_chunks_exact_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                if y == 0 || y == height - 1 {
                    return;
                }
                for (x, pixel) in row.iter_mut().enumerate().take(width - 1).skip(1) {
                    let m = gradient_magnitude(&plane, width, x, y);
                    *pixel = Rgba::gray(m);
                }
            });

        output
    }
}

/// Luma of every pixel, row-major, one byte per pixel
pub fn intensity_plane(input: &PixelBuffer) -> Vec<u8> {
    input
        .pixels()
        .par_iter()
        .map(|p| luma(p.r, p.g, p.b))
        .collect()
}

/// Sobel magnitude at interior position `(x, y)` of `plane`
///
/// `min(255, round(sqrt(gx^2 + gy^2)))` with
/// `gx = [[-1,0,1],[-2,0,2],[-1,0,1]]` and `gy = [[-1,-2,-1],[0,0,0],[1,2,1]]`.
#[inline]
fn gradient_magnitude(plane: &[u8], width: usize, x: usize, y: usize) -> u8 {
    let at = |dx: usize, dy: usize| -> i32 { plane[(y + dy - 1) * width + (x + dx - 1)] as i32 };

    let tl = at(0, 0);
    let tm = at(1, 0);
    let tr = at(2, 0);
    let ml = at(0, 1);
    let mr = at(2, 1);
    let bl = at(0, 2);
    let bm = at(1, 2);
    let br = at(2, 2);

    let gx = (tr + 2 * mr + br) - (tl + 2 * ml + bl);
    let gy = (bl + 2 * bm + br) - (tl + 2 * tm + tr);

    let magnitude = ((gx * gx + gy * gy) as f64).sqrt().round();
    magnitude.min(255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring_is_black(buffer: &PixelBuffer) -> bool {
        let (w, h) = (buffer.width(), buffer.height());
        (0..h).all(|y| {
            (0..w).all(|x| {
                let on_ring = x == 0 || y == 0 || x == w - 1 || y == h - 1;
                !on_ring || buffer.pixel_at(x, y).unwrap() == Rgba::OPAQUE_BLACK
            })
        })
    }

    #[test]
    fn test_uniform_gray_has_no_edges() {
        let input = PixelBuffer::filled(4, 4, Rgba::gray(128)).unwrap();
        let output = EdgeDetect.apply(&input);
        assert!(output.pixels().iter().all(|p| *p == Rgba::OPAQUE_BLACK));
    }

    #[test]
    fn test_bright_center_is_zero_gradient() {
        // Both kernels weigh the center with 0, so a lone bright center
        // produces no gradient at its own position.
        let mut input = PixelBuffer::filled(3, 3, Rgba::new(0, 0, 0, 255)).unwrap();
        input.set_pixel(1, 1, Rgba::new(255, 255, 255, 255)).unwrap();

        let output = EdgeDetect.apply(&input);
        assert!(ring_is_black(&output));
        assert_eq!(output.pixel_at(1, 1).unwrap(), Rgba::gray(0));
    }

    #[test]
    fn test_bright_neighbor_produces_gradient_at_center() {
        let mut input = PixelBuffer::filled(3, 3, Rgba::new(0, 0, 0, 255)).unwrap();
        // Right-middle neighbor: gx = 2 * 255 = 510, gy = 0 -> clamped to 255
        input.set_pixel(2, 1, Rgba::new(255, 255, 255, 255)).unwrap();
        let output = EdgeDetect.apply(&input);
        assert_eq!(output.pixel_at(1, 1).unwrap(), Rgba::gray(255));
        assert!(ring_is_black(&output));
    }

    #[test]
    fn test_diagonal_neighbor_magnitude() {
        let mut input = PixelBuffer::filled(3, 3, Rgba::new(0, 0, 0, 255)).unwrap();
        // Bottom-right neighbor with intensity 100: gx = 100, gy = 100,
        // sqrt(20000) = 141.42 -> 141
        input.set_pixel(2, 2, Rgba::new(100, 100, 100, 255)).unwrap();
        let output = EdgeDetect.apply(&input);
        assert_eq!(output.pixel_at(1, 1).unwrap(), Rgba::gray(141));
    }

    #[test]
    fn test_vertical_step_edge() {
        // Left two columns black, right three columns white (5x5)
        let mut input = PixelBuffer::filled(5, 5, Rgba::new(0, 0, 0, 255)).unwrap();
        for y in 0..5 {
            for x in 2..5 {
                input.set_pixel(x, y, Rgba::new(255, 255, 255, 255)).unwrap();
            }
        }
        let output = EdgeDetect.apply(&input);
        // Columns 1 and 2 straddle the step: gx = 4 * 255 = 1020 -> 255
        for y in 1..4 {
            assert_eq!(output.pixel_at(1, y).unwrap(), Rgba::gray(255));
            assert_eq!(output.pixel_at(2, y).unwrap(), Rgba::gray(255));
            assert_eq!(output.pixel_at(3, y).unwrap(), Rgba::gray(0));
        }
        assert!(ring_is_black(&output));
    }

    #[test]
    fn test_small_buffers_are_all_ring() {
        for (w, h) in [(1, 1), (2, 5), (5, 2)] {
            let input = PixelBuffer::filled(w, h, Rgba::new(250, 3, 90, 17)).unwrap();
            let output = EdgeDetect.apply(&input);
            assert_eq!((output.width(), output.height()), (w, h));
            assert!(output.pixels().iter().all(|p| *p == Rgba::OPAQUE_BLACK));
        }
    }

    #[test]
    fn test_intensity_plane_uses_luma() {
        let input = PixelBuffer::filled(2, 1, Rgba::new(255, 0, 0, 0)).unwrap();
        assert_eq!(intensity_plane(&input), vec![76, 76]);
    }
}
