// SPDX-License-Identifier: GPL-3.0-only

//! Animated synthetic test pattern

use super::{FrameSource, RawFrame};
use crate::errors::SourceError;
use crate::media::PixelBuffer;

/// Scrolling color gradient with a bouncing white square
///
/// The square and the gradient give the edge filter something to find and
/// change every frame, so dropped and processed frames are visible in the
/// preview.
pub struct TestPatternSource {
    width: u32,
    height: u32,
    frame_index: u64,
    square_size: u32,
}

impl TestPatternSource {
    pub fn new(width: u32, height: u32) -> Result<Self, SourceError> {
        PixelBuffer::required_len(width, height)
            .map_err(|e| SourceError::InvalidSettings(e.to_string()))?;

        Ok(Self {
            width,
            height,
            frame_index: 0,
            square_size: (width.min(height) / 6).max(1),
        })
    }

    /// Number of frames produced so far
    pub fn frames_produced(&self) -> u64 {
        self.frame_index
    }

    /// Top-left corner of the square for a frame, bouncing off the edges
    fn square_origin(&self, frame: u64) -> (u32, u32) {
        let bounce = |span: u32, speed: u64| -> u32 {
            let travel = span.saturating_sub(self.square_size) as u64;
            if travel == 0 {
                return 0;
            }
            let pos = (frame * speed) % (travel * 2);
            (if pos > travel { travel * 2 - pos } else { pos }) as u32
        };
        (bounce(self.width, 3), bounce(self.height, 2))
    }

    fn render(&self, frame: u64) -> Vec<u8> {
        let (sx, sy) = self.square_origin(frame);
        let size = self.square_size;
        let shift = ((frame * 2) % self.width as u64) as u32;

        let mut data = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for y in 0..self.height {
            for x in 0..self.width {
                let in_square = x >= sx && x < sx + size && y >= sy && y < sy + size;
                if in_square {
                    data.extend_from_slice(&[255, 255, 255, 255]);
                } else {
                    let r = (((x + shift) % self.width) * 255 / self.width) as u8;
                    let g = (y * 255 / self.height) as u8;
                    let b = (((x + y + shift) / 16) % 2 * 96) as u8;
                    data.extend_from_slice(&[r, g, b, 255]);
                }
            }
        }
        data
    }
}

impl FrameSource for TestPatternSource {
    fn name(&self) -> &str {
        "test-pattern"
    }

    fn next_frame(&mut self) -> Result<RawFrame, SourceError> {
        let data = self.render(self.frame_index);
        self.frame_index += 1;
        Ok(RawFrame {
            data,
            width: self.width,
            height: self.height,
        })
    }
}
