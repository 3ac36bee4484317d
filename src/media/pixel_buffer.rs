// SPDX-License-Identifier: GPL-3.0-only

//! Owned RGBA8 frame storage
//!
//! A [`PixelBuffer`] is the unit of ownership that moves through the
//! pipeline: the frame source adapter creates one per incoming frame, the
//! frame processor hands it to the worker, and the filter output becomes the
//! processed frame. Buffers are never shared between stages; cloning one is
//! an explicit deep copy.

use crate::constants::BYTES_PER_PIXEL;
use crate::errors::{FrameError, FrameResult};
use bytemuck::{Pod, Zeroable};

/// One packed pixel, channel order fixed at R, G, B, A
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Opaque black, used for the edge filter's boundary ring
    pub const OPAQUE_BLACK: Rgba = Rgba::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque gray pixel with all color channels set to `value`
    pub const fn gray(value: u8) -> Self {
        Self::new(value, value, value, 255)
    }
}

/// Owned RGBA8 image with a packed `width * 4` byte stride
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Byte length a buffer of the given dimensions must have
    ///
    /// Fails with `InvalidDimensions` for a zero side, or when the size does
    /// not fit in memory addressing.
    pub fn required_len(width: u32, height: u32) -> FrameResult<usize> {
        let invalid = FrameError::InvalidDimensions { width, height };
        if width == 0 || height == 0 {
            return Err(invalid);
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL))
            .ok_or(invalid)
    }

    /// Create a buffer with every byte set to zero (transparent black)
    pub fn new(width: u32, height: u32) -> FrameResult<Self> {
        let len = Self::required_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0u8; len],
        })
    }

    /// Create a buffer with every pixel set to `pixel`
    pub fn filled(width: u32, height: u32, pixel: Rgba) -> FrameResult<Self> {
        let mut buffer = Self::new(width, height)?;
        buffer.pixels_mut().fill(pixel);
        Ok(buffer)
    }

    /// Take ownership of raw RGBA bytes
    ///
    /// This is the ingestion boundary for frame sources: the byte count must
    /// equal `width * height * 4` exactly.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> FrameResult<Self> {
        let expected = Self::required_len(width, height)?;
        if data.len() != expected {
            return Err(FrameError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Copy raw RGBA bytes into a new buffer
    pub fn from_bytes(width: u32, height: u32, bytes: &[u8]) -> FrameResult<Self> {
        let expected = Self::required_len(width, height)?;
        if bytes.len() != expected {
            return Err(FrameError::SizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data: bytes.to_vec(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// Total byte length (`width * height * 4`)
    pub fn byte_length(&self) -> usize {
        self.data.len()
    }

    /// Number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Typed view of all pixels in row-major order
    pub fn pixels(&self) -> &[Rgba] {
        bytemuck::cast_slice(&self.data)
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Rgba] {
        bytemuck::cast_slice_mut(&mut self.data)
    }

    /// Pixels of row `y`
    pub fn row(&self, y: u32) -> FrameResult<&[Rgba]> {
        if y >= self.height {
            return Err(self.out_of_range(0, y));
        }
        let width = self.width as usize;
        let start = y as usize * width;
        Ok(&self.pixels()[start..start + width])
    }

    /// Pixel at `(x, y)`
    pub fn pixel_at(&self, x: u32, y: u32) -> FrameResult<Rgba> {
        let index = self.index_of(x, y)?;
        Ok(self.pixels()[index])
    }

    /// Overwrite the pixel at `(x, y)`
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Rgba) -> FrameResult<()> {
        let index = self.index_of(x, y)?;
        self.pixels_mut()[index] = pixel;
        Ok(())
    }

    fn index_of(&self, x: u32, y: u32) -> FrameResult<usize> {
        if x >= self.width || y >= self.height {
            return Err(self.out_of_range(x, y));
        }
        Ok(y as usize * self.width as usize + x as usize)
    }

    fn out_of_range(&self, x: u32, y: u32) -> FrameError {
        FrameError::OutOfRange {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PixelBuffer({}x{}, {} bytes)",
            self.width,
            self.height,
            self.data.len()
        )
    }
}
