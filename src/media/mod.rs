// SPDX-License-Identifier: GPL-3.0-only

//! Frame storage types
//!
//! Camera frames cross into the pipeline as packed RGBA8 bytes with a fixed
//! length of `width * height * 4`. [`PixelBuffer`] enforces that contract at
//! construction and is the only image type the filters operate on.

pub mod pixel_buffer;

pub use pixel_buffer::{PixelBuffer, Rgba};
