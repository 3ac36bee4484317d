// SPDX-License-Identifier: GPL-3.0-only

//! Identity filter

use super::Filter;
use crate::media::PixelBuffer;

/// Copies the input unchanged
///
/// Runs through the same dispatcher and processor path as the real filters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Filter for Passthrough {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn apply(&self, input: &PixelBuffer) -> PixelBuffer {
        input.clone()
    }
}
