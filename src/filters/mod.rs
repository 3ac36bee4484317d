// SPDX-License-Identifier: GPL-3.0-only

//! Per-pixel frame filters
//!
//! Every filter is a pure function from an input [`PixelBuffer`] to a new
//! output buffer of the same dimensions. Filters hold no state, never mutate
//! their input and can run concurrently on independent buffers.
//!
//! [`FilterDispatcher`] maps a [`FilterMode`] to its filter so the frame
//! processor treats all three modes uniformly, including pass-through.

pub mod edge;
pub mod grayscale;
pub mod passthrough;

pub use edge::EdgeDetect;
pub use grayscale::{Grayscale, luma};
pub use passthrough::Passthrough;

use crate::media::PixelBuffer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Selectable filter mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Unmodified camera image (shown as "ORIGINAL")
    Passthrough,
    /// BT.601 luma in all color channels
    Grayscale,
    /// Sobel gradient magnitude
    #[default]
    Edge,
}

impl FilterMode {
    /// All modes in selection order
    pub const ALL: [FilterMode; 3] = [
        FilterMode::Passthrough,
        FilterMode::Grayscale,
        FilterMode::Edge,
    ];

    /// Label shown in the preview status bar
    pub fn display_name(&self) -> &'static str {
        match self {
            FilterMode::Passthrough => "ORIGINAL",
            FilterMode::Grayscale => "GRAYSCALE",
            FilterMode::Edge => "EDGE",
        }
    }

    /// Compact encoding used for atomic storage
    pub const fn as_u8(self) -> u8 {
        match self {
            FilterMode::Passthrough => 0,
            FilterMode::Grayscale => 1,
            FilterMode::Edge => 2,
        }
    }

    /// Inverse of [`as_u8`](Self::as_u8)
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(FilterMode::Passthrough),
            1 => Some(FilterMode::Grayscale),
            2 => Some(FilterMode::Edge),
            _ => None,
        }
    }

    /// Next mode in selection order, wrapping around
    pub fn next(self) -> Self {
        let index = (self.as_u8() as usize + 1) % Self::ALL.len();
        Self::ALL[index]
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "passthrough" | "original" | "none" => Ok(FilterMode::Passthrough),
            "grayscale" | "gray" | "grey" | "mono" => Ok(FilterMode::Grayscale),
            "edge" | "edges" | "sobel" => Ok(FilterMode::Edge),
            other => Err(format!(
                "unknown filter mode '{}' (expected passthrough, grayscale or edge)",
                other
            )),
        }
    }
}

/// A pure pixel transformation
pub trait Filter: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Produce a new buffer with the same dimensions as `input`
    fn apply(&self, input: &PixelBuffer) -> PixelBuffer;
}

static PASSTHROUGH: Passthrough = Passthrough;
static GRAYSCALE: Grayscale = Grayscale;
static EDGE: EdgeDetect = EdgeDetect;

/// Maps a [`FilterMode`] to its filter and runs it
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterDispatcher;

impl FilterDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// The filter implementing `mode`
    pub fn filter_for(&self, mode: FilterMode) -> &'static dyn Filter {
        match mode {
            FilterMode::Passthrough => &PASSTHROUGH,
            FilterMode::Grayscale => &GRAYSCALE,
            FilterMode::Edge => &EDGE,
        }
    }

    /// Run the filter for `mode` on `frame`
    ///
    /// The filters cannot fail on a well-formed buffer, so neither can this.
    pub fn apply(&self, mode: FilterMode, frame: &PixelBuffer) -> PixelBuffer {
        self.filter_for(mode).apply(frame)
    }
}
