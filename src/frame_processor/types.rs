// SPDX-License-Identifier: GPL-3.0-only

//! Core types for frame processing results

use crate::filters::FilterMode;
use crate::media::PixelBuffer;
use std::sync::Arc;
use std::time::Duration;

/// A filtered frame together with the mode it was produced under
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedFrame {
    /// Filter output
    pub buffer: PixelBuffer,
    /// Mode snapshotted when the source frame was admitted
    pub mode: FilterMode,
    /// Admission sequence number of the source frame (starts at 1)
    pub sequence: u64,
    /// Time spent inside the filter
    pub processing_time: Duration,
}

impl ProcessedFrame {
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }
}

/// Outcome of offering a frame to the processor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAdmission {
    /// The frame was handed to the worker context
    Admitted { sequence: u64, mode: FilterMode },
    /// A frame was already in flight; this one was discarded
    Dropped,
}

impl FrameAdmission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, FrameAdmission::Admitted { .. })
    }
}

/// "Frame ready" notification, invoked on the worker context after the
/// result has been stored
pub type FrameReadyCallback = Arc<dyn Fn(&ProcessedFrame) + Send + Sync>;
