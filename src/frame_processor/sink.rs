// SPDX-License-Identifier: GPL-3.0-only

//! Single-slot holder for the most recent processed frame

use super::types::ProcessedFrame;
use std::sync::{Arc, Mutex, PoisonError};

/// Holds at most one [`ProcessedFrame`]; storing replaces the previous one
///
/// Frames are stored behind an `Arc`, so the lock is only held for a
/// pointer swap or clone and readers always observe a complete frame.
#[derive(Default)]
pub struct LatestFrameSlot {
    slot: Mutex<Option<Arc<ProcessedFrame>>>,
}

impl LatestFrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held frame, returning the one it displaced
    pub fn store(&self, frame: Arc<ProcessedFrame>) -> Option<Arc<ProcessedFrame>> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(frame)
    }

    /// The most recently stored frame, if any
    pub fn latest(&self) -> Option<Arc<ProcessedFrame>> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
