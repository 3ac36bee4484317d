// SPDX-License-Identifier: GPL-3.0-only

//! Shared filter mode selection

use crate::filters::FilterMode;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::debug;

/// Currently selected [`FilterMode`], shared between the UI and the
/// frame processor
///
/// Clones share the same value. The processor reads it exactly once per
/// admitted frame through [`snapshot`](Self::snapshot); frames already in
/// flight keep the mode they were admitted with.
#[derive(Debug, Clone)]
pub struct ModeController {
    mode: Arc<AtomicU8>,
}

impl ModeController {
    pub fn new(initial: FilterMode) -> Self {
        Self {
            mode: Arc::new(AtomicU8::new(initial.as_u8())),
        }
    }

    /// Select a mode; applies to the next admitted frame
    pub fn set_mode(&self, mode: FilterMode) {
        let previous = self.mode.swap(mode.as_u8(), Ordering::SeqCst);
        if previous != mode.as_u8() {
            debug!(%mode, "Filter mode changed");
        }
    }

    /// Current mode
    pub fn snapshot(&self) -> FilterMode {
        // Only valid encodings are ever stored
        FilterMode::from_u8(self.mode.load(Ordering::SeqCst)).unwrap_or_default()
    }

    /// Advance to the next mode and return it
    pub fn cycle(&self) -> FilterMode {
        let next = self.snapshot().next();
        self.set_mode(next);
        next
    }
}

impl Default for ModeController {
    /// Starts in edge detection
    fn default() -> Self {
        Self::new(FilterMode::Edge)
    }
}
