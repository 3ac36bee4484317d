// SPDX-License-Identifier: GPL-3.0-only

//! Frame counters for the processing pipeline

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters updated by the frame processor
#[derive(Debug, Default)]
pub struct PipelineStats {
    arrived: AtomicU64,
    admitted: AtomicU64,
    dropped: AtomicU64,
    rejected: AtomicU64,
    completed: AtomicU64,
}

/// Point-in-time copy of [`PipelineStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Well-formed frames offered to the processor
    pub arrived: u64,
    /// Frames handed to the worker context
    pub admitted: u64,
    /// Frames discarded because another frame was in flight
    pub dropped: u64,
    /// Malformed deliveries discarded at the ingestion boundary
    pub rejected: u64,
    /// Frames whose result reached the sink
    pub completed: u64,
}

impl StatsSnapshot {
    /// Fraction of arrived frames that were admitted (1.0 when nothing arrived)
    pub fn admission_ratio(&self) -> f64 {
        if self.arrived == 0 {
            1.0
        } else {
            self.admitted as f64 / self.arrived as f64
        }
    }
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_arrived(&self) {
        self.arrived.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_admitted(&self) {
        self.admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            arrived: self.arrived.load(Ordering::Relaxed),
            admitted: self.admitted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
        }
    }
}
