// SPDX-License-Identifier: GPL-3.0-only

//! Frame processor: admission, scheduling and result delivery
//!
//! The processor sits between a frame source running at its own cadence and
//! the filters. It is deliberately not a queue: at most one frame is in
//! flight and at most one result is held.
//!
//! ```text
//!  source thread                worker context               consumer
//!  ─────────────                ──────────────               ────────
//!  deliver(bytes, w, h)
//!    │ malformed → rejected
//!    ▼
//!  on_frame_arrived ──BUSY──▶ dropped
//!    │ IDLE: → BUSY,
//!    │ snapshot mode
//!    └──────────────────────▶ FilterDispatcher::apply
//!                                 │
//!                                 ▼
//!                              LatestFrameSlot ◀──────── latest_processed_frame()
//!                                 │
//!                              frame ready callback, → IDLE
//! ```
//!
//! Dropping instead of queueing bounds display latency to one frame's
//! processing time when frames arrive faster than the edge filter runs.

pub mod executor;
pub mod mode;
pub mod sink;
pub mod stats;
pub mod types;

pub use executor::{BlockingPoolExecutor, Executor, Job, ManualExecutor, ThreadExecutor};
pub use mode::ModeController;
pub use sink::LatestFrameSlot;
pub use stats::{PipelineStats, StatsSnapshot};
pub use types::{FrameAdmission, FrameReadyCallback, ProcessedFrame};

use crate::errors::FrameResult;
use crate::filters::{FilterDispatcher, FilterMode};
use crate::media::PixelBuffer;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Whether a frame is currently in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    Idle,
    Busy,
}

/// Admission bookkeeping, guarded as one unit
#[derive(Debug)]
struct Admission {
    state: ProcessorState,
    last_sequence: u64,
}

struct Shared {
    admission: Mutex<Admission>,
    modes: ModeController,
    dispatcher: FilterDispatcher,
    sink: LatestFrameSlot,
    stats: PipelineStats,
    executor: Arc<dyn Executor>,
    on_frame_ready: Option<FrameReadyCallback>,
}

impl Shared {
    fn admission(&self) -> MutexGuard<'_, Admission> {
        self.admission
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Worker-side half of a frame's lifecycle
    fn process(&self, frame: PixelBuffer, sequence: u64, mode: FilterMode) {
        let filter = self.dispatcher.filter_for(mode);
        let start = Instant::now();
        let buffer = filter.apply(&frame);
        drop(frame);

        let processed = Arc::new(ProcessedFrame {
            buffer,
            mode,
            sequence,
            processing_time: start.elapsed(),
        });

        trace!(
            sequence,
            filter = filter.name(),
            processing_us = processed.processing_time.as_micros() as u64,
            "Frame processed"
        );

        self.sink.store(Arc::clone(&processed));
        self.stats.record_completed();

        if let Some(callback) = &self.on_frame_ready {
            callback(&processed);
        }
    }
}

/// Returns the processor to IDLE when dropped
///
/// Travels inside the worker job, so the state is released after the result
/// is published, and also if the job panics or is discarded unrun.
struct InFlight {
    shared: Arc<Shared>,
    sequence: u64,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut admission = self.shared.admission();
        if admission.last_sequence == self.sequence {
            admission.state = ProcessorState::Idle;
        }
    }
}

/// The scheduling core of the pipeline
///
/// Cheap to clone; clones drive the same pipeline, so a frame source thread
/// and a display loop can each hold one.
#[derive(Clone)]
pub struct FrameProcessor {
    shared: Arc<Shared>,
}

impl FrameProcessor {
    /// Start building a processor that runs filters on `executor`
    pub fn builder(executor: Arc<dyn Executor>) -> FrameProcessorBuilder {
        FrameProcessorBuilder {
            executor,
            modes: None,
            on_frame_ready: None,
        }
    }

    /// Processor with a fresh mode controller (starting in edge mode)
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self::builder(executor).build()
    }

    /// Ingest raw RGBA bytes from a frame source
    ///
    /// Malformed input (`SizeMismatch`, `InvalidDimensions`) is logged,
    /// counted and returned; the sink is untouched and the source should
    /// simply carry on with the next frame.
    pub fn deliver(
        &self,
        raw_bytes: Vec<u8>,
        width: u32,
        height: u32,
    ) -> FrameResult<FrameAdmission> {
        match PixelBuffer::from_raw(width, height, raw_bytes) {
            Ok(frame) => Ok(self.on_frame_arrived(frame)),
            Err(e) => {
                self.shared.stats.record_rejected();
                warn!(error = %e, width, height, "Dropping malformed frame");
                Err(e)
            }
        }
    }

    /// Offer a frame for processing
    ///
    /// If a frame is already in flight this one is dropped. Otherwise the
    /// processor becomes BUSY, snapshots the current mode and schedules the
    /// filter on the worker context. Never blocks on filter work.
    pub fn on_frame_arrived(&self, frame: PixelBuffer) -> FrameAdmission {
        self.shared.stats.record_arrived();

        // Admission and mode snapshot form a single decision
        let (sequence, mode) = {
            let mut admission = self.shared.admission();
            if admission.state == ProcessorState::Busy {
                self.shared.stats.record_dropped();
                trace!(
                    in_flight = admission.last_sequence,
                    "Processor busy, dropping frame"
                );
                return FrameAdmission::Dropped;
            }
            admission.state = ProcessorState::Busy;
            admission.last_sequence += 1;
            (admission.last_sequence, self.shared.modes.snapshot())
        };

        let in_flight = InFlight {
            shared: Arc::clone(&self.shared),
            sequence,
        };
        let job: Job = Box::new(move || {
            in_flight.shared.process(frame, sequence, mode);
            drop(in_flight);
        });

        if let Err(e) = self.shared.executor.execute(job) {
            // The job, and with it the in-flight guard, was dropped unrun
            warn!(error = %e, sequence, "Failed to schedule frame");
            self.shared.stats.record_dropped();
            return FrameAdmission::Dropped;
        }

        self.shared.stats.record_admitted();
        trace!(sequence, %mode, "Frame admitted");
        FrameAdmission::Admitted { sequence, mode }
    }

    /// The most recent result, without waiting for in-flight work
    pub fn latest_processed_frame(&self) -> Option<Arc<ProcessedFrame>> {
        self.shared.sink.latest()
    }

    /// Select the filter for subsequently admitted frames
    pub fn set_mode(&self, mode: FilterMode) {
        self.shared.modes.set_mode(mode);
    }

    /// Currently selected mode
    pub fn mode(&self) -> FilterMode {
        self.shared.modes.snapshot()
    }

    /// Shared mode controller, for handing to UI code
    pub fn mode_controller(&self) -> &ModeController {
        &self.shared.modes
    }

    pub fn state(&self) -> ProcessorState {
        self.shared.admission().state
    }

    pub fn is_busy(&self) -> bool {
        self.state() == ProcessorState::Busy
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }
}

/// Builder for [`FrameProcessor`]
pub struct FrameProcessorBuilder {
    executor: Arc<dyn Executor>,
    modes: Option<ModeController>,
    on_frame_ready: Option<FrameReadyCallback>,
}

impl FrameProcessorBuilder {
    /// Share an existing mode controller instead of creating one
    pub fn mode_controller(mut self, modes: ModeController) -> Self {
        self.modes = Some(modes);
        self
    }

    /// Start in `mode` with a fresh controller
    pub fn initial_mode(mut self, mode: FilterMode) -> Self {
        self.modes = Some(ModeController::new(mode));
        self
    }

    /// Called on the worker context after each result is stored
    pub fn on_frame_ready<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ProcessedFrame) + Send + Sync + 'static,
    {
        self.on_frame_ready = Some(Arc::new(callback));
        self
    }

    pub fn build(self) -> FrameProcessor {
        let modes = self.modes.unwrap_or_default();
        debug!(mode = %modes.snapshot(), "Creating frame processor");

        FrameProcessor {
            shared: Arc::new(Shared {
                admission: Mutex::new(Admission {
                    state: ProcessorState::Idle,
                    last_sequence: 0,
                }),
                modes,
                dispatcher: FilterDispatcher::new(),
                sink: LatestFrameSlot::new(),
                stats: PipelineStats::new(),
                executor: self.executor,
                on_frame_ready: self.on_frame_ready,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FrameError;
    use crate::media::Rgba;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    fn manual_processor(mode: FilterMode) -> (FrameProcessor, Arc<ManualExecutor>) {
        let executor = Arc::new(ManualExecutor::new());
        let processor = FrameProcessor::builder(executor.clone())
            .initial_mode(mode)
            .build();
        (processor, executor)
    }

    fn solid(value: u8) -> PixelBuffer {
        PixelBuffer::filled(4, 4, Rgba::new(value, value / 2, 255 - value, 200)).unwrap()
    }

    #[test]
    fn test_idle_until_first_frame() {
        let (processor, executor) = manual_processor(FilterMode::Edge);
        assert_eq!(processor.state(), ProcessorState::Idle);
        assert!(processor.latest_processed_frame().is_none());
        assert_eq!(executor.pending(), 0);
    }

    #[test]
    fn test_second_frame_dropped_while_busy() {
        let (processor, executor) = manual_processor(FilterMode::Passthrough);

        let first = solid(10);
        let admission = processor.on_frame_arrived(first.clone());
        assert_eq!(
            admission,
            FrameAdmission::Admitted {
                sequence: 1,
                mode: FilterMode::Passthrough
            }
        );
        assert!(processor.is_busy());

        assert_eq!(processor.on_frame_arrived(solid(99)), FrameAdmission::Dropped);
        assert_eq!(executor.pending(), 1);

        executor.run_all();
        let latest = processor.latest_processed_frame().unwrap();
        assert_eq!(latest.sequence, 1);
        assert_eq!(latest.buffer, first);
        assert_eq!(processor.state(), ProcessorState::Idle);

        let stats = processor.stats();
        assert_eq!(stats.arrived, 2);
        assert_eq!(stats.admitted, 1);
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.completed, 1);
    }

    #[test]
    fn test_dropped_frames_not_processed_later() {
        let (processor, executor) = manual_processor(FilterMode::Passthrough);
        processor.on_frame_arrived(solid(1));
        processor.on_frame_arrived(solid(2));
        processor.on_frame_arrived(solid(3));
        executor.run_all();
        assert_eq!(executor.pending(), 0);
        assert_eq!(processor.stats().completed, 1);

        // Next arrival after IDLE is admitted with the next sequence number
        let admission = processor.on_frame_arrived(solid(4));
        assert!(matches!(admission, FrameAdmission::Admitted { sequence: 2, .. }));
        executor.run_all();
        assert_eq!(processor.latest_processed_frame().unwrap().buffer, solid(4));
    }

    #[test]
    fn test_mode_change_does_not_affect_in_flight_frame() {
        let (processor, executor) = manual_processor(FilterMode::Grayscale);
        processor.on_frame_arrived(solid(50));
        processor.set_mode(FilterMode::Edge);
        executor.run_all();

        let latest = processor.latest_processed_frame().unwrap();
        assert_eq!(latest.mode, FilterMode::Grayscale);
        assert!(latest.buffer.pixels().iter().all(|p| p.a == 200));

        processor.on_frame_arrived(solid(50));
        executor.run_all();
        assert_eq!(processor.latest_processed_frame().unwrap().mode, FilterMode::Edge);
    }

    #[test]
    fn test_malformed_delivery_leaves_sink_untouched() {
        let (processor, executor) = manual_processor(FilterMode::Passthrough);
        processor.deliver(vec![7u8; 16], 2, 2).unwrap();
        executor.run_all();
        let before = processor.latest_processed_frame().unwrap();

        let err = processor.deliver(vec![0u8; 15], 2, 2).unwrap_err();
        assert_eq!(
            err,
            FrameError::SizeMismatch {
                expected: 16,
                actual: 15
            }
        );
        assert!(matches!(
            processor.deliver(Vec::new(), 0, 2),
            Err(FrameError::InvalidDimensions { .. })
        ));

        assert_eq!(executor.pending(), 0);
        assert_eq!(processor.state(), ProcessorState::Idle);
        let after = processor.latest_processed_frame().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(processor.stats().rejected, 2);
    }

    #[test]
    fn test_passthrough_cycles_busy_and_idle() {
        let (processor, executor) = manual_processor(FilterMode::Passthrough);
        for value in [1u8, 2, 3] {
            assert!(processor.on_frame_arrived(solid(value)).is_admitted());
            assert!(processor.is_busy());
            assert!(!processor.on_frame_arrived(solid(0)).is_admitted());
            executor.run_all();
            assert!(!processor.is_busy());
        }
        assert_eq!(processor.stats().dropped, 3);
    }

    #[test]
    fn test_frame_ready_callback() {
        let executor = Arc::new(ManualExecutor::new());
        let seen = Arc::new(AtomicU64::new(0));
        let seen_clone = Arc::clone(&seen);
        let processor = FrameProcessor::builder(executor.clone())
            .on_frame_ready(move |frame| {
                seen_clone.store(frame.sequence, Ordering::SeqCst);
            })
            .build();

        processor.on_frame_arrived(solid(1));
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        executor.run_all();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_discarded_job_releases_processor() {
        let (processor, executor) = manual_processor(FilterMode::Edge);
        processor.on_frame_arrived(solid(1));
        assert!(processor.is_busy());
        executor.discard_all();
        assert!(!processor.is_busy());
        assert!(processor.latest_processed_frame().is_none());
    }

    #[test]
    fn test_threaded_processing_completes() {
        let processor = FrameProcessor::builder(Arc::new(ThreadExecutor::new("test-filter")))
            .initial_mode(FilterMode::Edge)
            .build();

        let frame = PixelBuffer::filled(8, 8, Rgba::gray(128)).unwrap();
        assert!(processor.on_frame_arrived(frame).is_admitted());

        let deadline = Instant::now() + Duration::from_secs(5);
        while processor.latest_processed_frame().is_none() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }

        let latest = processor.latest_processed_frame().unwrap();
        assert_eq!(latest.mode, FilterMode::Edge);
        assert!(latest.buffer.pixels().iter().all(|p| *p == Rgba::OPAQUE_BLACK));
    }
}
