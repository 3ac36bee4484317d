// SPDX-License-Identifier: GPL-3.0-only
//! Thread lifecycle management for frame source loops
//!
//! A frame source runs on its own thread at its own cadence and pushes every
//! frame into the processor, which decides whether to keep or drop it.

use super::sources::FrameSource;
use crate::constants::{frame_interval, timing};
use crate::errors::SourceError;
use crate::frame_processor::FrameProcessor;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Action returned by the loop callback to control loop behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    /// Continue running the loop
    Continue,
    /// Stop the loop gracefully
    Stop,
}

/// Controller for a loop running on a dedicated thread
///
/// ```ignore
/// let mut controller = SourceLoop::drive(source, processor.clone(), 30)?;
/// // ...
/// controller.stop();
/// ```
pub struct SourceLoop {
    thread_handle: Option<JoinHandle<()>>,
    stop_signal: Arc<AtomicBool>,
    name: String,
}

impl SourceLoop {
    /// Run `loop_fn` repeatedly on a thread called `name`
    ///
    /// The closure is called until it returns `LoopAction::Stop` or `stop()`
    /// is called.
    pub fn start<F>(name: &str, loop_fn: F) -> io::Result<Self>
    where
        F: FnMut() -> LoopAction + Send + 'static,
    {
        Self::start_with_signal(name, Arc::new(AtomicBool::new(false)), loop_fn)
    }

    fn start_with_signal<F>(
        name: &str,
        stop_signal: Arc<AtomicBool>,
        mut loop_fn: F,
    ) -> io::Result<Self>
    where
        F: FnMut() -> LoopAction + Send + 'static,
    {
        let stop_signal_clone = Arc::clone(&stop_signal);
        let name_clone = name.to_string();

        info!(name = %name, "Starting source loop");

        let thread_handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                debug!(name = %name_clone, "Source loop thread started");

                loop {
                    if stop_signal_clone.load(Ordering::SeqCst) {
                        debug!(name = %name_clone, "Stop signal received");
                        break;
                    }

                    match loop_fn() {
                        LoopAction::Continue => {}
                        LoopAction::Stop => {
                            debug!(name = %name_clone, "Loop requested stop");
                            break;
                        }
                    }
                }

                info!(name = %name_clone, "Source loop thread exiting");
            })?;

        Ok(Self {
            thread_handle: Some(thread_handle),
            stop_signal,
            name: name.to_string(),
        })
    }

    /// Pull frames from `source` at `fps` and deliver them to `processor`
    ///
    /// Malformed frames and transient source errors are logged and skipped.
    /// The loop ends when the source reports `SourceError::Exhausted`.
    pub fn drive<S>(mut source: S, processor: FrameProcessor, fps: u32) -> io::Result<Self>
    where
        S: FrameSource + 'static,
    {
        let interval = frame_interval(fps);
        let name = format!("source-{}", source.name());
        let stop_signal = Arc::new(AtomicBool::new(false));
        let sleep_signal = Arc::clone(&stop_signal);
        let mut next_deadline = Instant::now();

        debug!(name = %name, ?interval, "Pacing frame source");

        Self::start_with_signal(&name, stop_signal, move || {
            if !sleep_until(next_deadline, &sleep_signal) {
                return LoopAction::Stop;
            }

            let now = Instant::now();
            next_deadline += interval;
            if next_deadline < now {
                // Fell behind: resume the cadence from now instead of bursting
                next_deadline = now;
            }

            match source.next_frame() {
                Ok(frame) => {
                    // Rejections are logged and counted by the processor
                    let _ = processor.deliver(frame.data, frame.width, frame.height);
                    LoopAction::Continue
                }
                Err(SourceError::Exhausted) => {
                    info!(source = source.name(), "Frame source exhausted");
                    LoopAction::Stop
                }
                Err(e) => {
                    warn!(source = source.name(), error = %e, "Frame source error");
                    LoopAction::Continue
                }
            }
        })
    }

    /// Check if the loop is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Signal the loop to stop without waiting
    pub fn request_stop(&self) {
        debug!(name = %self.name, "Requesting source loop stop");
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Stop the loop and wait for the thread to finish
    pub fn stop(&mut self) {
        self.request_stop();
        self.join();
    }

    /// Wait for the thread to finish without sending the stop signal
    pub fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            debug!(name = %self.name, "Waiting for source loop thread to finish");
            if let Err(e) = handle.join() {
                warn!(name = %self.name, "Source loop thread panicked: {:?}", e);
            } else {
                debug!(name = %self.name, "Source loop thread finished");
            }
        }
    }
}

impl Drop for SourceLoop {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!(name = %self.name, "SourceLoop dropped, stopping loop");
            self.stop();
        }
    }
}

/// Sleep until `deadline` in short slices; false if a stop was requested
fn sleep_until(deadline: Instant, stop_signal: &AtomicBool) -> bool {
    loop {
        if stop_signal.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep((deadline - now).min(timing::STOP_CHECK_INTERVAL));
    }
}
