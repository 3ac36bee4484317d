// SPDX-License-Identifier: MPL-2.0

//! VisionEdge - real-time edge detection for camera frames
//!
//! This library provides a frame pipeline that takes packed RGBA frames from
//! a source running at its own cadence, filters at most one of them at a
//! time on a worker context, and exposes the most recent result to a
//! display.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`media`]: The RGBA pixel buffer and its validation
//! - [`filters`]: Pass-through, grayscale and Sobel edge filters
//! - [`frame_processor`]: Drop-on-busy admission, mode selection and the result slot
//! - [`backends`]: Frame sources and the thread that paces them
//! - [`storage`]: PNG export of processed frames
//! - [`config`]: User configuration handling
//! - [`terminal`]: Live preview rendered to the terminal
//!
//! # Example
//!
//! ```ignore
//! let processor = FrameProcessor::new(Arc::new(ThreadExecutor::default()));
//! processor.set_mode(FilterMode::Edge);
//! processor.deliver(rgba_bytes, 640, 480)?;
//! if let Some(frame) = processor.latest_processed_frame() {
//!     draw(&frame.buffer);
//! }
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod filters;
pub mod frame_processor;
pub mod media;
pub mod storage;
pub mod terminal;

// Re-export commonly used types
pub use config::Config;
pub use errors::{AppError, AppResult, FrameError, FrameResult};
pub use filters::{FilterDispatcher, FilterMode};
pub use frame_processor::{FrameAdmission, FrameProcessor, ModeController, ProcessedFrame};
pub use media::{PixelBuffer, Rgba};
