// SPDX-License-Identifier: MPL-2.0

//! Frame producers
//!
//! ```text
//! ┌──────────────────────┐      ┌──────────────────────┐
//! │     FrameSource      │      │    FrameProcessor    │
//! │ test pattern / image │─────▶│  admit or drop, then │
//! └──────────┬───────────┘      │  filter on a worker  │
//!            │                  └──────────────────────┘
//!       SourceLoop
//!   (own thread, fixed fps)
//! ```
//!
//! # Modules
//!
//! - [`sources`]: Frame sources standing in for a camera
//! - [`frame_loop`]: Thread that paces a source and feeds the processor

pub mod frame_loop;
pub mod sources;

pub use frame_loop::{LoopAction, SourceLoop};
