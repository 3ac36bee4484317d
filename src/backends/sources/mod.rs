// SPDX-License-Identifier: GPL-3.0-only

//! Frame sources
//!
//! A frame source stands in for the camera: it produces packed RGBA frames
//! that are handed to the frame processor across the byte ingestion
//! boundary. Device enumeration and configuration are out of scope; the
//! sources here are a synthetic test pattern and a still image.

mod image_file;
mod test_pattern;

pub use image_file::ImageFileSource;
pub use test_pattern::TestPatternSource;

use crate::errors::SourceError;

/// One frame as raw bytes, before validation by the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// RGBA bytes, row-major, no padding
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Producer of raw frames
pub trait FrameSource: Send {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Produce the next frame
    ///
    /// `SourceError::Exhausted` ends the stream.
    fn next_frame(&mut self) -> Result<RawFrame, SourceError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn next_frame(&mut self) -> Result<RawFrame, SourceError> {
        (**self).next_frame()
    }
}
