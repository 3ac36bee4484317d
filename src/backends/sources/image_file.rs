// SPDX-License-Identifier: GPL-3.0-only

//! Still image as an endless frame source

use super::{FrameSource, RawFrame};
use crate::errors::SourceError;
use std::path::{Path, PathBuf};
use tracing::info;

/// Decodes an image file once and repeats it as every frame
pub struct ImageFileSource {
    path: PathBuf,
    frame: RawFrame,
    /// Stop after this many frames, repeat forever when `None`
    limit: Option<u64>,
    produced: u64,
}

impl ImageFileSource {
    /// Load and decode `path` to RGBA
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        info!(path = %path.display(), "Loading image file");

        let img = image::open(path).map_err(|e| {
            SourceError::Decode(format!("Failed to load image '{}': {}", path.display(), e))
        })?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        info!(width, height, "Image loaded successfully");

        Ok(Self::from_frame(
            path.to_path_buf(),
            RawFrame {
                data: rgba.into_raw(),
                width,
                height,
            },
        ))
    }

    /// Wrap an already decoded frame
    pub fn from_frame(path: PathBuf, frame: RawFrame) -> Self {
        Self {
            path,
            frame,
            limit: None,
            produced: 0,
        }
    }

    /// End the stream after `frames` frames
    pub fn with_limit(mut self, frames: u64) -> Self {
        self.limit = Some(frames);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.frame.width, self.frame.height)
    }
}

impl FrameSource for ImageFileSource {
    fn name(&self) -> &str {
        "image-file"
    }

    fn next_frame(&mut self) -> Result<RawFrame, SourceError> {
        if let Some(limit) = self.limit
            && self.produced >= limit
        {
            return Err(SourceError::Exhausted);
        }
        self.produced += 1;
        Ok(self.frame.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_frame() -> RawFrame {
        RawFrame {
            data: vec![1, 2, 3, 4, 5, 6, 7, 8],
            width: 2,
            height: 1,
        }
    }

    #[test]
    fn test_repeats_frame() {
        let mut source = ImageFileSource::from_frame(PathBuf::from("mem.png"), tiny_frame());
        for _ in 0..3 {
            assert_eq!(source.next_frame().unwrap(), tiny_frame());
        }
        assert_eq!(source.dimensions(), (2, 1));
    }

    #[test]
    fn test_limit_exhausts_source() {
        let mut source =
            ImageFileSource::from_frame(PathBuf::from("mem.png"), tiny_frame()).with_limit(2);
        assert!(source.next_frame().is_ok());
        assert!(source.next_frame().is_ok());
        assert!(matches!(source.next_frame(), Err(SourceError::Exhausted)));
    }

    #[test]
    fn test_open_decodes_png() {
        let dir = std::env::temp_dir().join(format!("visionedge-src-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pattern.png");

        let img = image::RgbaImage::from_raw(2, 2, (0..16).collect()).unwrap();
        img.save(&path).unwrap();

        let mut source = ImageFileSource::open(&path).unwrap();
        let frame = source.next_frame().unwrap();
        assert_eq!((frame.width, frame.height), (2, 2));
        assert_eq!(frame.data, (0..16).collect::<Vec<u8>>());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_open_missing_file() {
        let result = ImageFileSource::open(Path::new("/nonexistent/visionedge.png"));
        assert!(matches!(result, Err(SourceError::Decode(_))));
    }
}
