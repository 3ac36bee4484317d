// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Bytes per packed RGBA8 pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// BT.601 luma weights, scaled by 1000 so luma can be computed exactly in
/// integer arithmetic
pub mod luma {
    /// Red weight (0.299)
    pub const WEIGHT_R: u32 = 299;
    /// Green weight (0.587)
    pub const WEIGHT_G: u32 = 587;
    /// Blue weight (0.114)
    pub const WEIGHT_B: u32 = 114;
    /// Sum of the weights
    pub const SCALE: u32 = 1000;
}

/// Frame source defaults and limits
pub mod source {
    /// Default frame rate for the synthetic and still-image sources
    pub const DEFAULT_FPS: u32 = 30;

    /// Lowest accepted frame rate
    pub const MIN_FPS: u32 = 1;

    /// Highest accepted frame rate
    pub const MAX_FPS: u32 = 240;

    /// Default test pattern width
    pub const DEFAULT_WIDTH: u32 = 640;

    /// Default test pattern height
    pub const DEFAULT_HEIGHT: u32 = 480;
}

/// Timing constants
pub mod timing {
    use super::Duration;

    /// Terminal input poll interval (also bounds the preview redraw rate)
    pub const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(16);

    /// Interval between statistics log lines in headless streaming
    pub const STATS_LOG_INTERVAL: Duration = Duration::from_secs(1);

    /// How often headless streaming checks for a stop request
    pub const STOP_CHECK_INTERVAL: Duration = Duration::from_millis(50);
}

/// Export file naming
pub mod export {
    /// File name prefix for exported frames
    pub const FILE_PREFIX: &str = "visionedge";

    /// Extension of exported frames
    pub const FILE_EXTENSION: &str = "png";

    /// Sub-directory of the user's pictures directory used by default
    pub const PICTURES_SUBDIR: &str = "VisionEdge";
}

/// Supported input file formats
pub mod file_formats {
    /// Image file extensions accepted by the still-image source
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// Check whether a path has a supported image extension
    pub fn is_image_file(path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                IMAGE_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false)
    }
}

/// Interval between frames at the given rate, clamped to the accepted range
pub fn frame_interval(fps: u32) -> Duration {
    let fps = fps.clamp(source::MIN_FPS, source::MAX_FPS);
    Duration::from_nanos(1_000_000_000 / fps as u64)
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}
