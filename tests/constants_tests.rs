// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use std::path::Path;
use std::time::Duration;
use visionedge::constants::{self, export, file_formats, source};

#[test]
fn test_default_source_within_limits() {
    assert!(source::DEFAULT_FPS >= source::MIN_FPS);
    assert!(source::DEFAULT_FPS <= source::MAX_FPS);
    assert!(source::DEFAULT_WIDTH >= 3 && source::DEFAULT_HEIGHT >= 3);
}

#[test]
fn test_frame_interval() {
    assert_eq!(constants::frame_interval(1), Duration::from_secs(1));
    assert_eq!(constants::frame_interval(50), Duration::from_millis(20));
}

#[test]
fn test_frame_interval_clamped() {
    // Zero would divide by zero; it is treated as the minimum rate
    assert_eq!(
        constants::frame_interval(0),
        constants::frame_interval(source::MIN_FPS)
    );
    assert_eq!(
        constants::frame_interval(10_000),
        constants::frame_interval(source::MAX_FPS)
    );
}

#[test]
fn test_export_extension_is_supported_input() {
    // Exported frames can be fed back in as a still-image source
    let name = format!("{}_0.{}", export::FILE_PREFIX, export::FILE_EXTENSION);
    assert!(file_formats::is_image_file(Path::new(&name)));
}

#[test]
fn test_version_not_empty() {
    assert!(!constants::app_info::version().is_empty());
}
