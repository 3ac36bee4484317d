// SPDX-License-Identifier: GPL-3.0-only

//! Exporting processed frames as PNG files

use crate::config::Config;
use crate::constants::export;
use crate::errors::ExportError;
use crate::frame_processor::{FrameProcessor, ProcessedFrame};
use std::path::{Path, PathBuf};
use tracing::info;

/// Directory exported frames are written to
///
/// The configured directory wins; otherwise a sub-directory of the user's
/// pictures directory.
pub fn export_dir(config: &Config) -> Result<PathBuf, ExportError> {
    if let Some(dir) = &config.export_dir {
        return Ok(dir.clone());
    }
    dirs::picture_dir()
        .map(|dir| dir.join(export::PICTURES_SUBDIR))
        .ok_or(ExportError::NoOutputDirectory)
}

/// Timestamped file name for an exported frame
pub fn export_file_name() -> String {
    let millis = chrono::Local::now().timestamp_millis();
    format!(
        "{}_{}.{}",
        export::FILE_PREFIX,
        millis,
        export::FILE_EXTENSION
    )
}

/// Write `frame` to `output_dir` as an RGBA PNG
///
/// The file holds exactly the frame's bytes; alpha is kept as is.
pub fn export_png(frame: &ProcessedFrame, output_dir: &Path) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(output_dir)?;

    let filepath = unique_path(output_dir, &export_file_name());
    info!(path = %filepath.display(), mode = %frame.mode, "Exporting frame");

    let image = image::RgbaImage::from_raw(
        frame.width(),
        frame.height(),
        frame.buffer.as_bytes().to_vec(),
    )
    .ok_or_else(|| ExportError::EncodingFailed("Frame size does not match buffer".to_string()))?;

    image.save_with_format(&filepath, image::ImageFormat::Png)?;

    info!(path = %filepath.display(), "Frame exported successfully");
    Ok(filepath)
}

/// Export the most recent result of `processor` to the configured directory
pub fn export_latest(processor: &FrameProcessor, config: &Config) -> Result<PathBuf, ExportError> {
    let frame = processor
        .latest_processed_frame()
        .ok_or(ExportError::NoFrameAvailable)?;
    export_png(&frame, &export_dir(config)?)
}

/// Export from a background task
pub async fn export_png_async(
    frame: std::sync::Arc<ProcessedFrame>,
    output_dir: PathBuf,
) -> Result<PathBuf, ExportError> {
    tokio::task::spawn_blocking(move || export_png(&frame, &output_dir))
        .await
        .map_err(|e| ExportError::SaveFailed(format!("Export task error: {}", e)))?
}

/// Avoid overwriting a file exported within the same millisecond
fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }
    let stem = file_name
        .strip_suffix(&format!(".{}", export::FILE_EXTENSION))
        .unwrap_or(file_name);
    (1u32..)
        .map(|n| dir.join(format!("{}-{}.{}", stem, n, export::FILE_EXTENSION)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterMode;
    use crate::media::PixelBuffer;
    use std::time::Duration;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("visionedge-{}-{}", tag, std::process::id()))
    }

    fn frame() -> ProcessedFrame {
        let bytes: Vec<u8> = (0..3 * 2 * 4).map(|i| (i * 10) as u8).collect();
        ProcessedFrame {
            buffer: PixelBuffer::from_raw(3, 2, bytes).unwrap(),
            mode: FilterMode::Edge,
            sequence: 1,
            processing_time: Duration::ZERO,
        }
    }

    #[test]
    fn test_file_name_format() {
        let name = export_file_name();
        assert!(name.starts_with("visionedge_"));
        assert!(name.ends_with(".png"));
        let millis = &name["visionedge_".len()..name.len() - ".png".len()];
        assert!(millis.parse::<i64>().is_ok());
    }

    #[test]
    fn test_export_roundtrip_is_byte_identical() {
        let dir = temp_dir("export");
        let frame = frame();

        let path = export_png(&frame, &dir).unwrap();
        assert!(path.starts_with(&dir));

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.as_raw().as_slice(), frame.buffer.as_bytes());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_repeated_exports_do_not_overwrite() {
        let dir = temp_dir("export-repeat");
        let frame = frame();

        let first = export_png(&frame, &dir).unwrap();
        let second = export_png(&frame, &dir).unwrap();
        assert_ne!(first, second);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_export_latest_without_frame() {
        let processor = FrameProcessor::new(std::sync::Arc::new(
            crate::frame_processor::ManualExecutor::new(),
        ));
        let config = Config {
            export_dir: Some(temp_dir("export-none")),
            ..Config::default()
        };
        assert!(matches!(
            export_latest(&processor, &config),
            Err(ExportError::NoFrameAvailable)
        ));
    }

    #[test]
    fn test_configured_export_dir_wins() {
        let config = Config {
            export_dir: Some(PathBuf::from("/tmp/frames")),
            ..Config::default()
        };
        assert_eq!(export_dir(&config).unwrap(), PathBuf::from("/tmp/frames"));
    }
}
