// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the frame pipeline and its collaborators

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for pixel buffer and ingestion operations
pub type FrameResult<T> = Result<T, FrameError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Pixel buffer construction or ingestion errors
    Frame(FrameError),
    /// Frame source errors
    Source(SourceError),
    /// Export errors
    Export(ExportError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Errors raised by [`PixelBuffer`](crate::media::PixelBuffer) and the
/// byte ingestion boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Width or height is zero
    InvalidDimensions { width: u32, height: u32 },
    /// Supplied byte count does not match `width * height * 4`
    SizeMismatch { expected: usize, actual: usize },
    /// Pixel coordinate outside the buffer
    OutOfRange {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

/// Frame source errors
#[derive(Debug, Clone)]
pub enum SourceError {
    /// Image file could not be opened or decoded
    Decode(String),
    /// Source configuration is unusable (e.g. zero frame rate)
    InvalidSettings(String),
    /// Source has no more frames
    Exhausted,
}

/// Export errors
#[derive(Debug, Clone)]
pub enum ExportError {
    /// Nothing has been processed yet
    NoFrameAvailable,
    /// No directory to export into
    NoOutputDirectory,
    /// Encoding failed
    EncodingFailed(String),
    /// Save failed
    SaveFailed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Frame(e) => write!(f, "Frame error: {}", e),
            AppError::Source(e) => write!(f, "Source error: {}", e),
            AppError::Export(e) => write!(f, "Export error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::InvalidDimensions { width, height } => {
                write!(f, "Invalid dimensions {}x{}", width, height)
            }
            FrameError::SizeMismatch { expected, actual } => write!(
                f,
                "Size mismatch: expected {} bytes, got {}",
                expected, actual
            ),
            FrameError::OutOfRange {
                x,
                y,
                width,
                height,
            } => write!(
                f,
                "Pixel ({}, {}) out of range for {}x{} buffer",
                x, y, width, height
            ),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Decode(msg) => write!(f, "Decode failed: {}", msg),
            SourceError::InvalidSettings(msg) => write!(f, "Invalid settings: {}", msg),
            SourceError::Exhausted => write!(f, "Source exhausted"),
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::NoFrameAvailable => write!(f, "No processed frame available"),
            ExportError::NoOutputDirectory => write!(f, "No output directory available"),
            ExportError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            ExportError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for FrameError {}
impl std::error::Error for SourceError {}
impl std::error::Error for ExportError {}

impl From<FrameError> for AppError {
    fn from(err: FrameError) -> Self {
        AppError::Frame(err)
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        AppError::Source(err)
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::Export(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::SaveFailed(err.to_string())
    }
}

impl From<image::ImageError> for ExportError {
    fn from(err: image::ImageError) -> Self {
        ExportError::EncodingFailed(err.to_string())
    }
}

impl From<image::ImageError> for SourceError {
    fn from(err: image::ImageError) -> Self {
        SourceError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mismatch_message() {
        let err = FrameError::SizeMismatch {
            expected: 64,
            actual: 60,
        };
        assert_eq!(
            err.to_string(),
            "Size mismatch: expected 64 bytes, got 60"
        );
    }

    #[test]
    fn test_frame_error_wraps_into_app_error() {
        let err: AppError = FrameError::InvalidDimensions {
            width: 0,
            height: 4,
        }
        .into();
        assert!(matches!(
            err,
            AppError::Frame(FrameError::InvalidDimensions { width: 0, height: 4 })
        ));
        assert_eq!(err.to_string(), "Frame error: Invalid dimensions 0x4");
    }
}
