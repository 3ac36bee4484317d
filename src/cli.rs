// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Live terminal preview
//! - Filtering a single image file
//! - Headless streaming with frame statistics

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use visionedge::Config;
use visionedge::backends::SourceLoop;
use visionedge::backends::sources::{FrameSource, ImageFileSource, TestPatternSource};
use visionedge::constants::{file_formats, timing};
use visionedge::errors::SourceError;
use visionedge::filters::{FilterDispatcher, FilterMode};
use visionedge::frame_processor::{
    BlockingPoolExecutor, FrameProcessor, ProcessedFrame, StatsSnapshot,
};
use visionedge::media::PixelBuffer;
use visionedge::storage;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the still image at `image`, or the test pattern when `None`
fn open_source(image: Option<&Path>, config: &Config) -> Result<Box<dyn FrameSource>, SourceError> {
    match image {
        Some(path) => {
            if !file_formats::is_image_file(path) {
                warn!(path = %path.display(), "Unrecognized image extension, trying anyway");
            }
            Ok(Box::new(ImageFileSource::open(path)?))
        }
        None => Ok(Box::new(TestPatternSource::new(config.width, config.height)?)),
    }
}

/// Run the live terminal preview
pub fn preview(image: Option<PathBuf>, mode: Option<FilterMode>, config: &Config) -> CliResult {
    let source = open_source(image.as_deref(), config)?;

    let mut config = config.clone();
    if let Some(mode) = mode {
        config.default_mode = mode;
    }

    visionedge::terminal::run(source, &config)?;
    Ok(())
}

/// Filter one image file and write the result as PNG
pub fn process_image(
    input: PathBuf,
    output: Option<PathBuf>,
    mode: Option<FilterMode>,
    config: &Config,
) -> CliResult {
    let mode = mode.unwrap_or(config.default_mode);

    let mut source = ImageFileSource::open(&input)?;
    let raw = source.next_frame()?;
    let buffer = PixelBuffer::from_raw(raw.width, raw.height, raw.data)?;

    println!(
        "Processing {} ({}x{}) with {}",
        input.display(),
        buffer.width(),
        buffer.height(),
        mode.display_name()
    );

    let start = Instant::now();
    let filtered = FilterDispatcher::new().apply(mode, &buffer);
    let frame = ProcessedFrame {
        buffer: filtered,
        mode,
        sequence: 1,
        processing_time: start.elapsed(),
    };

    let path = match output {
        Some(path) => {
            let img = image::RgbaImage::from_raw(
                frame.width(),
                frame.height(),
                frame.buffer.into_raw(),
            )
            .ok_or("Failed to create image")?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            img.save_with_format(&path, image::ImageFormat::Png)?;
            path
        }
        None => storage::export_png(&frame, &storage::export_dir(config)?)?,
    };

    println!("Filtered in {:?}", frame.processing_time);
    println!("Saved: {}", path.display());
    Ok(())
}

/// Options for [`stream`]
pub struct StreamOptions {
    pub duration: Option<u64>,
    pub fps: Option<u32>,
    pub mode: Option<FilterMode>,
    pub image: Option<PathBuf>,
    pub export: bool,
    pub json: bool,
}

/// Run the pipeline without a display and report what happened to each frame
pub fn stream(options: StreamOptions, config: &Config) -> CliResult {
    let runtime = tokio::runtime::Runtime::new()?;
    let executor = Arc::new(BlockingPoolExecutor::new(runtime.handle().clone()));

    let processor = FrameProcessor::builder(executor)
        .initial_mode(options.mode.unwrap_or(config.default_mode))
        .build();

    let source = open_source(options.image.as_deref(), config)?;
    let fps = options.fps.unwrap_or(config.fps);

    // Set up Ctrl+C handler
    let stop_requested = Arc::new(AtomicBool::new(false));
    let stop_clone = Arc::clone(&stop_requested);
    ctrlc::set_handler(move || {
        stop_clone.store(true, Ordering::SeqCst);
    })?;

    let limit = options.duration.map(Duration::from_secs);
    match limit {
        Some(limit) => println!("Streaming for {:?} at {} fps...", limit, fps),
        None => println!("Streaming at {} fps, press Ctrl+C to stop...", fps),
    }

    let mut source_loop = SourceLoop::drive(source, processor.clone(), fps)?;

    let start = Instant::now();
    let mut last_log = Instant::now();
    while !stop_requested.load(Ordering::SeqCst) && source_loop.is_running() {
        if limit.is_some_and(|limit| start.elapsed() >= limit) {
            break;
        }
        if last_log.elapsed() >= timing::STATS_LOG_INTERVAL {
            let stats = processor.stats();
            info!(
                arrived = stats.arrived,
                completed = stats.completed,
                dropped = stats.dropped,
                "Pipeline progress"
            );
            last_log = Instant::now();
        }
        std::thread::sleep(timing::STOP_CHECK_INTERVAL);
    }

    source_loop.stop();
    wait_until_idle(&processor, Duration::from_secs(5));

    let stats = processor.stats();
    if options.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_stats(&stats, start.elapsed());
    }

    if options.export {
        match processor.latest_processed_frame() {
            Some(frame) => {
                let dir = storage::export_dir(config)?;
                let path = runtime.block_on(storage::export_png_async(frame, dir))?;
                println!("Saved: {}", path.display());
            }
            None => println!("No processed frame to export"),
        }
    }

    Ok(())
}

/// Give the in-flight frame a chance to finish before reporting
fn wait_until_idle(processor: &FrameProcessor, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while processor.is_busy() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    if processor.is_busy() {
        warn!("Frame still in flight after shutdown");
    }
}

fn print_stats(stats: &StatsSnapshot, elapsed: Duration) {
    let secs = elapsed.as_secs_f64().max(f64::EPSILON);
    println!();
    println!("Ran for {:.1}s", elapsed.as_secs_f64());
    println!("  Arrived:   {}", stats.arrived);
    println!("  Admitted:  {}", stats.admitted);
    println!("  Dropped:   {}", stats.dropped);
    println!("  Rejected:  {}", stats.rejected);
    println!(
        "  Completed: {} ({:.1} fps)",
        stats.completed,
        stats.completed as f64 / secs
    );
    println!("  Admission: {:.1}%", stats.admission_ratio() * 100.0);
}
