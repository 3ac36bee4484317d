// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use visionedge::Config;
use visionedge::filters::FilterMode;

mod cli;

#[derive(Parser)]
#[command(name = "visionedge")]
#[command(about = "Real-time edge detection for camera frames")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Live preview in the terminal (default)
    Preview {
        /// Still image to use as the frame source (default: test pattern)
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Initial filter mode (original, grayscale, edge)
        #[arg(short, long)]
        mode: Option<FilterMode>,
    },

    /// Filter a single image file and write a PNG
    Process {
        /// Input image
        input: PathBuf,

        /// Output file path (default: export directory, visionedge_TIMESTAMP.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Filter mode (original, grayscale, edge)
        #[arg(short, long)]
        mode: Option<FilterMode>,
    },

    /// Run the pipeline headless and report frame statistics
    Stream {
        /// Run time in seconds (until Ctrl+C when omitted)
        #[arg(short, long)]
        duration: Option<u64>,

        /// Source frame rate
        #[arg(short, long)]
        fps: Option<u32>,

        /// Filter mode (original, grayscale, edge)
        #[arg(short, long)]
        mode: Option<FilterMode>,

        /// Still image to use as the frame source (default: test pattern)
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Export the last processed frame when done
        #[arg(short, long)]
        export: bool,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Initialize logging
    // RUST_LOG takes precedence over the configured filter
    // Examples: RUST_LOG=debug, RUST_LOG=visionedge=trace, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.log_filter))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        None => cli::preview(None, None, &config),
        Some(Commands::Preview { image, mode }) => cli::preview(image, mode, &config),
        Some(Commands::Process {
            input,
            output,
            mode,
        }) => cli::process_image(input, output, mode, &config),
        Some(Commands::Stream {
            duration,
            fps,
            mode,
            image,
            export,
            json,
        }) => cli::stream(
            cli::StreamOptions {
                duration,
                fps,
                mode,
                image,
                export,
                json,
            },
            &config,
        ),
    }
}
