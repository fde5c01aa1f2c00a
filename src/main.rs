mod batch;
mod error;
mod geometry;
mod plan;
mod probe;
mod progress;
mod scan;
mod subtitle;
mod transcode;

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use crate::batch::{run_batch, summarize, BatchOptions, BatchOutcome};
use crate::scan::scan_sources;
use crate::subtitle::SubtitleIntent;
use crate::transcode::Transcoder;

const PROBE_PROGRAM: &str = "ffprobe";
const TRANSCODE_PROGRAM: &str = "ffmpeg";

#[derive(Debug, Parser)]
#[command(name = "smsvc")]
#[command(about = "Batch video converter for the PS2 Simple Media System player")]
#[command(version = build_version())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert every video found at SOURCE into the output directory.
    Convert {
        /// Source video file, or a directory scanned shallowly.
        source: PathBuf,

        /// Directory receiving the converted files; created when missing if
        /// its parent exists.
        #[arg(short = 'o', long = "output-dir")]
        output_dir: PathBuf,

        /// Video bitrate in kbps.
        #[arg(long, default_value_t = 3000, value_parser = clap::value_parser!(u32).range(1000..=9000))]
        bitrate: u32,

        /// Crop widescreen sources to 4:3 instead of letterboxing.
        #[arg(long)]
        crop: bool,

        /// Subtitle burn-in: 'none', 'external', or an internal track index
        /// (the first track is 0).
        #[arg(long, default_value = "none", value_parser = SubtitleIntent::from_keyword)]
        subtitles: SubtitleIntent,

        /// Replace outputs that already exist.
        #[arg(long)]
        overwrite: bool,
    },
    /// Probe SOURCE and report geometry and subtitle tracks without
    /// converting anything.
    Inspect {
        /// Source video file or directory.
        source: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            source,
            output_dir,
            bitrate,
            crop,
            subtitles,
            overwrite,
        } => run_convert(
            &source,
            BatchOptions {
                output_dir,
                video_bitrate_kbps: bitrate,
                should_crop: crop,
                subtitles,
                overwrite,
            },
        ),
        Commands::Inspect { source } => run_inspect(&source),
    }
}

fn run_convert(source: &Path, options: BatchOptions) -> Result<()> {
    println!(
        "## Welcome to SMS Video Converter v{}! ##",
        env!("CARGO_PKG_VERSION")
    );

    let scanned = scan_sources(source, PROBE_PROGRAM)?;
    let transcoder = Transcoder::new(TRANSCODE_PROGRAM, &scanned.base_dir);
    let reports = run_batch(&scanned.base_dir, &scanned.sources, &options, &transcoder)?;

    let summary = summarize(&reports);
    println!(
        "# {} completed, {} skipped, {} failed",
        summary.completed, summary.skipped, summary.failed
    );
    for report in &reports {
        if let BatchOutcome::Failed { diagnostics } = &report.outcome {
            println!("# Conversion log for {}:", report.file_name);
            println!("{diagnostics}");
        }
    }
    if summary.failed > 0 {
        bail!("{} of {} conversions failed", summary.failed, reports.len());
    }
    Ok(())
}

fn run_inspect(source: &Path) -> Result<()> {
    let scanned = scan_sources(source, PROBE_PROGRAM)?;

    for video in &scanned.sources {
        let tracks = video
            .subtitle_tracks
            .iter()
            .map(|track| track.index.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{}: {}x{} (ratio {:.4}), subtitle tracks: [{tracks}]",
            video.file_name,
            video.geometry.width(),
            video.geometry.height(),
            video.geometry.aspect_ratio(),
        );
    }
    Ok(())
}

fn build_version() -> String {
    match option_env!("SMSVC_GIT_HASH") {
        Some(hash) => format!("{} ({hash})", env!("CARGO_PKG_VERSION")),
        None => env!("CARGO_PKG_VERSION").to_owned(),
    }
}
