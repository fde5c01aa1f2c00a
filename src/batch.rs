use std::ffi::OsStr;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::ConvertError;
use crate::plan::plan_conversion;
use crate::scan::SourceVideo;
use crate::subtitle::{self, SubtitleIntent};
use crate::transcode::Transcoder;

/// Container extension of every converted file.
pub const OUTPUT_EXT: &str = "avi";

/// Batch-wide settings, fixed before the first conversion.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub output_dir: PathBuf,
    pub video_bitrate_kbps: u32,
    pub should_crop: bool,
    pub subtitles: SubtitleIntent,
    pub overwrite: bool,
}

/// What happened to one source file. Recorded once, never revisited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Completed,
    Skipped { reason: String },
    Failed { diagnostics: String },
}

/// One recorded outcome with the file it belongs to.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub file_name: String,
    pub outcome: BatchOutcome,
}

/// Totals over a finished batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub fn summarize(reports: &[FileReport]) -> BatchSummary {
    let mut summary = BatchSummary {
        completed: 0,
        skipped: 0,
        failed: 0,
    };
    for report in reports {
        match report.outcome {
            BatchOutcome::Completed => summary.completed += 1,
            BatchOutcome::Skipped { .. } => summary.skipped += 1,
            BatchOutcome::Failed { .. } => summary.failed += 1,
        }
    }
    summary
}

/// Output path for one source: same stem, fixed container extension,
/// inside the output directory.
pub fn output_path_for(output_dir: &Path, source_file: &str) -> PathBuf {
    let stem = Path::new(source_file)
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or(source_file);
    output_dir.join(format!("{stem}.{OUTPUT_EXT}"))
}

/// Convert every scanned source in order, one child process at a time.
///
/// A failed transcode is recorded and the batch moves on; only environment
/// errors (unremovable outputs, missing output directory parent) abort.
pub fn run_batch(
    base_dir: &Path,
    sources: &[SourceVideo],
    options: &BatchOptions,
    transcoder: &Transcoder,
) -> Result<Vec<FileReport>> {
    ensure_output_dir(&options.output_dir)?;

    let total = sources.len();
    let mut reports = Vec::with_capacity(total);
    for (position, source) in sources.iter().enumerate() {
        let line = ProgressLine::begin(format!(
            " {}: Converting {}...",
            sequence_tag(position + 1, total),
            source.file_name
        ));

        let output_path = output_path_for(&options.output_dir, &source.file_name);
        if output_path.exists() {
            if !options.overwrite {
                let reason = "file already existed".to_owned();
                line.finish(&format!("Skipped, {reason}!"));
                reports.push(FileReport {
                    file_name: source.file_name.clone(),
                    outcome: BatchOutcome::Skipped { reason },
                });
                continue;
            }
            fs::remove_file(&output_path).with_context(|| {
                format!("failed to remove existing output {}", output_path.display())
            })?;
        }

        let directive = resolve_subtitles(base_dir, source, options.subtitles);
        let plan = plan_conversion(
            source,
            options.should_crop,
            options.video_bitrate_kbps,
            directive,
            output_path,
        );

        let outcome = match transcoder.run(&plan, |percent| line.update_percent(percent)) {
            Ok(()) => {
                line.finish("Completed");
                BatchOutcome::Completed
            }
            Err(error) => {
                line.finish("Failed");
                let diagnostics = match error.downcast_ref::<ConvertError>() {
                    Some(ConvertError::TranscodeFailed { log }) => log.clone(),
                    _ => format!("{error:#}"),
                };
                BatchOutcome::Failed { diagnostics }
            }
        };
        reports.push(FileReport {
            file_name: source.file_name.clone(),
            outcome,
        });
    }
    Ok(reports)
}

fn resolve_subtitles(
    base_dir: &Path,
    source: &SourceVideo,
    intent: SubtitleIntent,
) -> Option<String> {
    match intent {
        SubtitleIntent::None => None,
        SubtitleIntent::External => {
            match subtitle::find_external(base_dir, &source.file_name) {
                Ok(directive) => directive,
                Err(error) => {
                    eprintln!("\n# Subtitle search failed: {error:#}");
                    None
                }
            }
        }
        SubtitleIntent::Track(index) => {
            match subtitle::select_internal(&source.file_name, &source.subtitle_tracks, index) {
                Ok(directive) => Some(directive),
                Err(error) => {
                    println!("\n# {error}");
                    None
                }
            }
        }
    }
}

/// Create the output directory when missing; its parent must already exist.
fn ensure_output_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir(dir).with_context(|| {
        format!("output directory {} could not be created", dir.display())
    })?;
    Ok(())
}

/// Zero-padded `index/total` tag, width fixed by the total.
fn sequence_tag(index: usize, total: usize) -> String {
    let width = total.to_string().len();
    format!("{index:0width$}/{total}")
}

/// One console line redrawn in place through the life of a conversion.
struct ProgressLine {
    label: String,
}

impl ProgressLine {
    fn begin(label: String) -> Self {
        print!("\r{label}");
        let _ = io::stdout().flush();
        Self { label }
    }

    fn update_percent(&self, percent: u64) {
        print!("\r{} {percent}%", self.label);
        let _ = io::stdout().flush();
    }

    fn finish(&self, suffix: &str) {
        println!("\r{} {suffix}", self.label);
    }
}
