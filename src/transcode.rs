use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{anyhow, Context, Result};

use crate::error::ConvertError;
use crate::plan::{ConversionPlan, AUDIO_BITRATE};
use crate::progress::{DiagnosticParser, LineAccumulator};

/// Runs the external transcoder, one plan at a time.
///
/// The child's working directory is the scan's base directory so the
/// relative source and subtitle-file references in the filter chain
/// resolve; nothing mutates the converter's own working directory.
pub struct Transcoder {
    program: PathBuf,
    base_dir: PathBuf,
}

impl Transcoder {
    pub fn new(program: impl Into<PathBuf>, base_dir: &Path) -> Self {
        Self {
            program: program.into(),
            base_dir: base_dir.to_path_buf(),
        }
    }

    /// Convert one file, reporting each parsed percentage through
    /// `on_progress`. The transcoder's diagnostics arrive on stderr only;
    /// stdout is unused by the protocol.
    pub fn run(&self, plan: &ConversionPlan, mut on_progress: impl FnMut(u64)) -> Result<()> {
        let args = transcode_args(plan);
        let mut child = Command::new(&self.program)
            .current_dir(&self.base_dir)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| {
                format!("failed to spawn transcoder '{}'", self.program.display())
            })?;

        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("failed to capture transcoder stderr"))?;

        let mut accumulator = LineAccumulator::new();
        let mut parser = DiagnosticParser::new();
        let mut chunk = [0u8; 4096];
        loop {
            let read = stderr
                .read(&mut chunk)
                .context("failed reading transcoder diagnostics")?;
            if read == 0 {
                break;
            }
            accumulator.feed(&chunk[..read], |line| {
                if let Some(percent) = parser.observe(&line) {
                    on_progress(percent);
                }
            });
        }

        let status = child.wait().context("failed waiting for transcoder process")?;
        if !status.success() {
            return Err(ConvertError::TranscodeFailed {
                log: parser.into_transcript(),
            }
            .into());
        }
        Ok(())
    }
}

/// Full argument list for one conversion. The tool is order-sensitive:
/// input first, codec pair, bitrates, size, then the optional filter chain
/// (crop before subtitle), and the output path last.
pub fn transcode_args(plan: &ConversionPlan) -> Vec<String> {
    let mut args = vec![
        "-i".to_owned(),
        plan.source_file.clone(),
        "-vcodec".to_owned(),
        "mpeg4".to_owned(),
        "-vtag".to_owned(),
        "xvid".to_owned(),
        "-acodec".to_owned(),
        "libmp3lame".to_owned(),
        "-b:v".to_owned(),
        format!("{}k", plan.video_bitrate_kbps),
        "-b:a".to_owned(),
        AUDIO_BITRATE.to_owned(),
        "-s".to_owned(),
        plan.resolution.arg(),
    ];

    let mut filters = Vec::new();
    if let Some(crop) = &plan.crop {
        filters.push(crop.filter());
    }
    if let Some(subtitle) = &plan.subtitle {
        filters.push(subtitle.clone());
    }
    if !filters.is_empty() {
        args.push("-vf".to_owned());
        args.push(filters.join(","));
    }

    args.push(plan.output_path.to_string_lossy().into_owned());
    args
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::transcode_args;
    use crate::geometry::Geometry;
    use crate::plan::{ConversionPlan, TargetResolution};

    fn bare_plan() -> ConversionPlan {
        ConversionPlan {
            source_file: "movie.mkv".to_owned(),
            output_path: PathBuf::from("/out/movie.avi"),
            resolution: TargetResolution::Wide,
            crop: None,
            subtitle: None,
            video_bitrate_kbps: 3000,
        }
    }

    #[test]
    fn argument_order_matches_the_tool_protocol() {
        let args = transcode_args(&bare_plan());
        assert_eq!(
            args,
            vec![
                "-i",
                "movie.mkv",
                "-vcodec",
                "mpeg4",
                "-vtag",
                "xvid",
                "-acodec",
                "libmp3lame",
                "-b:v",
                "3000k",
                "-b:a",
                "192k",
                "-s",
                "854x480",
                "/out/movie.avi",
            ]
        );
    }

    #[test]
    fn filter_chain_orders_crop_before_subtitle() {
        let geometry = Geometry::new(1920, 1080).expect("geometry should validate");
        let mut plan = bare_plan();
        plan.resolution = TargetResolution::Standard;
        plan.crop = Some(geometry.crop_to_4_3());
        plan.subtitle = Some("subtitles=movie.srt".to_owned());

        let args = transcode_args(&plan);
        let vf_position = args
            .iter()
            .position(|arg| arg == "-vf")
            .expect("filter flag should be present");
        assert_eq!(args[vf_position + 1], "crop=1440:1080:240:0,subtitles=movie.srt");
        assert_eq!(args[args.len() - 1], "/out/movie.avi");
    }

    #[test]
    fn lone_subtitle_filter_is_passed_unjoined() {
        let mut plan = bare_plan();
        plan.subtitle = Some("subtitles=movie.mkv:si=1".to_owned());

        let args = transcode_args(&plan);
        let vf_position = args
            .iter()
            .position(|arg| arg == "-vf")
            .expect("filter flag should be present");
        assert_eq!(args[vf_position + 1], "subtitles=movie.mkv:si=1");
    }

    #[test]
    fn no_filters_means_no_filter_flag() {
        let args = transcode_args(&bare_plan());
        assert!(!args.contains(&"-vf".to_owned()));
    }
}
