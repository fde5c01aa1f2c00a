use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::error::ConvertError;
use crate::geometry::Geometry;

/// One subtitle stream as reported by the probe tool, in stream order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SubtitleTrack {
    pub index: u32,
}

#[derive(Debug, Deserialize)]
struct StreamList<T> {
    #[serde(default)]
    streams: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
struct VideoStream {
    #[serde(default)]
    width: i64,
    #[serde(default)]
    height: i64,
}

/// Read-only media inspection through the external probe tool.
///
/// Probes run with the scan's base directory as working directory so the
/// same relative file names used for transcoding resolve here too.
pub struct Prober {
    program: PathBuf,
    base_dir: PathBuf,
}

impl Prober {
    pub fn new(program: impl Into<PathBuf>, base_dir: &Path) -> Self {
        Self {
            program: program.into(),
            base_dir: base_dir.to_path_buf(),
        }
    }

    /// Width and height of the first video stream.
    pub fn geometry(&self, file_name: &str) -> Result<Geometry> {
        let payload = self.run(
            &["-select_streams", "v:0", "-show_entries", "stream=width,height"],
            file_name,
        )?;
        parse_geometry(&payload, file_name)
    }

    /// Indices of every subtitle stream.
    pub fn subtitle_tracks(&self, file_name: &str) -> Result<Vec<SubtitleTrack>> {
        let payload = self.run(
            &["-select_streams", "s", "-show_entries", "stream=index"],
            file_name,
        )?;
        parse_subtitle_tracks(&payload, file_name)
    }

    fn run(&self, selection: &[&str], file_name: &str) -> Result<Vec<u8>> {
        let output = Command::new(&self.program)
            .current_dir(&self.base_dir)
            .args(["-v", "error"])
            .args(selection)
            .args(["-of", "json"])
            .arg(file_name)
            .output()
            .with_context(|| {
                format!(
                    "failed to run probe '{}' on '{file_name}'",
                    self.program.display()
                )
            })?;
        if !output.status.success() {
            bail!("probe of '{file_name}' exited with {}", output.status);
        }
        Ok(output.stdout)
    }
}

fn parse_geometry(payload: &[u8], file_name: &str) -> Result<Geometry> {
    let parsed: StreamList<VideoStream> = serde_json::from_slice(payload)
        .with_context(|| format!("unexpected probe payload for '{file_name}'"))?;
    let stream = parsed
        .streams
        .first()
        .ok_or(ConvertError::InvalidGeometry {
            width: 0,
            height: 0,
        })
        .with_context(|| format!("'{file_name}' has no video stream"))?;
    let geometry = Geometry::new(stream.width, stream.height)
        .with_context(|| format!("'{file_name}' reported unusable dimensions"))?;
    Ok(geometry)
}

fn parse_subtitle_tracks(payload: &[u8], file_name: &str) -> Result<Vec<SubtitleTrack>> {
    let parsed: StreamList<SubtitleTrack> = serde_json::from_slice(payload)
        .with_context(|| format!("unexpected probe payload for '{file_name}'"))?;
    Ok(parsed.streams)
}
