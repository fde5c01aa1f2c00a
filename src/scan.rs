use std::ffi::OsStr;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};

use crate::geometry::Geometry;
use crate::probe::{Prober, SubtitleTrack};

/// Video container extensions the converter accepts.
pub const VIDEO_EXTS: &[&str] = &[
    "mkv", "mp4", "avi", "rmvb", "rm", "mov", "flv", "mpg", "mpeg", "wmv",
];

/// One video accepted for conversion, probed once during the scan and
/// immutable afterward.
#[derive(Debug, Clone)]
pub struct SourceVideo {
    /// File name relative to the scan's base directory.
    pub file_name: String,
    pub geometry: Geometry,
    pub subtitle_tracks: Vec<SubtitleTrack>,
}

/// A scanned source location: the directory conversions run relative to,
/// and the videos found inside it in sorted file-name order.
#[derive(Debug)]
pub struct ScanResult {
    pub base_dir: PathBuf,
    pub sources: Vec<SourceVideo>,
}

pub fn is_video_file(name: &str) -> bool {
    let extension = Path::new(name)
        .extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    VIDEO_EXTS.contains(&extension.as_str())
}

/// Discover and probe the videos at `path` (a file or a directory, scanned
/// shallowly). A file that cannot be probed is reported and left out rather
/// than sinking the whole batch.
pub fn scan_sources(path: &Path, probe_program: &str) -> Result<ScanResult> {
    let (base_dir, candidates) = list_candidates(path)?;

    print!("# Scanning...");
    let _ = io::stdout().flush();

    let prober = Prober::new(probe_program, &base_dir);
    let mut sources = Vec::new();
    for name in candidates {
        if !is_video_file(&name) {
            continue;
        }
        match probe_source(&prober, &name) {
            Ok(source) => sources.push(source),
            Err(error) => eprintln!("\n# Skipping '{name}': {error:#}"),
        }
    }
    println!("\r# Scanning... Done");

    if sources.is_empty() {
        bail!("No video found in the given path.");
    }
    Ok(ScanResult { base_dir, sources })
}

fn probe_source(prober: &Prober, file_name: &str) -> Result<SourceVideo> {
    let geometry = prober.geometry(file_name)?;
    let subtitle_tracks = prober.subtitle_tracks(file_name)?;
    Ok(SourceVideo {
        file_name: file_name.to_owned(),
        geometry,
        subtitle_tracks,
    })
}

/// Resolve the scan root: a directory is listed shallowly in sorted order; a
/// single file stands alone with its parent as base directory.
fn list_candidates(path: &Path) -> Result<(PathBuf, Vec<String>)> {
    if !path.exists() {
        bail!("path '{}' does not exist", path.display());
    }

    if path.is_dir() {
        let mut names = Vec::new();
        for entry in fs::read_dir(path)
            .with_context(|| format!("failed to read directory {}", path.display()))?
        {
            let entry = entry
                .with_context(|| format!("failed reading directory entry in {}", path.display()))?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_owned());
            }
        }
        names.sort();
        return Ok((path.to_path_buf(), names));
    }

    let name = path
        .file_name()
        .and_then(OsStr::to_str)
        .ok_or_else(|| anyhow!("source file name '{}' is not valid UTF-8", path.display()))?
        .to_owned();
    let base_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((base_dir, vec![name]))
}
