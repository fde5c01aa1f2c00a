use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::ConvertError;
use crate::probe::SubtitleTrack;

/// Subtitle file extensions the target player's burn-in path understands.
pub const SUBTITLE_EXTS: &[&str] = &["ass", "ssa", "srt"];

/// What the user asked for, fixed for the whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleIntent {
    /// No burn-in.
    None,
    /// Search the source directory for a matching subtitle file.
    External,
    /// Burn the internal subtitle stream at this 0-based index.
    Track(usize),
}

impl SubtitleIntent {
    /// Parse the CLI keyword: `none`, `external`, or a bare track index.
    pub fn from_keyword(value: &str) -> Result<Self, String> {
        let value = value.trim();
        match value.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "external" | "ext" => Ok(Self::External),
            other => other.parse::<usize>().map(Self::Track).map_err(|_| {
                format!(
                    "invalid subtitle mode '{value}': expected 'none', 'external' or a track index"
                )
            }),
        }
    }
}

/// Search `base_dir` for a subtitle file whose stem contains the source's
/// stem. The listing is sorted by file name first, so the first-match rule
/// does not depend on platform directory order.
pub fn find_external(base_dir: &Path, source_file: &str) -> Result<Option<String>> {
    let source_stem = stem_of(source_file);
    let mut names = Vec::new();
    for entry in fs::read_dir(base_dir)
        .with_context(|| format!("failed to read directory {}", base_dir.display()))?
    {
        let entry = entry
            .with_context(|| format!("failed reading directory entry in {}", base_dir.display()))?;
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_owned());
        }
    }
    names.sort();

    for name in names {
        if SUBTITLE_EXTS.contains(&extension_of(&name).as_str())
            && stem_of(&name).contains(source_stem)
        {
            return Ok(Some(format!("subtitles={name}")));
        }
    }
    Ok(None)
}

/// Directive for burning the internal subtitle stream at `index`, if the
/// source has one there.
pub fn select_internal(
    source_file: &str,
    tracks: &[SubtitleTrack],
    index: usize,
) -> Result<String, ConvertError> {
    if index >= tracks.len() {
        return Err(ConvertError::SubtitleTrackNotFound {
            index,
            available: tracks.len(),
        });
    }
    Ok(format!("subtitles={source_file}:si={index}"))
}

fn stem_of(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or(name)
}

fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::{find_external, select_internal, SubtitleIntent};
    use crate::error::ConvertError;
    use crate::probe::SubtitleTrack;

    fn touch(dir: &std::path::Path, name: &str) {
        fs::write(dir.join(name), b"").expect("fixture file should write");
    }

    #[test]
    fn keyword_parsing_covers_all_modes() {
        assert_eq!(
            SubtitleIntent::from_keyword("none"),
            Ok(SubtitleIntent::None)
        );
        assert_eq!(
            SubtitleIntent::from_keyword("External"),
            Ok(SubtitleIntent::External)
        );
        assert_eq!(
            SubtitleIntent::from_keyword("2"),
            Ok(SubtitleIntent::Track(2))
        );
        assert!(SubtitleIntent::from_keyword("bogus").is_err());
    }

    #[test]
    fn external_search_matches_on_stem_and_extension() {
        let dir = tempdir().expect("tempdir should create");
        touch(dir.path(), "movie.mkv");
        touch(dir.path(), "movie.srt");
        touch(dir.path(), "unrelated.srt");

        let directive = find_external(dir.path(), "movie.mkv").expect("search should run");
        assert_eq!(directive, Some("subtitles=movie.srt".to_owned()));
    }

    #[test]
    fn external_search_accepts_decorated_stems() {
        let dir = tempdir().expect("tempdir should create");
        touch(dir.path(), "movie.chs.ASS");

        let directive = find_external(dir.path(), "movie.mkv").expect("search should run");
        assert_eq!(directive, Some("subtitles=movie.chs.ASS".to_owned()));
    }

    #[test]
    fn external_search_is_deterministic_under_sorting() {
        let dir = tempdir().expect("tempdir should create");
        touch(dir.path(), "movie.b.srt");
        touch(dir.path(), "movie.a.srt");

        let directive = find_external(dir.path(), "movie.mkv").expect("search should run");
        assert_eq!(directive, Some("subtitles=movie.a.srt".to_owned()));
    }

    #[test]
    fn external_search_ignores_other_extensions() {
        let dir = tempdir().expect("tempdir should create");
        touch(dir.path(), "movie.txt");
        touch(dir.path(), "movie.sub");

        let directive = find_external(dir.path(), "movie.mkv").expect("search should run");
        assert_eq!(directive, None);
    }

    #[test]
    fn internal_selection_embeds_source_and_index() {
        let tracks = vec![SubtitleTrack { index: 2 }, SubtitleTrack { index: 3 }];
        let directive =
            select_internal("movie.mkv", &tracks, 1).expect("track 1 should resolve");
        assert_eq!(directive, "subtitles=movie.mkv:si=1");
    }

    #[test]
    fn internal_selection_rejects_out_of_range_index() {
        let tracks = vec![SubtitleTrack { index: 2 }];
        let error = select_internal("movie.mkv", &tracks, 1).expect_err("index 1 is out of range");
        assert_eq!(
            error,
            ConvertError::SubtitleTrackNotFound {
                index: 1,
                available: 1
            }
        );
    }

    #[test]
    fn internal_selection_on_empty_track_list_never_panics() {
        let error = select_internal("movie.mkv", &[], 0).expect_err("no tracks available");
        assert_eq!(
            error,
            ConvertError::SubtitleTrackNotFound {
                index: 0,
                available: 0
            }
        );
    }
}
