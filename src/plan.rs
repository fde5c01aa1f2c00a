use std::path::PathBuf;

use crate::geometry::CropRect;
use crate::scan::SourceVideo;

/// Constant audio bitrate the target player expects.
pub const AUDIO_BITRATE: &str = "192k";

/// Output resolution presets the target player accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetResolution {
    /// 4:3 frame, 640x480.
    Standard,
    /// 16:9 frame, 854x480.
    Wide,
}

impl TargetResolution {
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Standard => (640, 480),
            Self::Wide => (854, 480),
        }
    }

    /// The transcoder's size argument.
    pub fn arg(self) -> String {
        let (width, height) = self.dimensions();
        format!("{width}x{height}")
    }
}

/// Everything the transcode runner needs for one file. Derived per source,
/// consumed once, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionPlan {
    pub source_file: String,
    pub output_path: PathBuf,
    pub resolution: TargetResolution,
    pub crop: Option<CropRect>,
    pub subtitle: Option<String>,
    pub video_bitrate_kbps: u32,
}

/// Aspect ratio (height/width) strictly below which a widescreen frame is
/// eligible for cropping.
const CROP_RATIO_LIMIT: f64 = 0.65;

/// Aspect ratio at or above which the frame is near-4:3 already and gets the
/// 4:3 output preset without cropping.
const STANDARD_RATIO_LIMIT: f64 = 0.7;

/// Combine the source's geometry with the batch preferences into a concrete
/// per-file plan. Between the two ratio limits only the crop flag matters.
pub fn plan_conversion(
    source: &SourceVideo,
    should_crop: bool,
    video_bitrate_kbps: u32,
    subtitle: Option<String>,
    output_path: PathBuf,
) -> ConversionPlan {
    let ratio = source.geometry.aspect_ratio();

    let mut resolution = TargetResolution::Wide;
    let mut crop = None;
    if should_crop && ratio < CROP_RATIO_LIMIT {
        crop = Some(source.geometry.crop_to_4_3());
        resolution = TargetResolution::Standard;
    }
    if ratio >= STANDARD_RATIO_LIMIT {
        // The two ratio branches cannot both fire; a crop chosen above is
        // left in place.
        resolution = TargetResolution::Standard;
    }

    ConversionPlan {
        source_file: source.file_name.clone(),
        output_path,
        resolution,
        crop,
        subtitle,
        video_bitrate_kbps,
    }
}
