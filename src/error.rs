use std::fmt;

/// Failure kinds the conversion pipeline tells apart by name.
///
/// `SubtitleTrackNotFound` is recoverable and handled where it occurs; the
/// other kinds travel up through `anyhow::Error` and can be recovered by
/// downcasting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// The probe reported a video stream with unusable dimensions.
    InvalidGeometry { width: i64, height: i64 },
    /// The requested internal subtitle track does not exist.
    SubtitleTrackNotFound { index: usize, available: usize },
    /// The external transcoder exited non-zero; `log` is its full
    /// diagnostic transcript.
    TranscodeFailed { log: String },
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGeometry { width, height } => {
                write!(
                    f,
                    "invalid video geometry {width}x{height}: both dimensions must be positive"
                )
            }
            Self::SubtitleTrackNotFound { index, available } => {
                write!(
                    f,
                    "subtitle stream {index} not found ({available} available)"
                )
            }
            Self::TranscodeFailed { log } => {
                write!(f, "transcoder exited with an error:\n{log}")
            }
        }
    }
}

impl std::error::Error for ConvertError {}
