use crate::error::ConvertError;

/// Pixel dimensions of a source video's primary stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    width: u32,
    height: u32,
}

impl Geometry {
    /// Validate probe-reported dimensions. Anything non-positive is a
    /// malformed probe result, not a video we can plan for.
    pub fn new(width: i64, height: i64) -> Result<Self, ConvertError> {
        if width <= 0 || height <= 0 {
            return Err(ConvertError::InvalidGeometry { width, height });
        }
        Ok(Self {
            width: width as u32,
            height: height as u32,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Height over width. The planner's thresholds are calibrated to this
    /// orientation, not the conventional width/height.
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.height) / f64::from(self.width)
    }

    /// Centered 4:3 window spanning the full frame height. Computed for
    /// every source; whether it is applied is the planner's call.
    pub fn crop_to_4_3(&self) -> CropRect {
        let crop_width = self.height.saturating_mul(4) / 3;
        let x_offset = self.width.saturating_sub(crop_width) / 2;
        CropRect {
            width: crop_width,
            height: self.height,
            x_offset,
            y_offset: 0,
        }
    }
}

/// The sub-region of the original frame retained after cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub width: u32,
    pub height: u32,
    pub x_offset: u32,
    pub y_offset: u32,
}

impl CropRect {
    /// Render as the transcoder's crop filter token.
    pub fn filter(&self) -> String {
        format!(
            "crop={}:{}:{}:{}",
            self.width, self.height, self.x_offset, self.y_offset
        )
    }
}
