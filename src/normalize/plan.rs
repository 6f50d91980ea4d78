use crate::config::BlurSpec;
use crate::effects::blur::Backdrop;
use crate::foundation::core::Canvas;
use crate::foundation::error::{MontageError, MontageResult};

/// Orientation class of a source, which selects the normalization policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// `width > height`: fill-crop.
    Landscape,
    /// `width <= height`: fit over a blurred background.
    PortraitOrSquare,
}

impl Orientation {
    /// Classify by comparing native width to height.
    pub fn classify(width: u32, height: u32) -> Self {
        if width > height {
            Self::Landscape
        } else {
            Self::PortraitOrSquare
        }
    }
}

/// Pure per-asset transform: how one source frame maps onto the canvas.
///
/// The plan depends only on source size, canvas size and blur settings, so it is computed once
/// per asset and shared by every frame of a clip.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizePlan {
    /// Output canvas.
    pub canvas: Canvas,
    /// Source width in pixels.
    pub source_width: u32,
    /// Source height in pixels.
    pub source_height: u32,
    /// Policy selector.
    pub orientation: Orientation,
    /// Uniform scale factor applied to the source.
    pub scale: f64,
    /// Width of the scaled foreground.
    pub scaled_width: u32,
    /// Height of the scaled foreground.
    pub scaled_height: u32,
    /// Left edge of the region taken from the scaled foreground (crop).
    pub crop_x: u32,
    /// Top edge of the region taken from the scaled foreground (crop).
    pub crop_y: u32,
    /// Where the region lands on the canvas (pad).
    pub dst_x: u32,
    /// Where the region lands on the canvas (pad).
    pub dst_y: u32,
    /// Region width.
    pub copy_width: u32,
    /// Region height.
    pub copy_height: u32,
    /// Blurred backdrop for fit-pad; `None` means a black base (fill-crop).
    pub background: Option<Backdrop>,
}

impl NormalizePlan {
    /// Compute the transform for a `source_width x source_height` source.
    pub fn compute(
        source_width: u32,
        source_height: u32,
        canvas: Canvas,
        blur: &BlurSpec,
    ) -> MontageResult<Self> {
        if source_width == 0 || source_height == 0 {
            return Err(MontageError::decode(format!(
                "source frame has zero area ({source_width}x{source_height})"
            )));
        }
        canvas.validate()?;

        let (sw, sh) = (f64::from(source_width), f64::from(source_height));
        let (cw, ch) = (f64::from(canvas.width), f64::from(canvas.height));
        let orientation = Orientation::classify(source_width, source_height);

        match orientation {
            Orientation::Landscape => {
                let scale = ch / sh;
                let scaled_width = ((sw * scale).round() as u32).max(1);
                let scaled_height = canvas.height;
                let (crop_x, dst_x, copy_width) = if scaled_width >= canvas.width {
                    ((scaled_width - canvas.width) / 2, 0, canvas.width)
                } else {
                    (0, (canvas.width - scaled_width) / 2, scaled_width)
                };
                Ok(Self {
                    canvas,
                    source_width,
                    source_height,
                    orientation,
                    scale,
                    scaled_width,
                    scaled_height,
                    crop_x,
                    crop_y: 0,
                    dst_x,
                    dst_y: 0,
                    copy_width,
                    copy_height: scaled_height,
                    background: None,
                })
            }
            Orientation::PortraitOrSquare => {
                let scale = (cw / sw).min(ch / sh);
                // Truncate like integer pixel math, tolerating float error just below a whole pixel.
                let scaled_width = ((sw * scale + 1e-6) as u32).clamp(1, canvas.width);
                let scaled_height = ((sh * scale + 1e-6) as u32).clamp(1, canvas.height);
                let background = Backdrop::for_canvas(canvas, blur);
                Ok(Self {
                    canvas,
                    source_width,
                    source_height,
                    orientation,
                    scale,
                    scaled_width,
                    scaled_height,
                    crop_x: 0,
                    crop_y: 0,
                    dst_x: (canvas.width - scaled_width) / 2,
                    dst_y: (canvas.height - scaled_height) / 2,
                    copy_width: scaled_width,
                    copy_height: scaled_height,
                    background: Some(background),
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/normalize/plan.rs"]
mod tests;
