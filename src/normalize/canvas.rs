use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::effects::composite::{BlitRect, blit_over};
use crate::foundation::core::CanvasFrame;
use crate::foundation::error::{MontageError, MontageResult};
use crate::normalize::plan::NormalizePlan;

const RESAMPLE: FilterType = FilterType::Triangle;

/// Apply `plan` to one decoded source frame and return a fresh canvas frame.
///
/// `pixels` is premultiplied RGBA8 of the plan's source size. It is consumed, so the decoded
/// buffer is released as soon as the canvas frame exists. For fit-pad plans the blurred
/// backdrop is derived from this same frame.
pub fn normalize_frame(plan: &NormalizePlan, pixels: Vec<u8>) -> MontageResult<CanvasFrame> {
    let source = RgbaImage::from_raw(plan.source_width, plan.source_height, pixels)
        .ok_or_else(|| {
            MontageError::decode(format!(
                "decoded frame does not match {}x{} RGBA8",
                plan.source_width, plan.source_height
            ))
        })?;

    let mut frame = match plan.background {
        Some(backdrop) => backdrop.render(&source, plan.canvas)?,
        None => CanvasFrame::solid(plan.canvas, [0, 0, 0, 255]),
    };

    let fg = if plan.scaled_width == plan.source_width && plan.scaled_height == plan.source_height
    {
        source
    } else {
        imageops::resize(&source, plan.scaled_width, plan.scaled_height, RESAMPLE)
    };

    blit_over(
        &mut frame,
        fg.as_raw(),
        fg.width(),
        fg.height(),
        BlitRect {
            src_x: plan.crop_x,
            src_y: plan.crop_y,
            dst_x: i64::from(plan.dst_x),
            dst_y: i64::from(plan.dst_y),
            width: plan.copy_width,
            height: plan.copy_height,
        },
    )?;
    Ok(frame)
}

#[cfg(test)]
#[path = "../../tests/unit/normalize/canvas.rs"]
mod tests;
