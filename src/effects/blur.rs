use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::config::BlurSpec;
use crate::effects::composite::{BlitRect, blit_over};
use crate::foundation::core::{Canvas, CanvasFrame};
use crate::foundation::error::{MontageError, MontageResult};

/// Fixed-point scale of kernel taps.
const TAP_BITS: u32 = 16;
const TAP_ONE: u32 = 1 << TAP_BITS;

/// Blurred fit-pad backdrop: the source is squeezed to a small working size, blurred there and
/// stretched back over the whole canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Backdrop {
    /// Working width.
    pub width: u32,
    /// Working height.
    pub height: u32,
    /// Kernel radius at working resolution.
    pub radius: u32,
    /// Gaussian sigma at working resolution.
    pub sigma: f32,
}

impl Backdrop {
    /// Working size and kernel for `canvas`, with radius and sigma divided by the downscale.
    pub fn for_canvas(canvas: Canvas, blur: &BlurSpec) -> Self {
        let d = blur.downscale.max(1);
        Self {
            width: (canvas.width / d).max(1),
            height: (canvas.height / d).max(1),
            radius: match blur.radius_px {
                0 => 0,
                r => (r / d).max(1),
            },
            sigma: (blur.sigma / d as f32).max(f32::EPSILON),
        }
    }

    /// Build the canvas-sized backdrop for one premultiplied source frame.
    ///
    /// The result is opaque: transparent source regions end up over black.
    pub fn render(&self, source: &RgbaImage, canvas: Canvas) -> MontageResult<CanvasFrame> {
        let small = imageops::resize(source, self.width, self.height, FilterType::Triangle);
        let blurred =
            blur_rgba8_premul(small.as_raw(), self.width, self.height, self.radius, self.sigma)?;
        let blurred = RgbaImage::from_raw(self.width, self.height, blurred)
            .ok_or_else(|| MontageError::validation("blurred backdrop size mismatch"))?;
        let full = if (self.width, self.height) == (canvas.width, canvas.height) {
            blurred
        } else {
            imageops::resize(&blurred, canvas.width, canvas.height, FilterType::Triangle)
        };

        let mut frame = CanvasFrame::solid(canvas, [0, 0, 0, 255]);
        blit_over(
            &mut frame,
            full.as_raw(),
            canvas.width,
            canvas.height,
            BlitRect {
                src_x: 0,
                src_y: 0,
                dst_x: 0,
                dst_y: 0,
                width: canvas.width,
                height: canvas.height,
            },
        )?;
        Ok(frame)
    }
}

/// Gaussian blur of a premultiplied RGBA8 buffer, `2 * radius + 1` taps per axis.
///
/// Pixels past the border repeat the edge pixel. Flat regions come back unchanged.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> MontageResult<Vec<u8>> {
    let (w, h) = (width as usize, height as usize);
    if w.checked_mul(h).and_then(|n| n.checked_mul(4)) != Some(src.len()) {
        return Err(MontageError::validation(format!(
            "blur input is {} bytes, expected {width}x{height} RGBA8",
            src.len()
        )));
    }
    if radius == 0 || src.is_empty() {
        return Ok(src.to_vec());
    }
    let taps = gaussian_taps(radius as usize, sigma)?;

    // Each pass blurs along rows and writes the result transposed, so running it twice covers
    // both axes and restores the original layout.
    let mut transposed = vec![0u8; src.len()];
    blur_rows_into_columns(src, w, h, &taps, &mut transposed);
    let mut out = vec![0u8; src.len()];
    blur_rows_into_columns(&transposed, h, w, &taps, &mut out);
    Ok(out)
}

/// Normalized taps for offsets `-radius..=radius`, summing to exactly [`TAP_ONE`].
fn gaussian_taps(radius: usize, sigma: f32) -> MontageResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(MontageError::validation(format!(
            "blur sigma must be finite and > 0, got {sigma}"
        )));
    }
    let two_sigma_sq = 2.0 * f64::from(sigma).powi(2);
    let raw: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let d = i as f64 - radius as f64;
            (-d * d / two_sigma_sq).exp()
        })
        .collect();
    let total: f64 = raw.iter().sum();

    let scaled: Vec<f64> = raw.iter().map(|v| v / total * f64::from(TAP_ONE)).collect();
    let mut taps: Vec<u32> = scaled.iter().map(|v| v.floor() as u32).collect();
    let short = TAP_ONE - taps.iter().sum::<u32>();

    // Largest remainders first; ties go to the tap nearest the centre.
    let mut order: Vec<usize> = (0..taps.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = scaled[a] - scaled[a].floor();
        let fb = scaled[b] - scaled[b].floor();
        fb.total_cmp(&fa)
            .then_with(|| a.abs_diff(radius).cmp(&b.abs_diff(radius)))
    });
    for &i in order.iter().cycle().take(short as usize) {
        taps[i] += 1;
    }
    Ok(taps)
}

/// Convolve every row of a `w x h` image with `taps` and store row `y` as column `y` of the
/// `h x w` output.
fn blur_rows_into_columns(src: &[u8], w: usize, h: usize, taps: &[u32], dst: &mut [u8]) {
    let radius = taps.len() / 2;
    let mut line: Vec<[u8; 4]> = Vec::with_capacity(w + 2 * radius);

    for (y, row) in src.chunks_exact(w * 4).enumerate() {
        let first = [row[0], row[1], row[2], row[3]];
        let last = [row[w * 4 - 4], row[w * 4 - 3], row[w * 4 - 2], row[w * 4 - 1]];
        line.clear();
        line.extend(std::iter::repeat_n(first, radius));
        line.extend(row.chunks_exact(4).map(|p| [p[0], p[1], p[2], p[3]]));
        line.extend(std::iter::repeat_n(last, radius));

        for (x, window) in line.windows(taps.len()).enumerate() {
            let mut acc = [0u32; 4];
            for (px, &t) in window.iter().zip(taps) {
                for c in 0..4 {
                    acc[c] += t * u32::from(px[c]);
                }
            }
            let o = (x * h + y) * 4;
            for c in 0..4 {
                dst[o + c] = ((acc[c] + TAP_ONE / 2) >> TAP_BITS).min(255) as u8;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
