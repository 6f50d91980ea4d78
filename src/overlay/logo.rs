use std::path::Path;

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::foundation::error::{MontageError, MontageResult};
use crate::media::decode::decode_image_file;

/// Brand mark rasterized at its display height (premultiplied RGBA8).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogoRaster {
    /// Width in pixels, following the source aspect ratio.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes.
    pub data: Vec<u8>,
}

/// Load a PNG/JPEG or SVG brand mark scaled to `height_px`.
pub fn load_logo(path: &Path, height_px: u32) -> MontageResult<LogoRaster> {
    if height_px == 0 {
        return Err(MontageError::validation("logo height must be > 0"));
    }
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if is_svg {
        rasterize_svg_logo(path, height_px)
    } else {
        resize_raster_logo(path, height_px)
    }
}

fn scaled_width(width: f64, height: f64, height_px: u32) -> u32 {
    ((width * f64::from(height_px) / height).round() as u32).max(1)
}

fn resize_raster_logo(path: &Path, height_px: u32) -> MontageResult<LogoRaster> {
    let decoded = decode_image_file(path)?;
    let width = scaled_width(
        f64::from(decoded.width),
        f64::from(decoded.height),
        height_px,
    );
    let img = RgbaImage::from_raw(decoded.width, decoded.height, decoded.rgba8_premul)
        .ok_or_else(|| MontageError::decode("logo pixel buffer size mismatch"))?;
    let resized = imageops::resize(&img, width, height_px, FilterType::Triangle);
    Ok(LogoRaster {
        width,
        height: height_px,
        data: resized.into_raw(),
    })
}

fn rasterize_svg_logo(path: &Path, height_px: u32) -> MontageResult<LogoRaster> {
    let bytes = std::fs::read(path).map_err(|e| {
        MontageError::decode(format!("failed to read logo '{}': {e}", path.display()))
    })?;
    let tree = usvg::Tree::from_data(&bytes, &usvg::Options::default())
        .map_err(|e| MontageError::decode(format!("invalid svg logo: {e}")))?;
    let size = tree.size();
    if !size.width().is_finite() || size.width() <= 0.0 || size.height() <= 0.0 {
        return Err(MontageError::decode("svg logo has invalid width/height"));
    }
    let width = scaled_width(
        f64::from(size.width()),
        f64::from(size.height()),
        height_px,
    );

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height_px)
        .ok_or_else(|| MontageError::decode("failed to allocate svg pixmap"))?;
    let sx = width as f32 / size.width();
    let sy = height_px as f32 / size.height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );
    Ok(LogoRaster {
        width,
        height: height_px,
        data: pixmap.data().to_vec(),
    })
}
