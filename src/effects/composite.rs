use crate::foundation::core::CanvasFrame;
use crate::foundation::error::{MontageError, MontageResult};
use crate::foundation::math::{mul_div255_u8, unit_to_u8_weight};

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over for premultiplied pixels with an extra opacity multiplier.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let op = unit_to_u8_weight(opacity);
    if op == 0 || src[3] == 0 {
        return dst;
    }

    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// A rectangular premultiplied layer and where it lands on the canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedLayer {
    /// Layer width in pixels.
    pub width: u32,
    /// Layer height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes.
    pub data: Vec<u8>,
    /// Left edge on the canvas; may be negative (clipped).
    pub x: i64,
    /// Top edge on the canvas; may be negative (clipped).
    pub y: i64,
}

impl PlacedLayer {
    /// Composite this layer over `dst`, clipping to the frame bounds.
    pub fn draw_over(&self, dst: &mut CanvasFrame) -> MontageResult<()> {
        blit_over(
            dst,
            &self.data,
            self.width,
            self.height,
            BlitRect {
                src_x: 0,
                src_y: 0,
                dst_x: self.x,
                dst_y: self.y,
                width: self.width,
                height: self.height,
            },
        )
    }
}

/// Region copied by [`blit_over`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlitRect {
    /// Left edge inside the source.
    pub src_x: u32,
    /// Top edge inside the source.
    pub src_y: u32,
    /// Left edge on the destination; may be negative.
    pub dst_x: i64,
    /// Top edge on the destination; may be negative.
    pub dst_y: i64,
    /// Region width.
    pub width: u32,
    /// Region height.
    pub height: u32,
}

/// Composite a region of `src` over `dst`. Opaque source rows are copied directly.
pub fn blit_over(
    dst: &mut CanvasFrame,
    src: &[u8],
    src_width: u32,
    src_height: u32,
    rect: BlitRect,
) -> MontageResult<()> {
    if src.len() != (src_width as usize) * (src_height as usize) * 4 {
        return Err(MontageError::validation(
            "blit_over expects src matching width*height*4",
        ));
    }
    if rect.src_x.saturating_add(rect.width) > src_width
        || rect.src_y.saturating_add(rect.height) > src_height
    {
        return Err(MontageError::validation("blit_over source rect out of bounds"));
    }

    let dw = i64::from(dst.width);
    let dh = i64::from(dst.height);
    let x0 = rect.dst_x.max(0);
    let y0 = rect.dst_y.max(0);
    let x1 = (rect.dst_x + i64::from(rect.width)).min(dw);
    let y1 = (rect.dst_y + i64::from(rect.height)).min(dh);
    if x0 >= x1 || y0 >= y1 {
        return Ok(());
    }

    let span = ((x1 - x0) as usize) * 4;
    for y in y0..y1 {
        let sy = (i64::from(rect.src_y) + (y - rect.dst_y)) as usize;
        let sx = (i64::from(rect.src_x) + (x0 - rect.dst_x)) as usize;
        let s_off = (sy * src_width as usize + sx) * 4;
        let d_off = ((y as usize) * dst.width as usize + x0 as usize) * 4;
        let s_row = &src[s_off..s_off + span];
        let d_row = &mut dst.data[d_off..d_off + span];
        if s_row.chunks_exact(4).all(|px| px[3] == 255) {
            d_row.copy_from_slice(s_row);
            continue;
        }
        for (d, s) in d_row.chunks_exact_mut(4).zip(s_row.chunks_exact(4)) {
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], 1.0);
            d.copy_from_slice(&out);
        }
    }
    Ok(())
}

/// Fade `top` in over `under` with weight `alpha` into a new frame.
///
/// Neither input is modified, so both sides of a transition keep their original pixels.
pub fn fade_in_over(under: &CanvasFrame, top: &CanvasFrame, alpha: f32) -> MontageResult<CanvasFrame> {
    if under.width != top.width || under.height != top.height || under.data.len() != top.data.len()
    {
        return Err(MontageError::validation(
            "fade_in_over expects frames of identical size",
        ));
    }
    let mut data = under.data.clone();
    for (d, s) in data.chunks_exact_mut(4).zip(top.data.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], alpha);
        d.copy_from_slice(&out);
    }
    Ok(CanvasFrame {
        width: top.width,
        height: top.height,
        data,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
