use std::borrow::Cow;
use std::path::Path;

use crate::config::TextStyle;
use crate::foundation::error::{MontageError, MontageResult};

/// A rasterized caption: premultiplied RGBA8 with a transparent background.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptionRaster {
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes.
    pub data: Vec<u8>,
}

/// Shapes and rasterizes short captions with one font.
///
/// Lines wrap at the style's width limit and are centered within it. Glyphs are drawn twice:
/// an outline pass with the stroke color, then the fill on top.
pub struct CaptionRenderer {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for CaptionRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionRenderer")
            .field("family_name", &self.family_name)
            .finish_non_exhaustive()
    }
}

impl CaptionRenderer {
    /// Load a TrueType/OpenType font file. Any failure is a [`MontageError::Render`].
    pub fn from_font_file(path: &Path) -> MontageResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            MontageError::render(format!("failed to read font '{}': {e}", path.display()))
        })?;
        Self::from_font_bytes(bytes)
    }

    /// Register font bytes for layout and rasterization.
    pub fn from_font_bytes(bytes: Vec<u8>) -> MontageResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| MontageError::render("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| MontageError::render("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0),
        })
    }

    /// Rasterize `text`, wrapping at `style.width_fraction * canvas_width`.
    pub fn render(
        &mut self,
        text: &str,
        style: &TextStyle,
        canvas_width: u32,
    ) -> MontageResult<CaptionRaster> {
        if text.trim().is_empty() {
            return Err(MontageError::render("caption text is empty"));
        }
        if !style.font_size_px.is_finite() || style.font_size_px <= 0.0 {
            return Err(MontageError::render("caption font size must be finite and > 0"));
        }
        let max_width = (canvas_width as f32 * style.width_fraction.clamp(0.05, 1.0)).max(1.0);

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.font_size_px));
        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(Some(max_width));
        layout.align(
            Some(max_width),
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );

        let stroke = style.stroke_width_px.max(0.0);
        let pad = stroke.ceil() + 1.0;
        let content_width = layout.width().min(max_width).max(1.0);
        let width = (content_width + 2.0 * pad).ceil() as u32;
        let height = (layout.height().max(1.0) + 2.0 * pad).ceil() as u32;
        let (w16, h16) = match (u16::try_from(width), u16::try_from(height)) {
            (Ok(w), Ok(h)) => (w, h),
            _ => {
                return Err(MontageError::render(format!(
                    "caption raster too large: {width}x{height}"
                )));
            }
        };

        // Per-line horizontal offsets that center each line inside the raster.
        let offsets: Vec<f32> = layout
            .lines()
            .map(|line| pad + ((content_width - line.metrics().advance) / 2.0).max(0.0))
            .collect();

        let mut ctx = vello_cpu::RenderContext::new(w16, h16);
        if stroke > 0.0 && style.stroke_rgba[3] > 0 {
            let [r, g, b, a] = style.stroke_rgba;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            // Half of a centered stroke is covered by the fill pass.
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(f64::from(stroke * 2.0)));
            for (line, dx) in layout.lines().zip(&offsets) {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x + dx,
                        y: g.y + pad,
                    });
                    ctx.glyph_run(&self.font)
                        .font_size(run.run().font_size())
                        .stroke_glyphs(glyphs);
                }
            }
        }

        let [r, g, b, a] = style.fill_rgba;
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        for (line, dx) in layout.lines().zip(&offsets) {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x + dx,
                    y: g.y + pad,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }

        let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(CaptionRaster {
            width,
            height,
            data: pixmap.data_as_u8_slice().to_vec(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/text.rs"]
mod tests;
