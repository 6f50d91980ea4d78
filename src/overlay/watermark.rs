use crate::config::WatermarkStyle;
use crate::effects::composite::PlacedLayer;
use crate::foundation::core::{Canvas, CanvasFrame, premul_rgba8};
use crate::foundation::error::MontageResult;
use crate::overlay::logo::load_logo;
use crate::overlay::text::CaptionRenderer;

/// What happened to the brand mark while building the watermark card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogoOutcome {
    /// The mark is drawn above the caption.
    Drawn,
    /// No logo path configured.
    NotConfigured,
    /// Configured path does not exist; the card is text-only.
    Missing(String),
    /// The file exists but could not be decoded; the card is text-only.
    Unreadable(String),
}

/// The closing branding frame.
#[derive(Clone, Debug)]
pub struct WatermarkCard {
    /// Fully composed canvas frame.
    pub frame: CanvasFrame,
    /// Brand mark status, for the job report.
    pub logo: LogoOutcome,
}

/// Compose the closing card: brand mark and caption stacked and centered on a solid background.
///
/// Logo problems degrade to a text-only card. A caption failure is returned as
/// [`crate::MontageError::Render`] and the caller drops the segment.
#[tracing::instrument(skip_all)]
pub fn build_watermark_card(
    renderer: &mut CaptionRenderer,
    style: &WatermarkStyle,
    canvas: Canvas,
) -> MontageResult<WatermarkCard> {
    let caption = renderer.render(&style.caption, &style.text, canvas.width)?;

    let (logo, outcome) = match &style.logo_path {
        None => (None, LogoOutcome::NotConfigured),
        Some(path) if !path.exists() => (None, LogoOutcome::Missing(path.display().to_string())),
        Some(path) => match load_logo(path, style.logo_height_px) {
            Ok(logo) => (Some(logo), LogoOutcome::Drawn),
            Err(e) => (None, LogoOutcome::Unreadable(e.to_string())),
        },
    };

    let cw = i64::from(canvas.width);
    let ch = i64::from(canvas.height);
    let mut frame = CanvasFrame::solid(canvas, premul_rgba8(style.background_rgba));

    let caption_y = match &logo {
        Some(logo) => {
            let total = i64::from(logo.height) + i64::from(style.gap_px) + i64::from(caption.height);
            let logo_y = (ch - total) / 2;
            PlacedLayer {
                width: logo.width,
                height: logo.height,
                data: logo.data.clone(),
                x: (cw - i64::from(logo.width)) / 2,
                y: logo_y,
            }
            .draw_over(&mut frame)?;
            logo_y + i64::from(logo.height) + i64::from(style.gap_px)
        }
        None => (ch - i64::from(caption.height)) / 2,
    };

    PlacedLayer {
        x: (cw - i64::from(caption.width)) / 2,
        y: caption_y,
        width: caption.width,
        height: caption.height,
        data: caption.data,
    }
    .draw_over(&mut frame)?;

    Ok(WatermarkCard {
        frame,
        logo: outcome,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/watermark.rs"]
mod tests;
