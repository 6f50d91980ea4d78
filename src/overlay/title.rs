use crate::config::TitleStyle;
use crate::effects::composite::PlacedLayer;
use crate::foundation::core::Canvas;
use crate::foundation::error::MontageResult;
use crate::overlay::text::CaptionRenderer;

/// Rasterize the title caption and place it horizontally centered near the top edge.
#[tracing::instrument(skip(renderer, style))]
pub fn build_title_layer(
    renderer: &mut CaptionRenderer,
    text: &str,
    style: &TitleStyle,
    canvas: Canvas,
) -> MontageResult<PlacedLayer> {
    let raster = renderer.render(text, &style.text, canvas.width)?;
    let x = (i64::from(canvas.width) - i64::from(raster.width)) / 2;
    Ok(PlacedLayer {
        width: raster.width,
        height: raster.height,
        data: raster.data,
        x,
        y: i64::from(style.top_padding_px),
    })
}
