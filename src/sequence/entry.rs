use std::sync::Arc;

use crate::effects::composite::PlacedLayer;
use crate::foundation::core::CanvasFrame;
use crate::foundation::error::MontageResult;
use crate::media::probe::VideoSourceInfo;
use crate::normalize::plan::{NormalizePlan, Orientation};

/// Where an entry's frames come from.
#[derive(Clone, Debug)]
pub enum EntrySource {
    /// One normalized frame held for the whole duration.
    Still(Arc<CanvasFrame>),
    /// Frames decoded from a clip and normalized one at a time.
    Video {
        /// Probe results of the clip.
        info: Arc<VideoSourceInfo>,
        /// Transform shared by every frame of the clip.
        plan: Arc<NormalizePlan>,
        /// First normalized frame; held if the clip ends before its declared duration.
        poster: Arc<CanvasFrame>,
    },
}

/// Why an entry is in the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "role")]
pub enum EntryRole {
    /// A normalized input asset.
    Content {
        /// Position in the caller's media list.
        asset_index: usize,
    },
    /// The trailing branding segment.
    Watermark,
}

/// One normalized, duration-bearing unit of the timeline.
#[derive(Clone, Debug)]
pub struct CompositionEntry {
    /// Frame source.
    pub source: EntrySource,
    /// Declared duration in seconds.
    pub duration_secs: f64,
    /// Normalization policy used, if the entry came from an asset.
    pub orientation: Option<Orientation>,
    /// Layer composited over every frame of a video entry.
    pub overlay: Option<Arc<PlacedLayer>>,
    /// Content or watermark.
    pub role: EntryRole,
}

impl CompositionEntry {
    /// A still entry.
    pub fn still(
        frame: CanvasFrame,
        duration_secs: f64,
        orientation: Option<Orientation>,
        role: EntryRole,
    ) -> Self {
        Self {
            source: EntrySource::Still(Arc::new(frame)),
            duration_secs,
            orientation,
            overlay: None,
            role,
        }
    }

    /// Return a copy of this entry with `layer` burned in.
    ///
    /// Stills get a new composited frame; videos carry the layer and apply it per frame. The
    /// receiver is left untouched.
    pub fn with_overlay(&self, layer: PlacedLayer) -> MontageResult<Self> {
        let mut out = self.clone();
        match &self.source {
            EntrySource::Still(frame) => {
                let mut composed = CanvasFrame::clone(frame);
                layer.draw_over(&mut composed)?;
                out.source = EntrySource::Still(Arc::new(composed));
            }
            EntrySource::Video { info, plan, poster } => {
                let mut composed = CanvasFrame::clone(poster);
                layer.draw_over(&mut composed)?;
                out.source = EntrySource::Video {
                    info: Arc::clone(info),
                    plan: Arc::clone(plan),
                    poster: Arc::new(composed),
                };
                out.overlay = Some(Arc::new(layer));
            }
        }
        Ok(out)
    }

    /// Return `true` for the trailing branding segment.
    pub fn is_watermark(&self) -> bool {
        self.role == EntryRole::Watermark
    }
}
