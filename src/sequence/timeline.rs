use crate::config::{CrossfadeMode, TimingPolicy};
use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange};
use crate::foundation::error::{MontageError, MontageResult};
use crate::sequence::entry::CompositionEntry;

/// Placement of one entry in timeline frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct EntrySpan {
    /// Frames the entry occupies, fade-in window included.
    pub range: FrameRange,
    /// Leading frames blended over the preceding entry. Zero for the first entry.
    pub fade_in_frames: u64,
}

impl EntrySpan {
    /// Entry length in frames.
    pub fn len_frames(&self) -> u64 {
        self.range.len_frames()
    }
}

/// Ordered, immutable sequence of entries with resolved frame placement.
#[derive(Clone, Debug)]
pub struct Timeline {
    canvas: Canvas,
    fps: Fps,
    mode: CrossfadeMode,
    entries: Vec<CompositionEntry>,
    spans: Vec<EntrySpan>,
    total_frames: u64,
}

impl Timeline {
    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Output frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Cross-fade accounting used for this layout.
    pub fn mode(&self) -> CrossfadeMode {
        self.mode
    }

    /// Entries in playback order.
    pub fn entries(&self) -> &[CompositionEntry] {
        &self.entries
    }

    /// Frame placement, parallel to [`Timeline::entries`].
    pub fn spans(&self) -> &[EntrySpan] {
        &self.spans
    }

    /// Number of output frames.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Output duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.total_frames)
    }

    /// Index of the entry whose own (non-underlay) frame is shown at `frame`.
    pub fn entry_at(&self, frame: FrameIndex) -> Option<usize> {
        if frame.0 >= self.total_frames {
            return None;
        }
        // Later entries win inside an overlap.
        self.spans.iter().rposition(|s| s.range.contains(frame))
    }
}

/// Lays entries end to end and resolves cross-fade windows.
#[derive(Clone, Copy, Debug)]
pub struct Sequencer {
    canvas: Canvas,
    fps: Fps,
    crossfade_frames: u64,
    mode: CrossfadeMode,
}

impl Sequencer {
    /// Build a sequencer for `canvas` at `fps` with the policy's cross-fade.
    pub fn new(canvas: Canvas, fps: Fps, timing: &TimingPolicy) -> Self {
        Self {
            canvas,
            fps,
            crossfade_frames: fps.secs_to_frames_round(timing.crossfade_secs),
            mode: timing.crossfade_mode,
        }
    }

    /// Resolve frame placement for `entries` in the given order.
    ///
    /// Every entry lasts at least one frame. Fade windows never exceed the entry they belong to,
    /// and in [`CrossfadeMode::Overlap`] never reach back past the start of the preceding entry's
    /// own frames.
    pub fn assemble(&self, entries: Vec<CompositionEntry>) -> MontageResult<Timeline> {
        if entries.is_empty() {
            return Err(MontageError::input("timeline has no entries"));
        }

        let mut spans = Vec::with_capacity(entries.len());
        let mut cursor = 0u64;
        let mut prev: Option<(u64, u64)> = None;
        for entry in &entries {
            if !entry.duration_secs.is_finite() || entry.duration_secs <= 0.0 {
                return Err(MontageError::validation(format!(
                    "entry duration must be finite and > 0, got {}",
                    entry.duration_secs
                )));
            }
            let len = self.fps.secs_to_frames_round(entry.duration_secs).max(1);
            let (start, fade) = match (prev, self.mode) {
                (None, _) => (cursor, 0),
                (Some(_), CrossfadeMode::Extend) => (cursor, self.crossfade_frames.min(len)),
                (Some((prev_len, prev_fade)), CrossfadeMode::Overlap) => {
                    let overlap = self
                        .crossfade_frames
                        .min(prev_len - prev_fade)
                        .min(len);
                    (cursor - overlap, overlap)
                }
            };
            let end = start + len;
            spans.push(EntrySpan {
                range: FrameRange::new(FrameIndex(start), FrameIndex(end))?,
                fade_in_frames: fade,
            });
            cursor = end;
            prev = Some((len, fade));
        }

        tracing::debug!(
            entries = entries.len(),
            total_frames = cursor,
            mode = ?self.mode,
            "timeline assembled"
        );

        Ok(Timeline {
            canvas: self.canvas,
            fps: self.fps,
            mode: self.mode,
            entries,
            spans,
            total_frames: cursor,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/timeline.rs"]
mod tests;
