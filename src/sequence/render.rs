use std::sync::Arc;

use crate::config::CrossfadeMode;
use crate::effects::composite::fade_in_over;
use crate::encode::sink::FrameSink;
use crate::foundation::core::{CanvasFrame, FrameIndex};
use crate::foundation::error::{MontageError, MontageResult};
use crate::job::cancel::CancelToken;
use crate::sequence::cursor::EntryCursor;
use crate::sequence::timeline::Timeline;

/// Counters collected while producing frames.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RenderStats {
    /// Frames handed to the sink.
    pub frames_written: u64,
    /// Per entry, frames repeated because a clip ended before its declared duration.
    pub held_frames: Vec<u64>,
}

/// Walks a [`Timeline`] and produces output frames in order.
pub struct FrameProducer<'a> {
    timeline: &'a Timeline,
    pool: &'a rayon::ThreadPool,
    chunk_frames: usize,
}

/// Weight of the incoming entry at step `step` of a `fade`-frame window.
///
/// Strictly between 0 and 1, so both sides contribute to every blended frame and the next frame
/// after the window is the incoming entry alone.
fn fade_alpha(step: u64, fade: u64) -> f32 {
    ((step + 1) as f64 / (fade + 1) as f64) as f32
}

impl<'a> FrameProducer<'a> {
    /// Producer over `timeline`, normalizing video chunks of `chunk_frames` on `pool`.
    pub fn new(timeline: &'a Timeline, pool: &'a rayon::ThreadPool, chunk_frames: usize) -> Self {
        Self {
            timeline,
            pool,
            chunk_frames,
        }
    }

    fn cursor(&self, entry: usize, skip: u64) -> EntryCursor<'a> {
        let timeline: &'a Timeline = self.timeline;
        EntryCursor::new(
            &timeline.entries()[entry],
            timeline.spans()[entry].len_frames(),
            skip,
            timeline.fps(),
            self.pool,
            self.chunk_frames,
        )
    }

    /// Push every frame of the timeline into `sink`.
    ///
    /// Holds at most one entry cursor besides the current one, plus one held frame. Checks
    /// `cancel` before every frame. The sink's `begin`/`end` are the caller's business.
    #[tracing::instrument(skip_all, fields(total_frames = self.timeline.total_frames()))]
    pub fn render_all(
        &self,
        sink: &mut dyn FrameSink,
        cancel: &CancelToken,
    ) -> MontageResult<RenderStats> {
        let spans = self.timeline.spans();
        let mode = self.timeline.mode();
        let mut stats = RenderStats {
            frames_written: 0,
            held_frames: vec![0; spans.len()],
        };

        let mut held: Option<Arc<CanvasFrame>> = None;
        let mut prev: Option<(usize, EntryCursor<'a>)> = None;

        for (j, span) in spans.iter().enumerate() {
            let len = span.len_frames();
            let fade = span.fade_in_frames;
            let next_overlap = match mode {
                CrossfadeMode::Overlap => spans.get(j + 1).map_or(0, |s| s.fade_in_frames),
                CrossfadeMode::Extend => 0,
            };
            let mut cur = self.cursor(j, 0);
            let mut last_top: Option<Arc<CanvasFrame>> = None;

            for step in 0..fade {
                cancel.check()?;
                let top = cur.next_frame()?;
                let under = match mode {
                    CrossfadeMode::Extend => held
                        .clone()
                        .ok_or_else(|| MontageError::validation("fade-in without a preceding frame"))?,
                    CrossfadeMode::Overlap => prev
                        .as_mut()
                        .ok_or_else(|| MontageError::validation("fade-in without a preceding entry"))?
                        .1
                        .next_frame()?,
                };
                let blended = fade_in_over(&under, &top, fade_alpha(step, fade))?;
                sink.push_frame(FrameIndex(stats.frames_written), &blended)?;
                stats.frames_written += 1;
                last_top = Some(top);
            }
            if let Some((k, p)) = prev.take() {
                stats.held_frames[k] += p.held_frames();
            }

            for _ in fade..len.saturating_sub(next_overlap) {
                cancel.check()?;
                let top = cur.next_frame()?;
                sink.push_frame(FrameIndex(stats.frames_written), &top)?;
                stats.frames_written += 1;
                last_top = Some(top);
            }

            match mode {
                CrossfadeMode::Extend => {
                    stats.held_frames[j] += cur.held_frames();
                    held = last_top;
                }
                CrossfadeMode::Overlap => prev = Some((j, cur)),
            }
            tracing::debug!(entry = j, frames = len, fade_in = fade, "entry rendered");
        }
        if let Some((k, p)) = prev.take() {
            stats.held_frames[k] += p.held_frames();
        }

        if stats.frames_written != self.timeline.total_frames() {
            return Err(MontageError::validation(format!(
                "rendered {} frames, timeline has {}",
                stats.frames_written,
                self.timeline.total_frames()
            )));
        }
        Ok(stats)
    }

    /// Render the single output frame at `idx` without walking the timeline.
    pub fn render_frame_at(&self, idx: FrameIndex) -> MontageResult<CanvasFrame> {
        let j = self.timeline.entry_at(idx).ok_or_else(|| {
            MontageError::validation(format!(
                "frame {} is outside the timeline ({} frames)",
                idx.0,
                self.timeline.total_frames()
            ))
        })?;
        let span = self.timeline.spans()[j];
        let local = idx.0 - span.range.start.0;
        let top = self.cursor(j, local).next_frame()?;
        if local >= span.fade_in_frames || j == 0 {
            return Ok(CanvasFrame::clone(&top));
        }

        let prev_len = self.timeline.spans()[j - 1].len_frames();
        let under_local = match self.timeline.mode() {
            CrossfadeMode::Extend => prev_len - 1,
            CrossfadeMode::Overlap => prev_len - span.fade_in_frames + local,
        };
        let under = self.cursor(j - 1, under_local).next_frame()?;
        fade_in_over(&under, &top, fade_alpha(local, span.fade_in_frames))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/render.rs"]
mod tests;
