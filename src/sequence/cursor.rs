use std::collections::VecDeque;
use std::sync::Arc;

use rayon::prelude::*;

use crate::foundation::core::{CanvasFrame, Fps};
use crate::foundation::error::{MontageError, MontageResult};
use crate::media::video_stream::VideoFrameStream;
use crate::normalize::canvas::normalize_frame;
use crate::normalize::plan::NormalizePlan;
use crate::sequence::entry::{CompositionEntry, EntrySource};

/// Yields the canvas frames of one entry in order.
///
/// Stills hand out the same shared frame. Videos are decoded a chunk at a time and each chunk is
/// normalized on the worker pool, so at most `chunk_frames` decoded frames are in flight. When a
/// clip runs out before its declared length the last produced frame is held.
pub(crate) struct EntryCursor<'a> {
    entry: &'a CompositionEntry,
    fps: Fps,
    pool: &'a rayon::ThreadPool,
    chunk_frames: usize,
    start_frame: u64,
    remaining: u64,
    stream: Option<VideoFrameStream>,
    stream_done: bool,
    ready: VecDeque<Arc<CanvasFrame>>,
    last: Option<Arc<CanvasFrame>>,
    held_frames: u64,
}

impl<'a> EntryCursor<'a> {
    /// Cursor over frames `[skip, len)` of `entry`.
    pub(crate) fn new(
        entry: &'a CompositionEntry,
        len_frames: u64,
        skip: u64,
        fps: Fps,
        pool: &'a rayon::ThreadPool,
        chunk_frames: usize,
    ) -> Self {
        Self {
            entry,
            fps,
            pool,
            chunk_frames: chunk_frames.max(1),
            start_frame: skip.min(len_frames),
            remaining: len_frames.saturating_sub(skip),
            stream: None,
            stream_done: false,
            ready: VecDeque::new(),
            last: None,
            held_frames: 0,
        }
    }

    /// Frames repeated because the source ended early.
    pub(crate) fn held_frames(&self) -> u64 {
        self.held_frames
    }

    /// Produce the next frame.
    pub(crate) fn next_frame(&mut self) -> MontageResult<Arc<CanvasFrame>> {
        if self.remaining == 0 {
            return Err(MontageError::validation("entry cursor read past entry end"));
        }
        self.remaining -= 1;

        let entry: &'a CompositionEntry = self.entry;
        let (info, plan, poster) = match &entry.source {
            EntrySource::Still(frame) => return Ok(Arc::clone(frame)),
            EntrySource::Video { info, plan, poster } => (info, plan, poster),
        };

        if self.ready.is_empty() && !self.stream_done {
            if self.stream.is_none() {
                let start_sec = self.fps.frames_to_secs(self.start_frame);
                let max_secs = self.fps.frames_to_secs(self.remaining + 1);
                self.stream = Some(VideoFrameStream::open(info, self.fps, start_sec, max_secs)?);
            }
            self.fill_chunk(plan)?;
        }

        match self.ready.pop_front() {
            Some(frame) => {
                self.last = Some(Arc::clone(&frame));
                Ok(frame)
            }
            None => {
                self.held_frames += 1;
                Ok(self.last.clone().unwrap_or_else(|| Arc::clone(poster)))
            }
        }
    }

    fn fill_chunk(&mut self, plan: &NormalizePlan) -> MontageResult<()> {
        let entry: &'a CompositionEntry = self.entry;
        let Some(stream) = self.stream.as_mut() else {
            return Ok(());
        };
        // `remaining` was already decremented for the frame being requested.
        let want = (self.remaining + 1).min(self.chunk_frames as u64) as usize;
        let mut raw = Vec::with_capacity(want);
        while raw.len() < want {
            match stream.next_frame() {
                Ok(Some(frame)) => raw.push(frame),
                Ok(None) => {
                    self.stream_done = true;
                    self.stream = None;
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "video decode ended early; holding last frame");
                    self.stream_done = true;
                    self.stream = None;
                    break;
                }
            }
        }

        let overlay = entry.overlay.as_deref();
        let frames: Vec<CanvasFrame> = self.pool.install(|| {
            raw.into_par_iter()
                .map(|pixels| {
                    let mut frame = normalize_frame(plan, pixels)?;
                    if let Some(layer) = overlay {
                        layer.draw_over(&mut frame)?;
                    }
                    Ok(frame)
                })
                .collect::<MontageResult<Vec<_>>>()
        })?;
        self.ready.extend(frames.into_iter().map(Arc::new));
        Ok(())
    }
}
