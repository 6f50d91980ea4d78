use std::io::{BufWriter, Write as _};
use std::path::Path;

use crate::foundation::core::Fps;
use crate::foundation::error::{MontageError, MontageResult};
use crate::media::audio::AudioPcm;

/// What reconciliation did to the source track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum ReconcileAction {
    /// Source was longer and got cut.
    Truncated {
        /// Source length in sample frames.
        source_frames: u64,
        /// Output length in sample frames.
        target_frames: u64,
    },
    /// Source was shorter and got repeated from its start.
    Looped {
        /// Source length in sample frames.
        source_frames: u64,
        /// Output length in sample frames.
        target_frames: u64,
        /// Number of source passes started (the last one may be partial).
        passes: u64,
    },
    /// Source already had the exact length.
    PassThrough {
        /// Length in sample frames.
        frames: u64,
    },
}

/// A track whose length equals the timeline exactly.
#[derive(Clone, Debug, PartialEq)]
pub struct ReconciledAudio {
    /// Interleaved PCM of exactly the target length.
    pub pcm: AudioPcm,
    /// Applied adjustment.
    pub action: ReconcileAction,
}

/// Sample frames covering `total_frames` video frames at `fps`, rounded to nearest.
pub fn target_sample_frames(total_frames: u64, fps: Fps, sample_rate: u32) -> u64 {
    let num = u128::from(total_frames) * u128::from(sample_rate) * u128::from(fps.den);
    let den = u128::from(fps.num.max(1));
    ((num + (den / 2)) / den) as u64
}

/// Truncate or loop `source` to exactly `target_frames` sample frames.
///
/// Looping restarts at sample 0 with no gap, so the seam is sample accurate.
pub fn reconcile(source: AudioPcm, target_frames: u64) -> MontageResult<ReconciledAudio> {
    if source.channels == 0 || source.sample_rate == 0 {
        return Err(MontageError::validation(
            "audio channel count and sample rate must be non-zero",
        ));
    }
    if target_frames == 0 {
        return Err(MontageError::validation("audio target length must be > 0"));
    }
    let source_frames = source.frames();
    if source_frames == 0 {
        return Err(MontageError::decode("audio source decoded to zero samples"));
    }

    let channels = usize::from(source.channels);
    let target_len = usize::try_from(target_frames)
        .ok()
        .and_then(|f| f.checked_mul(channels))
        .ok_or_else(|| MontageError::validation("audio target length overflows"))?;

    let AudioPcm {
        sample_rate,
        channels: ch,
        mut interleaved_f32,
    } = source;
    // Drop a trailing partial sample frame, if any.
    interleaved_f32.truncate(source_frames as usize * channels);

    let action = if source_frames > target_frames {
        interleaved_f32.truncate(target_len);
        ReconcileAction::Truncated {
            source_frames,
            target_frames,
        }
    } else if source_frames < target_frames {
        let mut out = Vec::with_capacity(target_len);
        while out.len() < target_len {
            let take = (target_len - out.len()).min(interleaved_f32.len());
            out.extend_from_slice(&interleaved_f32[..take]);
        }
        interleaved_f32 = out;
        ReconcileAction::Looped {
            source_frames,
            target_frames,
            passes: target_frames.div_ceil(source_frames),
        }
    } else {
        ReconcileAction::PassThrough {
            frames: source_frames,
        }
    };

    Ok(ReconciledAudio {
        pcm: AudioPcm {
            sample_rate,
            channels: ch,
            interleaved_f32,
        },
        action,
    })
}

/// Write interleaved samples as raw little-endian `f32` for the encoder.
pub fn write_f32le_file(samples: &[f32], out_path: &Path) -> MontageResult<()> {
    let file = std::fs::File::create(out_path).map_err(|e| {
        MontageError::encode(format!(
            "failed to create audio file '{}': {e}",
            out_path.display()
        ))
    })?;
    let mut writer = BufWriter::new(file);
    for &sample in samples {
        writer.write_all(&sample.to_le_bytes()).map_err(|e| {
            MontageError::encode(format!(
                "failed to write audio file '{}': {e}",
                out_path.display()
            ))
        })?;
    }
    writer.flush().map_err(|e| {
        MontageError::encode(format!(
            "failed to flush audio file '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/reconcile.rs"]
mod tests;
