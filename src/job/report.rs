use crate::audio::reconcile::ReconcileAction;
use crate::foundation::error::{ErrorKind, MontageError};
use crate::normalize::plan::Orientation;
use crate::sequence::entry::EntryRole;

/// Pipeline stage names used in reports and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    /// Acquire and classify media references.
    Ingest,
    /// Decode and canvas-normalize assets.
    Normalize,
    /// Title and watermark construction.
    Overlay,
    /// Timeline assembly.
    Sequence,
    /// Streaming decode of video entries during frame production.
    Decode,
    /// Background track reconciliation.
    Audio,
    /// Frame production and encoding.
    Encode,
}

/// A failure the pipeline absorbed instead of aborting.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct JobWarning {
    /// Where it happened.
    pub stage: JobStage,
    /// Error class.
    pub kind: ErrorKind,
    /// Human-readable reason.
    pub message: String,
}

/// An input that did not make it into the timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DroppedAsset {
    /// Position in the caller's media list.
    pub index: usize,
    /// File name as supplied.
    pub file_name: String,
    /// Error class.
    pub kind: ErrorKind,
    /// Human-readable reason.
    pub reason: String,
}

/// Per-entry summary of the assembled timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct EntrySummary {
    /// Content or watermark.
    #[serde(flatten)]
    pub role: EntryRole,
    /// Normalization policy, for content entries.
    pub orientation: Option<Orientation>,
    /// Declared duration in seconds.
    pub duration_secs: f64,
    /// Frames in the output.
    pub frames: u64,
    /// Leading cross-fade frames.
    pub fade_in_frames: u64,
    /// `true` when the title is burned into this entry.
    pub has_title: bool,
}

/// Wall time spent in one stage.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct StageTiming {
    /// Stage.
    pub stage: JobStage,
    /// Milliseconds.
    pub millis: u128,
}

/// Everything observable about one job run.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct JobReport {
    /// Timeline entries in order.
    pub entries: Vec<EntrySummary>,
    /// Inputs that were skipped.
    pub dropped: Vec<DroppedAsset>,
    /// Absorbed failures.
    pub warnings: Vec<JobWarning>,
    /// Output frame count.
    pub total_frames: u64,
    /// Output duration in seconds.
    pub duration_secs: f64,
    /// Reconciliation result, when an audio track was attached.
    pub audio: Option<ReconcileAction>,
    /// Stage wall times.
    pub timings: Vec<StageTiming>,
}

impl JobReport {
    /// Record an absorbed failure and log it.
    pub fn warn(&mut self, stage: JobStage, err: &MontageError) {
        tracing::warn!(?stage, error = %err, "continuing after failure");
        self.warnings.push(JobWarning {
            stage,
            kind: err.kind(),
            message: err.to_string(),
        });
    }

    /// Record a dropped input and log it.
    pub fn drop_asset(&mut self, index: usize, file_name: &str, err: &MontageError) {
        tracing::warn!(index, file = file_name, error = %err, "dropping media item");
        self.dropped.push(DroppedAsset {
            index,
            file_name: file_name.to_string(),
            kind: err.kind(),
            reason: err.to_string(),
        });
    }

    /// Return `true` when the title overlay made it into the output.
    pub fn has_title(&self) -> bool {
        self.entries.iter().any(|e| e.has_title)
    }

    /// Return `true` when the output ends with the watermark segment.
    pub fn has_watermark(&self) -> bool {
        self.entries
            .last()
            .is_some_and(|e| e.role == EntryRole::Watermark)
    }
}
