use crate::foundation::error::{ErrorKind, MontageError};
use crate::io::publish::PublicRef;
use crate::job::report::JobReport;

/// Structured failure: error class plus a human-readable reason.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FailurePayload {
    /// Error class.
    pub kind: ErrorKind,
    /// Human-readable reason.
    pub reason: String,
}

/// Service-boundary response of a render job.
///
/// Serializes as `{"video_path": ...}` on success and `{"error": {"kind", "reason"}}` on
/// failure.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum JobOutcome {
    /// The artifact was published.
    Success {
        /// Caller-visible location of the output.
        video_path: String,
        /// Optional job details.
        #[serde(skip_serializing_if = "Option::is_none")]
        report: Option<JobReport>,
    },
    /// The job failed.
    Failure {
        /// What went wrong.
        error: FailurePayload,
    },
}

impl JobOutcome {
    /// Success payload for a published artifact.
    pub fn success(published: PublicRef, report: Option<JobReport>) -> Self {
        Self::Success {
            video_path: published.0,
            report,
        }
    }

    /// Failure payload for `err`.
    pub fn failure(err: &MontageError) -> Self {
        Self::Failure {
            error: FailurePayload {
                kind: err.kind(),
                reason: err.to_string(),
            },
        }
    }

    /// Return `true` for a success payload.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Pretty JSON rendering.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!(r#"{{"error":{{"kind":"internal_error","reason":"{e}"}}}}"#)
        })
    }
}
