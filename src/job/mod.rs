//! Render jobs: stage orchestration, job-scoped resources and reporting.

/// Per-job cancellation.
pub mod cancel;
/// Service-boundary JSON payloads.
pub mod outcome;
/// Stage orchestration.
pub mod pipeline;
/// What a job did, skipped and degraded.
pub mod report;
/// Job-scoped temporary directory.
pub mod workspace;
