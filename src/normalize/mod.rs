//! Canvas normalization: every source frame becomes exactly one canvas-sized frame.
//!
//! [`plan::NormalizePlan`] is computed once per asset from its dimensions alone;
//! [`canvas::normalize_frame`] applies it to each decoded frame.

/// Per-frame application of a plan.
pub mod canvas;
/// Pure per-asset transform.
pub mod plan;
