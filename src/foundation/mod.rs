//! Core value types, error taxonomy and small numeric helpers shared by every stage.

/// Frames, frame rates and canvas types.
pub mod core;
/// Error taxonomy.
pub mod error;
pub(crate) mod math;
