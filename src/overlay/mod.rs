//! Text and branding layers drawn on top of normalized canvas frames.

/// Brand mark rasterization.
pub mod logo;
/// Caption layout and rasterization.
pub mod text;
/// Title layer placement.
pub mod title;
/// Trailing branding card.
pub mod watermark;
