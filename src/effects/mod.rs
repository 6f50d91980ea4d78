//! Pixel-level effects on premultiplied RGBA8 buffers.

/// Gaussian blur and the blurred fit-pad backdrop.
pub mod blur;
/// Premultiplied source-over, blits and fades.
pub mod composite;
