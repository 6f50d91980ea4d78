//! Media ingestion: classification, probing and decoding of source assets.
//!
//! Video and audio go through the system `ffmpeg`/`ffprobe` binaries; still images are decoded
//! in-process with the `image` crate.

/// Media classification and loading.
pub mod asset;
/// PCM decode through `ffmpeg`.
pub mod audio;
/// Still image decode.
pub mod decode;
/// `ffprobe` metadata.
pub mod probe;
/// Streaming frame decode through `ffmpeg`.
pub mod video_stream;
