//! Frame sinks: the single-writer end of the pipeline.

/// H.264/AAC MP4 sink backed by the system `ffmpeg`.
pub mod ffmpeg;
/// The frame sink contract and an in-memory sink.
pub mod sink;
