//! Montage turns a list of photos and clips into one fixed-canvas slideshow video.
//!
//! A job runs a fixed sequence of stages:
//!
//! - Normalize every asset onto the canvas (fill-crop for landscape, fit over a blurred
//!   backdrop for portrait and square sources)
//! - Burn a title into the first entry and append a short branding segment
//! - Lay entries out with cross-fade-in transitions
//! - Trim or loop the background track to the timeline length
//! - Encode H.264/AAC MP4 through the system `ffmpeg`
//!
//! Start with [`RenderJob`] and a [`MontageConfig`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Background track reconciliation.
pub mod audio;
/// Job configuration.
pub mod config;
/// Pixel effects.
pub mod effects;
/// Frame sinks.
pub mod encode;
mod foundation;
/// Media collaborators.
pub mod io;
/// Render jobs.
pub mod job;
/// Media ingestion.
pub mod media;
/// Canvas normalization.
pub mod normalize;
/// Title and watermark layers.
pub mod overlay;
/// Timeline assembly and frame production.
pub mod sequence;

pub use crate::foundation::core::{Canvas, CanvasFrame, Fps, FrameIndex, FrameRange};
pub use crate::foundation::error::{ErrorKind, MontageError, MontageResult};

pub use crate::config::{
    BlurSpec, CrossfadeMode, MontageConfig, OutputSpec, TextStyle, TimingPolicy, TitleStyle,
    WatermarkStyle,
};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::io::publish::{LocalDirPublisher, PublicRef, Publisher};
pub use crate::io::source::{LocalMediaSource, MediaHandle, MediaRef, MediaSource};
pub use crate::job::cancel::CancelToken;
pub use crate::job::outcome::JobOutcome;
pub use crate::job::pipeline::{RenderJob, RenderRequest, RenderedArtifact};
pub use crate::job::report::JobReport;
pub use crate::media::asset::MediaKind;
