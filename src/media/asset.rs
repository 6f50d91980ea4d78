use std::path::{Path, PathBuf};

use crate::config::TimingPolicy;
use crate::foundation::error::{MontageError, MontageResult};
use crate::media::decode::{DecodedImage, decode_image_file};
use crate::media::probe::{VideoSourceInfo, probe_video};

/// Source kind of a media asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Still image, shown for a caller-supplied (clamped) duration.
    Image,
    /// Video clip, shown for its decoded duration.
    Video,
}

impl MediaKind {
    /// Classify by file extension (case-insensitive). Unsupported extensions return `None`.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())?
            .to_ascii_lowercase();
        match ext.as_str() {
            "mp4" | "mov" => Some(Self::Video),
            "jpg" | "jpeg" | "png" => Some(Self::Image),
            _ => None,
        }
    }
}

/// An ingested source asset. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaAsset {
    /// Position in the caller's media list.
    pub index: usize,
    /// Image or video.
    pub kind: MediaKind,
    /// Local decodable path.
    pub path: PathBuf,
    /// Display width in pixels (after orientation metadata is applied).
    pub width: u32,
    /// Display height in pixels (after orientation metadata is applied).
    pub height: u32,
    /// Time the asset occupies in the timeline, in seconds.
    pub duration_secs: f64,
}

/// A decoded asset ready for canvas normalization.
#[derive(Debug)]
pub enum LoadedAsset {
    /// Fully decoded still image.
    Image {
        /// Asset metadata.
        asset: MediaAsset,
        /// Premultiplied pixels; released once the canvas frame is built.
        pixels: DecodedImage,
    },
    /// Probed video; frames are decoded lazily while rendering.
    Video {
        /// Asset metadata.
        asset: MediaAsset,
        /// Probe results.
        info: VideoSourceInfo,
    },
}

impl LoadedAsset {
    /// Borrow the asset metadata.
    pub fn asset(&self) -> &MediaAsset {
        match self {
            Self::Image { asset, .. } | Self::Video { asset, .. } => asset,
        }
    }
}

/// Decode (images) or probe (videos) one asset.
///
/// Zero-area sources and unreadable files surface as [`MontageError::Decode`].
#[tracing::instrument(skip(timing), fields(path = %path.display()))]
pub fn load_asset(
    index: usize,
    kind: MediaKind,
    path: &Path,
    image_duration_hint: Option<f64>,
    timing: &TimingPolicy,
) -> MontageResult<LoadedAsset> {
    match kind {
        MediaKind::Image => {
            let pixels = decode_image_file(path)?;
            let asset = MediaAsset {
                index,
                kind,
                path: path.to_path_buf(),
                width: pixels.width,
                height: pixels.height,
                duration_secs: timing.image_duration(image_duration_hint),
            };
            Ok(LoadedAsset::Image { asset, pixels })
        }
        MediaKind::Video => {
            let info = probe_video(path)?;
            if info.duration_sec <= 0.0 || !info.duration_sec.is_finite() {
                return Err(MontageError::decode(format!(
                    "video '{}' reports no playable duration",
                    path.display()
                )));
            }
            let asset = MediaAsset {
                index,
                kind,
                path: path.to_path_buf(),
                width: info.width,
                height: info.height,
                duration_secs: info.duration_sec,
            };
            Ok(LoadedAsset::Video { asset, info })
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/asset.rs"]
mod tests;
