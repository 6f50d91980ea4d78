//! Job configuration.
//!
//! A [`MontageConfig`] is built once at process entry (defaults, then an optional JSON file,
//! then environment overrides) and passed by reference into every stage. Nothing in the
//! pipeline reads ambient global state.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{MontageError, MontageResult};

/// Font files probed when no explicit `font_path` is configured.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Top-level configuration for a render job.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MontageConfig {
    /// Constant encode policy.
    pub output: OutputSpec,
    /// Title caption styling.
    pub title: TitleStyle,
    /// Trailing branding segment styling.
    pub watermark: WatermarkStyle,
    /// Blurred background parameters for portrait/square sources.
    pub blur: BlurSpec,
    /// Image durations and transitions.
    pub timing: TimingPolicy,
    /// Font used for all text layers. Falls back to well-known system locations.
    pub font_path: Option<PathBuf>,
    /// Worker threads for normalization. `None` uses the rayon default.
    pub workers: Option<usize>,
    /// Source frames transformed per parallel batch for each video entry.
    pub video_chunk_frames: usize,
    /// Parent directory for job workspaces. `None` uses the system temp dir.
    pub temp_dir: Option<PathBuf>,
}

impl Default for MontageConfig {
    fn default() -> Self {
        Self {
            output: OutputSpec::default(),
            title: TitleStyle::default(),
            watermark: WatermarkStyle::default(),
            blur: BlurSpec::default(),
            timing: TimingPolicy::default(),
            font_path: None,
            workers: None,
            video_chunk_frames: 8,
            temp_dir: None,
        }
    }
}

/// Fixed encode policy. Not derived from the inputs.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OutputSpec {
    /// Output canvas.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// ffmpeg video encoder name.
    pub video_codec: String,
    /// x264 speed preset.
    pub preset: String,
    /// H.264 profile.
    pub profile: String,
    /// H.264 level.
    pub level: String,
    /// Constant rate factor.
    pub crf: u8,
    /// Target video bitrate, ffmpeg syntax.
    pub video_bitrate: String,
    /// Output pixel format (`yuv420p` for strict mobile decoders).
    pub pixel_format: String,
    /// Move the `moov` atom to the front so playback can start while downloading.
    pub faststart: bool,
    /// ffmpeg audio encoder name.
    pub audio_codec: String,
    /// Target audio bitrate, ffmpeg syntax.
    pub audio_bitrate: String,
    /// PCM sample rate used between reconciliation and encode.
    pub audio_sample_rate: u32,
    /// PCM channel count used between reconciliation and encode.
    pub audio_channels: u16,
    /// Encoder thread count passed to ffmpeg.
    pub encoder_threads: u32,
    /// Background used to flatten any residual alpha (straight RGBA8).
    pub background_rgba: [u8; 4],
}

impl Default for OutputSpec {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 720,
                height: 1280,
            },
            fps: Fps { num: 30, den: 1 },
            video_codec: "libx264".to_string(),
            preset: "ultrafast".to_string(),
            profile: "high".to_string(),
            level: "4.0".to_string(),
            crf: 23,
            video_bitrate: "4000k".to_string(),
            pixel_format: "yuv420p".to_string(),
            faststart: true,
            audio_codec: "aac".to_string(),
            audio_bitrate: "192k".to_string(),
            audio_sample_rate: 48_000,
            audio_channels: 2,
            encoder_threads: 4,
            background_rgba: [0, 0, 0, 255],
        }
    }
}

/// Caption appearance shared by the title and the watermark text.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TextStyle {
    /// Font size in pixels.
    pub font_size_px: f32,
    /// Glyph fill (straight RGBA8).
    pub fill_rgba: [u8; 4],
    /// Glyph outline (straight RGBA8).
    pub stroke_rgba: [u8; 4],
    /// Outline width in pixels. Zero disables the outline.
    pub stroke_width_px: f32,
    /// Maximum caption width as a fraction of canvas width.
    pub width_fraction: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size_px: 70.0,
            fill_rgba: [255, 255, 255, 255],
            stroke_rgba: [0, 0, 0, 255],
            stroke_width_px: 2.0,
            width_fraction: 0.9,
        }
    }
}

/// Title overlay styling.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TitleStyle {
    /// Caption appearance.
    pub text: TextStyle,
    /// Distance from the top edge of the canvas in pixels.
    pub top_padding_px: u32,
}

impl Default for TitleStyle {
    fn default() -> Self {
        Self {
            text: TextStyle::default(),
            top_padding_px: 50,
        }
    }
}

/// Trailing branding segment styling.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WatermarkStyle {
    /// Append the segment at all.
    pub enabled: bool,
    /// Segment duration in seconds.
    pub duration_secs: f64,
    /// Caption rendered under the brand mark.
    pub caption: String,
    /// Caption appearance.
    pub text: TextStyle,
    /// Brand mark image (PNG/JPEG or SVG). Missing files render text-only.
    pub logo_path: Option<PathBuf>,
    /// Brand mark height in pixels; width follows the aspect ratio.
    pub logo_height_px: u32,
    /// Vertical gap between brand mark and caption.
    pub gap_px: u32,
    /// Solid background (straight RGBA8).
    pub background_rgba: [u8; 4],
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_secs: 0.5,
            caption: "Created by Honeybee".to_string(),
            text: TextStyle {
                font_size_px: 48.0,
                ..TextStyle::default()
            },
            logo_path: None,
            logo_height_px: 120,
            gap_px: 20,
            background_rgba: [0, 0, 0, 255],
        }
    }
}

/// Gaussian blur used for the fit-pad background.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BlurSpec {
    /// Kernel radius at canvas resolution (kernel size is `2 * radius + 1`).
    pub radius_px: u32,
    /// Gaussian sigma at canvas resolution.
    pub sigma: f32,
    /// The background is blurred at `canvas / downscale`, radius and sigma scaled alike.
    pub downscale: u32,
}

impl Default for BlurSpec {
    fn default() -> Self {
        Self {
            radius_px: 49,
            sigma: 30.0,
            downscale: 4,
        }
    }
}

/// How cross-fades account for time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossfadeMode {
    /// Entries keep their full duration; the fade blends over the previous entry's last frame.
    /// Total duration is the sum of entry durations.
    #[default]
    Extend,
    /// Each entry starts one fade window before the previous one ends.
    /// Total duration is the sum minus the overlaps.
    Overlap,
}

/// Image durations and transition timing.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimingPolicy {
    /// Lower clamp for caller-supplied image durations.
    pub image_min_secs: f64,
    /// Upper clamp for caller-supplied image durations.
    pub image_max_secs: f64,
    /// Image duration when no usable hint is supplied.
    pub image_default_secs: f64,
    /// Cross-fade-in length for every entry after the first.
    pub crossfade_secs: f64,
    /// Cross-fade time accounting.
    pub crossfade_mode: CrossfadeMode,
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self {
            image_min_secs: 2.0,
            image_max_secs: 3.0,
            image_default_secs: 3.0,
            crossfade_secs: 1.0,
            crossfade_mode: CrossfadeMode::Extend,
        }
    }
}

impl TimingPolicy {
    /// Resolve the display duration of a still image from an optional hint.
    pub fn image_duration(&self, hint_secs: Option<f64>) -> f64 {
        match hint_secs {
            Some(h) if h.is_finite() => h.clamp(self.image_min_secs, self.image_max_secs),
            _ => self.image_default_secs,
        }
    }
}

impl MontageConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> MontageResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            MontageError::validation(format!("invalid config '{}': {e}", path.display()))
        })
    }

    /// Apply `MONTAGE_*` environment overrides from the process environment.
    pub fn with_env_overrides(self) -> MontageResult<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply `MONTAGE_*` overrides from an arbitrary lookup.
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> MontageResult<Self> {
        if let Some(v) = lookup("MONTAGE_FONT_PATH").filter(|v| !v.is_empty()) {
            self.font_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("MONTAGE_LOGO_PATH").filter(|v| !v.is_empty()) {
            self.watermark.logo_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("MONTAGE_TEMP_DIR").filter(|v| !v.is_empty()) {
            self.temp_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("MONTAGE_WORKERS") {
            let n = v.trim().parse::<usize>().map_err(|_| {
                MontageError::validation(format!("MONTAGE_WORKERS must be an integer, got '{v}'"))
            })?;
            self.workers = Some(n);
        }
        Ok(self)
    }

    /// Check cross-field constraints before a job starts.
    pub fn validate(&self) -> MontageResult<()> {
        self.output.canvas.validate()?;
        Fps::new(self.output.fps.num, self.output.fps.den)?;
        if self.output.audio_sample_rate == 0 || self.output.audio_channels == 0 {
            return Err(MontageError::validation(
                "audio sample rate and channel count must be non-zero",
            ));
        }
        if let Some(0) = self.workers {
            return Err(MontageError::validation("workers must be >= 1 when set"));
        }
        if self.video_chunk_frames == 0 {
            return Err(MontageError::validation("video_chunk_frames must be >= 1"));
        }
        if self.blur.downscale == 0 {
            return Err(MontageError::validation("blur downscale must be >= 1"));
        }
        if !self.blur.sigma.is_finite() || self.blur.sigma <= 0.0 {
            return Err(MontageError::validation("blur sigma must be > 0"));
        }
        let t = &self.timing;
        if !(t.image_min_secs > 0.0 && t.image_min_secs <= t.image_max_secs) {
            return Err(MontageError::validation(
                "image duration clamp must satisfy 0 < min <= max",
            ));
        }
        if !t.crossfade_secs.is_finite() || t.crossfade_secs < 0.0 {
            return Err(MontageError::validation("crossfade_secs must be >= 0"));
        }
        if !self.watermark.duration_secs.is_finite() || self.watermark.duration_secs <= 0.0 {
            return Err(MontageError::validation("watermark duration must be > 0"));
        }
        Ok(())
    }

    /// Locate a loadable font file: the configured path, else the first known system font.
    pub fn resolve_font_path(&self) -> Option<PathBuf> {
        if let Some(p) = &self.font_path {
            return Some(p.clone());
        }
        FONT_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .find(|p| p.is_file())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
