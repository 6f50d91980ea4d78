use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::foundation::error::{MontageError, MontageResult};

/// Basic metadata about a source video file.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoSourceInfo {
    /// Source path used for decoding.
    pub source_path: PathBuf,
    /// Display width in pixels (rotation applied).
    pub width: u32,
    /// Display height in pixels (rotation applied).
    pub height: u32,
    /// Source frame rate as reported by `r_frame_rate`.
    pub fps_num: u32,
    /// Source frame rate denominator.
    pub fps_den: u32,
    /// Container duration in seconds.
    pub duration_sec: f64,
    /// Whether ffprobe detected at least one audio stream.
    pub has_audio: bool,
}

#[derive(serde::Deserialize)]
struct ProbeSideData {
    rotation: Option<f64>,
}

#[derive(serde::Deserialize)]
struct ProbeTags {
    rotate: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
    tags: Option<ProbeTags>,
    side_data_list: Option<Vec<ProbeSideData>>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Probe source video metadata through `ffprobe`.
pub fn probe_video(source_path: &Path) -> MontageResult<VideoSourceInfo> {
    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| MontageError::decode(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(MontageError::decode(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    parse_probe_json(source_path, &out.stdout)
}

pub(crate) fn parse_probe_json(source_path: &Path, json: &[u8]) -> MontageResult<VideoSourceInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| MontageError::decode(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| MontageError::decode("no video stream found"))?;
    let coded_w = video_stream
        .width
        .ok_or_else(|| MontageError::decode("missing video width from ffprobe"))?;
    let coded_h = video_stream
        .height
        .ok_or_else(|| MontageError::decode("missing video height from ffprobe"))?;
    if coded_w == 0 || coded_h == 0 {
        return Err(MontageError::decode("video stream has zero area"));
    }

    // ffmpeg autorotates on decode, so report the displayed orientation.
    let (width, height) = if is_quarter_turn(stream_rotation(video_stream)) {
        (coded_h, coded_w)
    } else {
        (coded_w, coded_h)
    };

    let (fps_num, fps_den) = parse_ff_ratio(video_stream.r_frame_rate.as_deref().unwrap_or("0/1"))
        .unwrap_or((0, 1));
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(video_stream.duration.as_deref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);
    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        fps_num,
        fps_den,
        duration_sec,
        has_audio,
    })
}

fn stream_rotation(stream: &ProbeStream) -> f64 {
    if let Some(r) = stream
        .side_data_list
        .iter()
        .flatten()
        .find_map(|sd| sd.rotation)
    {
        return r;
    }
    stream
        .tags
        .as_ref()
        .and_then(|t| t.rotate.as_deref())
        .and_then(|r| r.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn is_quarter_turn(degrees: f64) -> bool {
    let d = (degrees.round() as i64).rem_euclid(360);
    d == 90 || d == 270
}

fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let (num, den) = s.split_once('/')?;
    let num = num.trim().parse::<u32>().ok()?;
    let den = den.trim().parse::<u32>().ok()?;
    if den == 0 {
        return None;
    }
    Some((num, den))
}

/// Return `true` when both `ffmpeg` and `ffprobe` can be invoked from `PATH`.
pub fn ffmpeg_tools_available() -> bool {
    ["ffmpeg", "ffprobe"].iter().all(|tool| {
        Command::new(tool)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    })
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
