use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::config::OutputSpec;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{CanvasFrame, FrameIndex};
use crate::foundation::error::{MontageError, MontageResult};
use crate::foundation::math::mul_div255_u16;

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
    /// Codec and container policy.
    pub output: OutputSpec,
}

impl FfmpegSinkOpts {
    /// Options for writing `out_path` with the given encode policy.
    pub fn new(out_path: impl Into<PathBuf>, output: OutputSpec) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            output,
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to its stdin.
///
/// The output file only survives a successful `end`. Any failure, or dropping the sink before
/// `end`, kills the encoder and removes the partial file.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    committed: bool,
}

impl FfmpegSink {
    /// Create a sink that streams into `ffmpeg`. Nothing is spawned until `begin`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
            committed: false,
        }
    }

    /// Output path of the encoded artifact.
    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
        if !self.committed && self.cfg.is_some() {
            let _ = std::fs::remove_file(&self.opts.out_path);
        }
        self.cfg = None;
    }

    fn fail<T>(&mut self, err: MontageError) -> MontageResult<T> {
        self.abort();
        Err(err)
    }
}

/// Encoder arguments after the inputs, derived from the output policy.
pub(crate) fn output_args(spec: &OutputSpec, with_audio: bool) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-c:v".into(),
        spec.video_codec.clone(),
        "-preset".into(),
        spec.preset.clone(),
        "-profile:v".into(),
        spec.profile.clone(),
        "-level".into(),
        spec.level.clone(),
        "-crf".into(),
        spec.crf.to_string(),
        "-b:v".into(),
        spec.video_bitrate.clone(),
        "-pix_fmt".into(),
        spec.pixel_format.clone(),
        "-threads".into(),
        spec.encoder_threads.to_string(),
    ];
    if with_audio {
        args.extend([
            "-c:a".into(),
            spec.audio_codec.clone(),
            "-b:a".into(),
            spec.audio_bitrate.clone(),
        ]);
    } else {
        args.push("-an".into());
    }
    if spec.faststart {
        args.extend(["-movflags".into(), "+faststart".into()]);
    }
    args
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> MontageResult<()> {
        cfg.canvas.validate()?;
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(MontageError::validation("fps must be non-zero"));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(MontageError::encode(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(MontageError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });

        // Input: raw RGBA8. Frames are flattened to opaque before they reach stdin.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.canvas.width, cfg.canvas.height),
            "-r",
            &format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i",
            "pipe:0",
        ]);

        if let Some(audio) = cfg.audio.as_ref() {
            if audio.sample_rate == 0 || audio.channels == 0 {
                return Err(MontageError::validation(
                    "audio sample rate and channels must be non-zero when audio is enabled",
                ));
            }
            cmd.args([
                "-f",
                "f32le",
                "-ar",
                &audio.sample_rate.to_string(),
                "-ac",
                &audio.channels.to_string(),
                "-i",
            ])
            .arg(&audio.path);
        }
        cmd.args(output_args(&self.opts.output, cfg.audio.is_some()));
        cmd.arg(&self.opts.out_path);

        tracing::debug!(out = %self.opts.out_path.display(), audio = cfg.audio.is_some(), "spawning ffmpeg encoder");
        let mut child = cmd.spawn().map_err(|e| {
            MontageError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| MontageError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| MontageError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; cfg.canvas.frame_len()];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.committed = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &CanvasFrame) -> MontageResult<()> {
        let Some(cfg) = self.cfg.as_ref() else {
            return Err(MontageError::encode("ffmpeg sink not started"));
        };
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return self.fail(MontageError::validation(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        if !frame.fits(cfg.canvas) || frame.data.len() != self.scratch.len() {
            let msg = format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.canvas.width, cfg.canvas.height
            );
            return self.fail(MontageError::validation(msg));
        }
        self.last_idx = Some(idx);

        let bg = self.opts.output.background_rgba;
        flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, bg)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(MontageError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        if let Err(e) = stdin.write_all(&self.scratch) {
            return self.fail(MontageError::encode(format!(
                "failed to write frame to ffmpeg stdin: {e}"
            )));
        }
        Ok(())
    }

    fn end(&mut self) -> MontageResult<()> {
        drop(self.stdin.take());
        let Some(mut child) = self.child.take() else {
            return Err(MontageError::encode("ffmpeg sink not started"));
        };

        let status = match child.wait() {
            Ok(status) => status,
            Err(e) => {
                return self.fail(MontageError::encode(format!(
                    "failed to wait for ffmpeg to finish: {e}"
                )));
            }
        };
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle.join().ok().and_then(|r| r.ok()).unwrap_or_default(),
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return self.fail(MontageError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.committed = true;
        self.cfg = None;
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if !self.committed {
            self.abort();
        }
    }
}

fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> MontageResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(MontageError::validation(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        d[0] = (s[0] as u16 + mul_div255_u16(bg_r, inv)).min(255) as u8;
        d[1] = (s[1] as u16 + mul_div255_u16(bg_g, inv)).min(255) as u8;
        d[2] = (s[2] as u16 + mul_div255_u16(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> MontageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
