use std::io::{ErrorKind, Read};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::JoinHandle;

use crate::foundation::core::{Fps, premultiply_rgba8_in_place};
use crate::foundation::error::{MontageError, MontageResult};
use crate::media::probe::VideoSourceInfo;

/// Frame-at-a-time decoder over a child `ffmpeg` process.
///
/// `ffmpeg` resamples the source to the output frame rate and writes raw RGBA8 frames to a
/// pipe; each [`VideoFrameStream::next_frame`] call reads exactly one frame. Nothing beyond the
/// pipe buffer is held, so memory does not grow with clip length. Dropping the stream kills
/// and reaps the child.
pub struct VideoFrameStream {
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    frame_len: usize,
    source: String,
    finished: bool,
}

impl VideoFrameStream {
    /// Start decoding `info` at `start_sec`, limited to `max_secs` of source time.
    pub fn open(
        info: &VideoSourceInfo,
        fps: Fps,
        start_sec: f64,
        max_secs: f64,
    ) -> MontageResult<Self> {
        let frame_len = (info.width as usize) * (info.height as usize) * 4;
        if frame_len == 0 {
            return Err(MontageError::decode(
                "decoded video frame size is zero (invalid source dimensions)",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .args(["-v", "error", "-nostdin"]);
        if start_sec > 0.0 {
            cmd.args(["-ss", &format!("{start_sec:.6}")]);
        }
        cmd.arg("-i")
            .arg(&info.source_path)
            .args(["-t", &format!("{:.6}", max_secs.max(0.0))])
            .args([
                "-an",
                "-vf",
                &format!("fps={}/{}", fps.num, fps.den),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "pipe:1",
            ]);

        let mut child = cmd.spawn().map_err(|e| {
            MontageError::decode(format!(
                "failed to spawn ffmpeg for '{}': {e}",
                info.source_path.display()
            ))
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MontageError::decode("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| MontageError::decode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        Ok(Self {
            child: Some(child),
            stdout: Some(stdout),
            stderr_drain: Some(stderr_drain),
            frame_len,
            source: info.source_path.display().to_string(),
            finished: false,
        })
    }

    /// Read the next frame as premultiplied RGBA8, or `None` once the source is exhausted.
    pub fn next_frame(&mut self) -> MontageResult<Option<Vec<u8>>> {
        if self.finished {
            return Ok(None);
        }
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut buf = vec![0u8; self.frame_len];
        match stdout.read_exact(&mut buf) {
            Ok(()) => {
                premultiply_rgba8_in_place(&mut buf);
                Ok(Some(buf))
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                self.finish()?;
                Ok(None)
            }
            Err(e) => Err(MontageError::decode(format!(
                "failed reading frames from ffmpeg for '{}': {e}",
                self.source
            ))),
        }
    }

    fn finish(&mut self) -> MontageResult<()> {
        self.finished = true;
        drop(self.stdout.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child
            .wait()
            .map_err(|e| MontageError::decode(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = match self.stderr_drain.take() {
            Some(handle) => handle.join().ok().and_then(|r| r.ok()).unwrap_or_default(),
            None => Vec::new(),
        };
        if !status.success() {
            return Err(MontageError::decode(format!(
                "ffmpeg video decode failed for '{}': {}",
                self.source,
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        Ok(())
    }
}

impl Drop for VideoFrameStream {
    fn drop(&mut self) {
        drop(self.stdout.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
    }
}
