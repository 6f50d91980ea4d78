use super::*;
use crate::foundation::core::{Canvas, Fps};

fn small_spec() -> OutputSpec {
    OutputSpec {
        canvas: Canvas {
            width: 32,
            height: 48,
        },
        ..OutputSpec::default()
    }
}

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn output_args_carry_the_compatibility_policy() {
    let args = output_args(&OutputSpec::default(), true);
    let joined = args.join(" ");
    for needle in [
        "-c:v libx264",
        "-preset ultrafast",
        "-profile:v high",
        "-level 4.0",
        "-crf 23",
        "-b:v 4000k",
        "-pix_fmt yuv420p",
        "-threads 4",
        "-c:a aac",
        "-b:a 192k",
        "-movflags +faststart",
    ] {
        assert!(joined.contains(needle), "missing `{needle}` in `{joined}`");
    }
    assert!(!joined.contains("-an"));
}

#[test]
fn output_args_without_audio_disable_the_stream() {
    let spec = OutputSpec {
        faststart: false,
        ..OutputSpec::default()
    };
    let args = output_args(&spec, false);
    assert!(args.iter().any(|a| a == "-an"));
    assert!(!args.iter().any(|a| a == "+faststart"));
}

#[test]
fn push_before_begin_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(dir.path().join("x.mp4"), small_spec()));
    let frame = CanvasFrame::solid(small_spec().canvas, [0, 0, 0, 255]);
    assert!(matches!(
        sink.push_frame(FrameIndex(0), &frame),
        Err(MontageError::Encode(_))
    ));
}

#[test]
fn encodes_a_short_clip_when_ffmpeg_is_available() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("clip.mp4");
    let spec = small_spec();
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out, spec.clone()));
    sink.begin(SinkConfig {
        canvas: spec.canvas,
        fps: Fps::new(30, 1).unwrap(),
        audio: None,
    })
    .unwrap();
    for i in 0..6u64 {
        let frame = CanvasFrame::solid(spec.canvas, [(i * 40) as u8, 0, 0, 255]);
        sink.push_frame(FrameIndex(i), &frame).unwrap();
    }
    sink.end().unwrap();
    drop(sink);
    assert!(out.is_file());
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
}

#[test]
fn dropping_an_unfinished_sink_removes_the_partial_file() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("partial.mp4");
    let spec = small_spec();
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out, spec.clone()));
    sink.begin(SinkConfig {
        canvas: spec.canvas,
        fps: Fps::new(30, 1).unwrap(),
        audio: None,
    })
    .unwrap();
    sink.push_frame(FrameIndex(0), &CanvasFrame::solid(spec.canvas, [0, 0, 0, 255]))
        .unwrap();
    drop(sink);
    assert!(!out.exists());
}

#[test]
fn size_mismatch_aborts_and_cleans_up() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("bad.mp4");
    let spec = small_spec();
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out, spec.clone()));
    sink.begin(SinkConfig {
        canvas: spec.canvas,
        fps: Fps::new(30, 1).unwrap(),
        audio: None,
    })
    .unwrap();
    let wrong = CanvasFrame::solid(
        Canvas {
            width: 16,
            height: 16,
        },
        [0, 0, 0, 255],
    );
    assert!(sink.push_frame(FrameIndex(0), &wrong).is_err());
    assert!(!out.exists());
}
