use super::*;

fn ramp(frames: usize, channels: u16) -> AudioPcm {
    let interleaved_f32 = (0..frames)
        .flat_map(|i| std::iter::repeat_n(i as f32, usize::from(channels)))
        .collect();
    AudioPcm {
        sample_rate: 10,
        channels,
        interleaved_f32,
    }
}

#[test]
fn target_length_follows_rational_fps() {
    assert_eq!(target_sample_frames(225, Fps { num: 30, den: 1 }, 48_000), 360_000);
    assert_eq!(
        target_sample_frames(1, Fps { num: 30_000, den: 1001 }, 48_000),
        1602
    );
}

#[test]
fn longer_source_is_truncated() {
    let out = reconcile(ramp(10, 2), 4).unwrap();
    assert_eq!(out.pcm.frames(), 4);
    assert_eq!(out.pcm.interleaved_f32, vec![0., 0., 1., 1., 2., 2., 3., 3.]);
    assert!(matches!(out.action, ReconcileAction::Truncated { .. }));
}

#[test]
fn shorter_source_loops_from_the_start() {
    let out = reconcile(ramp(3, 1), 8).unwrap();
    assert_eq!(out.pcm.interleaved_f32, vec![0., 1., 2., 0., 1., 2., 0., 1.]);
    assert_eq!(
        out.action,
        ReconcileAction::Looped {
            source_frames: 3,
            target_frames: 8,
            passes: 3
        }
    );
}

#[test]
fn exact_source_passes_through() {
    let src = ramp(5, 2);
    let out = reconcile(src.clone(), 5).unwrap();
    assert_eq!(out.pcm, src);
    assert_eq!(out.action, ReconcileAction::PassThrough { frames: 5 });
}

#[test]
fn output_duration_matches_timeline() {
    let fps = Fps { num: 30, den: 1 };
    let target = target_sample_frames(225, fps, 10);
    let out = reconcile(ramp(17, 2), target).unwrap();
    assert!((out.pcm.duration_secs() - 7.5).abs() < 1e-9);
}

#[test]
fn empty_source_is_a_decode_error() {
    let err = reconcile(ramp(0, 2), 10).unwrap_err();
    assert!(matches!(err, MontageError::Decode(_)));
}

#[test]
fn f32le_file_round_trips_byte_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("track.f32le");
    write_f32le_file(&[0.25, -1.0], &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 8);
    assert_eq!(&bytes[..4], &0.25f32.to_le_bytes());
}
