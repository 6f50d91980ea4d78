use super::*;
use crate::foundation::core::CanvasFrame;
use crate::sequence::entry::EntryRole;

fn canvas() -> Canvas {
    Canvas {
        width: 4,
        height: 4,
    }
}

fn still(duration_secs: f64, index: usize) -> CompositionEntry {
    CompositionEntry::still(
        CanvasFrame::solid(canvas(), [0, 0, 0, 255]),
        duration_secs,
        None,
        EntryRole::Content { asset_index: index },
    )
}

fn sequencer(mode: CrossfadeMode) -> Sequencer {
    Sequencer::new(
        canvas(),
        Fps::new(30, 1).unwrap(),
        &TimingPolicy {
            crossfade_mode: mode,
            ..TimingPolicy::default()
        },
    )
}

#[test]
fn extend_mode_total_is_sum_of_durations() {
    let tl = sequencer(CrossfadeMode::Extend)
        .assemble(vec![still(3.0, 0), still(4.0, 1), still(0.5, 2)])
        .unwrap();
    let lens: Vec<u64> = tl.spans().iter().map(EntrySpan::len_frames).collect();
    let fades: Vec<u64> = tl.spans().iter().map(|s| s.fade_in_frames).collect();
    assert_eq!(lens, vec![90, 120, 15]);
    assert_eq!(fades, vec![0, 30, 15]);
    assert_eq!(tl.total_frames(), 225);
    assert!((tl.duration_secs() - 7.5).abs() < 1e-9);
    assert_eq!(tl.spans()[1].range.start, FrameIndex(90));
}

#[test]
fn overlap_mode_subtracts_fade_windows() {
    let tl = sequencer(CrossfadeMode::Overlap)
        .assemble(vec![still(3.0, 0), still(4.0, 1), still(0.5, 2)])
        .unwrap();
    let starts: Vec<u64> = tl.spans().iter().map(|s| s.range.start.0).collect();
    assert_eq!(starts, vec![0, 60, 165]);
    assert_eq!(tl.total_frames(), 180);
    assert!((tl.duration_secs() - 6.0).abs() < 1e-9);
}

#[test]
fn overlap_never_reaches_into_previous_fade_window() {
    let tl = sequencer(CrossfadeMode::Overlap)
        .assemble(vec![still(1.0, 0), still(1.0, 1), still(1.0, 2)])
        .unwrap();
    let fades: Vec<u64> = tl.spans().iter().map(|s| s.fade_in_frames).collect();
    assert_eq!(fades, vec![0, 30, 0]);
    assert_eq!(tl.total_frames(), 60);
}

#[test]
fn single_entry_has_no_fade() {
    let tl = sequencer(CrossfadeMode::Extend)
        .assemble(vec![still(2.0, 0)])
        .unwrap();
    assert_eq!(tl.spans()[0].fade_in_frames, 0);
    assert_eq!(tl.total_frames(), 60);
}

#[test]
fn empty_timeline_is_an_input_error() {
    let err = sequencer(CrossfadeMode::Extend)
        .assemble(Vec::new())
        .unwrap_err();
    assert!(matches!(err, MontageError::Input(_)));
}

#[test]
fn non_positive_duration_is_rejected() {
    assert!(
        sequencer(CrossfadeMode::Extend)
            .assemble(vec![still(0.0, 0)])
            .is_err()
    );
}

#[test]
fn entry_at_prefers_the_incoming_entry_inside_an_overlap() {
    let tl = sequencer(CrossfadeMode::Overlap)
        .assemble(vec![still(3.0, 0), still(4.0, 1)])
        .unwrap();
    assert_eq!(tl.entry_at(FrameIndex(59)), Some(0));
    assert_eq!(tl.entry_at(FrameIndex(60)), Some(1));
    assert_eq!(tl.entry_at(FrameIndex(tl.total_frames())), None);
}
