use super::*;
use crate::config::TimingPolicy;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::{Canvas, Fps};
use crate::sequence::entry::{CompositionEntry, EntryRole, EntrySource};
use crate::sequence::timeline::Sequencer;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn canvas() -> Canvas {
    Canvas {
        width: 4,
        height: 4,
    }
}

fn pool() -> rayon::ThreadPool {
    rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap()
}

fn timeline(mode: CrossfadeMode) -> Timeline {
    let entry = |rgba, i| {
        CompositionEntry::still(
            CanvasFrame::solid(canvas(), rgba),
            1.0,
            None,
            EntryRole::Content { asset_index: i },
        )
    };
    Sequencer::new(
        canvas(),
        Fps::new(10, 1).unwrap(),
        &TimingPolicy {
            crossfade_secs: 0.5,
            crossfade_mode: mode,
            ..TimingPolicy::default()
        },
    )
    .assemble(vec![entry(RED, 0), entry(BLUE, 1)])
    .unwrap()
}

fn render(tl: &Timeline) -> Vec<CanvasFrame> {
    let pool = pool();
    let mut sink = InMemorySink::new();
    let stats = FrameProducer::new(tl, &pool, 4)
        .render_all(&mut sink, &CancelToken::new())
        .unwrap();
    assert_eq!(stats.frames_written, tl.total_frames());
    sink.frames().iter().map(|(_, f)| f.clone()).collect()
}

#[test]
fn extend_mode_fades_over_the_previous_last_frame() {
    let tl = timeline(CrossfadeMode::Extend);
    let frames = render(&tl);
    assert_eq!(frames.len(), 20);
    assert!(frames[..10].iter().all(|f| f.pixel(0, 0) == RED));
    let blues: Vec<u8> = frames[10..15].iter().map(|f| f.pixel(0, 0)[2]).collect();
    assert!(blues.windows(2).all(|w| w[0] < w[1]), "{blues:?}");
    assert!(blues[0] > 0 && blues[4] < 255);
    assert!(frames[15..].iter().all(|f| f.pixel(0, 0) == BLUE));
}

#[test]
fn overlap_mode_shortens_the_timeline() {
    let tl = timeline(CrossfadeMode::Overlap);
    let frames = render(&tl);
    assert_eq!(frames.len(), 15);
    assert!(frames[..5].iter().all(|f| f.pixel(0, 0) == RED));
    assert!(frames[5..10].iter().all(|f| {
        let px = f.pixel(0, 0);
        px[0] > 0 && px[2] > 0
    }));
    assert!(frames[10..].iter().all(|f| f.pixel(0, 0) == BLUE));
}

#[test]
fn single_frame_render_matches_the_stream() {
    for mode in [CrossfadeMode::Extend, CrossfadeMode::Overlap] {
        let tl = timeline(mode);
        let frames = render(&tl);
        let pool = pool();
        let producer = FrameProducer::new(&tl, &pool, 4);
        for (i, expected) in frames.iter().enumerate() {
            let got = producer.render_frame_at(FrameIndex(i as u64)).unwrap();
            assert_eq!(&got, expected, "mode {mode:?} frame {i}");
        }
        assert!(producer.render_frame_at(FrameIndex(frames.len() as u64)).is_err());
    }
}

#[test]
fn transitions_leave_entry_frames_untouched() {
    let tl = timeline(CrossfadeMode::Extend);
    let _ = render(&tl);
    for (entry, rgba) in tl.entries().iter().zip([RED, BLUE]) {
        let EntrySource::Still(frame) = &entry.source else {
            panic!("expected still entry");
        };
        assert!(frame.data.chunks_exact(4).all(|px| px == rgba));
    }
}

#[test]
fn cancellation_stops_the_render() {
    let tl = timeline(CrossfadeMode::Extend);
    let pool = pool();
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut sink = InMemorySink::new();
    let err = FrameProducer::new(&tl, &pool, 4)
        .render_all(&mut sink, &cancel)
        .unwrap_err();
    assert!(matches!(err, MontageError::Cancelled));
    assert!(sink.frames().is_empty());
}

#[test]
fn fade_alpha_stays_inside_the_unit_interval() {
    assert!(fade_alpha(0, 1) > 0.0 && fade_alpha(0, 1) < 1.0);
    assert!(fade_alpha(29, 30) < 1.0);
    assert!(fade_alpha(0, 30) < fade_alpha(1, 30));
}
