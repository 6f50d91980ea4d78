use super::*;
use crate::config::BlurSpec;
use crate::foundation::core::Canvas;

fn small_canvas() -> Canvas {
    Canvas {
        width: 40,
        height: 72,
    }
}

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    rgba.iter()
        .copied()
        .cycle()
        .take((width * height * 4) as usize)
        .collect()
}

#[test]
fn landscape_output_covers_the_canvas_without_black_bars() {
    let plan = NormalizePlan::compute(160, 90, small_canvas(), &BlurSpec::default()).unwrap();
    let frame = normalize_frame(&plan, solid(160, 90, [200, 10, 10, 255])).unwrap();
    assert!(frame.fits(small_canvas()));
    for y in [0, 35, 71] {
        for x in [0, 20, 39] {
            let px = frame.pixel(x, y);
            assert!(px[0] > 150, "pixel ({x},{y}) = {px:?}");
            assert_eq!(px[3], 255);
        }
    }
}

#[test]
fn portrait_sides_come_from_the_blurred_backdrop() {
    let plan = NormalizePlan::compute(20, 72, small_canvas(), &BlurSpec::default()).unwrap();
    assert_eq!((plan.dst_x, plan.copy_width), (10, 20));
    let frame = normalize_frame(&plan, solid(20, 72, [10, 180, 10, 255])).unwrap();
    assert!(frame.fits(small_canvas()));

    let side = frame.pixel(2, 36);
    assert_eq!(side[3], 255);
    assert!(side[1] > 100, "side pixel should carry the source tint: {side:?}");

    let centre = frame.pixel(20, 36);
    assert_eq!(centre, [10, 180, 10, 255]);
}

#[test]
fn square_source_is_fit_and_centered_vertically() {
    let plan = NormalizePlan::compute(100, 100, small_canvas(), &BlurSpec::default()).unwrap();
    let frame = normalize_frame(&plan, solid(100, 100, [0, 0, 255, 255])).unwrap();
    assert_eq!(frame.data.len(), small_canvas().frame_len());
    assert_eq!(frame.pixel(20, 36), [0, 0, 255, 255]);
}

#[test]
fn buffer_size_mismatch_is_a_decode_error() {
    let plan = NormalizePlan::compute(16, 8, small_canvas(), &BlurSpec::default()).unwrap();
    let err = normalize_frame(&plan, vec![0u8; 10]).unwrap_err();
    assert!(matches!(err, MontageError::Decode(_)));
}
