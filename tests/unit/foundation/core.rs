use super::*;

#[test]
fn fps_rounds_half_second_to_whole_frames() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.secs_to_frames_round(0.5), 15);
    assert_eq!(fps.secs_to_frames_round(3.0), 90);
    assert_eq!(fps.secs_to_frames_round(-1.0), 0);
    assert_eq!(fps.secs_to_frames_round(f64::NAN), 0);
    assert!((fps.frames_to_secs(225) - 7.5).abs() < 1e-9);
}

#[test]
fn fps_rejects_zero_terms() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn canvas_requires_even_non_zero_dimensions() {
    assert!(Canvas::new(720, 1280).is_ok());
    assert!(Canvas::new(721, 1280).is_err());
    assert!(Canvas::new(0, 1280).is_err());
}

#[test]
fn frame_range_len_and_contains() {
    let r = FrameRange::new(FrameIndex(10), FrameIndex(15)).unwrap();
    assert_eq!(r.len_frames(), 5);
    assert!(r.contains(FrameIndex(10)));
    assert!(!r.contains(FrameIndex(15)));
    assert!(FrameRange::new(FrameIndex(3), FrameIndex(2)).is_err());
}

#[test]
fn canvas_frame_checks_byte_length() {
    assert!(CanvasFrame::from_premul(2, 2, vec![0; 16]).is_ok());
    assert!(CanvasFrame::from_premul(2, 2, vec![0; 15]).is_err());
}

#[test]
fn solid_frame_fills_every_pixel() {
    let canvas = Canvas::new(4, 2).unwrap();
    let frame = CanvasFrame::solid(canvas, [1, 2, 3, 255]);
    assert!(frame.fits(canvas));
    assert!(frame.data.chunks_exact(4).all(|px| px == [1, 2, 3, 255]));
    assert_eq!(frame.pixel(3, 1), [1, 2, 3, 255]);
}

#[test]
fn premultiply_handles_alpha_extremes() {
    let mut px = vec![200u8, 100, 50, 0, 200, 100, 50, 255, 200, 100, 50, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[0..4], &[0, 0, 0, 0]);
    assert_eq!(&px[4..8], &[200, 100, 50, 255]);
    assert_eq!(px[8], ((200u16 * 128 + 127) / 255) as u8);
    assert_eq!(premul_rgba8([255, 255, 255, 255]), [255, 255, 255, 255]);
}
