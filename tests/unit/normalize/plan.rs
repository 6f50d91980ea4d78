use super::*;

fn canvas() -> Canvas {
    Canvas {
        width: 720,
        height: 1280,
    }
}

#[test]
fn classify_compares_width_to_height() {
    assert_eq!(Orientation::classify(1920, 1080), Orientation::Landscape);
    assert_eq!(Orientation::classify(1080, 1920), Orientation::PortraitOrSquare);
    assert_eq!(Orientation::classify(500, 500), Orientation::PortraitOrSquare);
}

#[test]
fn landscape_fills_height_and_center_crops_width() {
    let plan = NormalizePlan::compute(1920, 1080, canvas(), &BlurSpec::default()).unwrap();
    assert_eq!(plan.orientation, Orientation::Landscape);
    assert_eq!(plan.scaled_height, 1280);
    assert_eq!(plan.scaled_width, 2276);
    assert_eq!(plan.crop_x, (2276 - 720) / 2);
    assert_eq!((plan.dst_x, plan.dst_y), (0, 0));
    assert_eq!((plan.copy_width, plan.copy_height), (720, 1280));
    assert!(plan.background.is_none());
}

#[test]
fn degenerate_landscape_pads_symmetrically() {
    // Wider than tall, but narrower than the canvas aspect once scaled.
    let c = Canvas {
        width: 1280,
        height: 720,
    };
    let plan = NormalizePlan::compute(101, 100, c, &BlurSpec::default()).unwrap();
    assert_eq!(plan.orientation, Orientation::Landscape);
    assert_eq!(plan.scaled_width, 727);
    assert_eq!(plan.crop_x, 0);
    assert_eq!(plan.dst_x, (1280 - 727) / 2);
    assert_eq!(plan.copy_width, 727);
}

#[test]
fn portrait_fits_inside_and_centers() {
    let plan = NormalizePlan::compute(1080, 1920, canvas(), &BlurSpec::default()).unwrap();
    assert_eq!(plan.orientation, Orientation::PortraitOrSquare);
    assert_eq!((plan.scaled_width, plan.scaled_height), (720, 1280));
    assert_eq!((plan.dst_x, plan.dst_y), (0, 0));

    let square = NormalizePlan::compute(1000, 1000, canvas(), &BlurSpec::default()).unwrap();
    assert_eq!((square.scaled_width, square.scaled_height), (720, 720));
    assert_eq!((square.dst_x, square.dst_y), (0, 280));
    assert_eq!((square.crop_x, square.crop_y), (0, 0));
}

#[test]
fn portrait_background_scales_blur_with_downscale() {
    let plan = NormalizePlan::compute(600, 1000, canvas(), &BlurSpec::default()).unwrap();
    let bg = plan.background.unwrap();
    assert_eq!((bg.width, bg.height), (180, 320));
    assert_eq!(bg.radius, 12);
    assert!((bg.sigma - 7.5).abs() < 1e-6);
}

#[test]
fn zero_area_source_is_decode_error() {
    let err = NormalizePlan::compute(0, 100, canvas(), &BlurSpec::default()).unwrap_err();
    assert!(matches!(err, MontageError::Decode(_)));
}
