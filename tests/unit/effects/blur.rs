use super::*;

#[test]
fn blur_radius_0_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    let out = blur_rgba8_premul(&src, 1, 2, 0, 1.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_constant_image_is_identity() {
    let (w, h) = (4u32, 3u32);
    let px = [10u8, 20u8, 30u8, 255u8];
    let src = px.repeat((w * h) as usize);
    let out = blur_rgba8_premul(&src, w, h, 12, 7.5).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_spreads_energy_from_single_pixel() {
    let (w, h) = (5u32, 5u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((2 * w + 2) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = blur_rgba8_premul(&src, w, h, 2, 1.2).unwrap();

    let nonzero = out.chunks_exact(4).filter(|px| px[3] != 0).count();
    assert!(nonzero > 1);

    let sum_a: u32 = out.chunks_exact(4).map(|px| u32::from(px[3])).sum();
    assert!((sum_a as i32 - 255).abs() <= 4);
}

#[test]
fn blur_rejects_mismatched_buffer() {
    assert!(blur_rgba8_premul(&[0u8; 7], 1, 2, 1, 1.0).is_err());
    assert!(blur_rgba8_premul(&[0u8; 8], 1, 2, 1, 0.0).is_err());
}

#[test]
fn taps_are_symmetric_and_sum_to_one() {
    for (radius, sigma) in [(1, 0.5), (12, 7.5), (49, 30.0)] {
        let taps = gaussian_taps(radius, sigma).unwrap();
        assert_eq!(taps.len(), 2 * radius + 1);
        assert_eq!(taps.iter().sum::<u32>(), TAP_ONE);
        assert!(taps[radius] >= taps[0]);
        for i in 0..radius {
            assert!(taps[i].abs_diff(taps[2 * radius - i]) <= 1);
        }
    }
}

#[test]
fn non_square_input_keeps_its_layout() {
    // Columns differ, rows are identical: the vertical pass must leave every row the same and
    // the horizontal pass must keep the dark-to-bright order.
    let (w, h) = (6u32, 3u32);
    let row: Vec<u8> = (0..w)
        .flat_map(|x| {
            let v = (x * 50) as u8;
            [v, v, v, 255]
        })
        .collect();
    let src = row.repeat(h as usize);
    let out = blur_rgba8_premul(&src, w, h, 2, 1.0).unwrap();

    let rows: Vec<&[u8]> = out.chunks_exact((w * 4) as usize).collect();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| *r == rows[0]));
    let reds: Vec<u8> = rows[0].chunks_exact(4).map(|px| px[0]).collect();
    assert!(reds.windows(2).all(|p| p[0] < p[1]), "{reds:?}");
    assert!(rows[0].chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn backdrop_scales_kernel_with_downscale() {
    let canvas = Canvas {
        width: 720,
        height: 1280,
    };
    let b = Backdrop::for_canvas(canvas, &BlurSpec::default());
    assert_eq!((b.width, b.height, b.radius), (180, 320, 12));
    assert!((b.sigma - 7.5).abs() < 1e-6);

    let off = Backdrop::for_canvas(
        canvas,
        &BlurSpec {
            radius_px: 0,
            ..BlurSpec::default()
        },
    );
    assert_eq!(off.radius, 0);
}

#[test]
fn backdrop_is_opaque_and_canvas_sized() {
    let canvas = Canvas {
        width: 40,
        height: 72,
    };
    let backdrop = Backdrop::for_canvas(canvas, &BlurSpec::default());
    let mut source = RgbaImage::new(20, 40);
    for (x, _, px) in source.enumerate_pixels_mut() {
        // Left half opaque green, right half transparent.
        *px = if x < 10 {
            image::Rgba([0, 200, 0, 255])
        } else {
            image::Rgba([0, 0, 0, 0])
        };
    }
    let frame = backdrop.render(&source, canvas).unwrap();
    assert!(frame.fits(canvas));
    assert!(frame.data.chunks_exact(4).all(|px| px[3] == 255));
    assert!(frame.pixel(0, 36)[1] > frame.pixel(39, 36)[1]);
}
