use super::*;

#[test]
fn classifies_by_extension_case_insensitively() {
    assert_eq!(MediaKind::from_file_name("a.MP4"), Some(MediaKind::Video));
    assert_eq!(MediaKind::from_file_name("clip.mov"), Some(MediaKind::Video));
    assert_eq!(MediaKind::from_file_name("x.JPG"), Some(MediaKind::Image));
    assert_eq!(MediaKind::from_file_name("x.jpeg"), Some(MediaKind::Image));
    assert_eq!(MediaKind::from_file_name("x.png"), Some(MediaKind::Image));
    assert_eq!(MediaKind::from_file_name("x.gif"), None);
    assert_eq!(MediaKind::from_file_name("noext"), None);
}

#[test]
fn image_asset_takes_clamped_duration_and_decoded_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wide.png");
    image::RgbaImage::from_pixel(8, 4, image::Rgba([10, 20, 30, 255]))
        .save(&path)
        .unwrap();

    let loaded = load_asset(0, MediaKind::Image, &path, Some(30.0), &TimingPolicy::default())
        .unwrap();
    let asset = loaded.asset();
    assert_eq!((asset.width, asset.height), (8, 4));
    assert_eq!(asset.duration_secs, 3.0);
    assert!(matches!(loaded, LoadedAsset::Image { .. }));
}

#[test]
fn undecodable_image_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"nope").unwrap();
    let err = load_asset(0, MediaKind::Image, &path, None, &TimingPolicy::default()).unwrap_err();
    assert!(matches!(err, MontageError::Decode(_)));
}
