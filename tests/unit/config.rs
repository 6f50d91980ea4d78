use super::*;

#[test]
fn defaults_match_mobile_policy() {
    let cfg = MontageConfig::default();
    assert_eq!(cfg.output.canvas, Canvas { width: 720, height: 1280 });
    assert_eq!(cfg.output.fps, Fps { num: 30, den: 1 });
    assert_eq!(cfg.output.pixel_format, "yuv420p");
    assert!(cfg.output.faststart);
    assert_eq!(cfg.watermark.duration_secs, 0.5);
    assert_eq!(cfg.timing.crossfade_secs, 1.0);
    cfg.validate().unwrap();
}

#[test]
fn image_duration_is_clamped_and_defaulted() {
    let t = TimingPolicy::default();
    assert_eq!(t.image_duration(Some(30.0)), 3.0);
    assert_eq!(t.image_duration(Some(1.0)), 2.0);
    assert_eq!(t.image_duration(Some(2.5)), 2.5);
    assert_eq!(t.image_duration(None), 3.0);
    assert_eq!(t.image_duration(Some(f64::INFINITY)), 3.0);
}

#[test]
fn partial_json_keeps_defaults() {
    let cfg: MontageConfig =
        serde_json::from_str(r#"{ "output": { "crf": 20 }, "timing": { "crossfade_mode": "overlap" } }"#)
            .unwrap();
    assert_eq!(cfg.output.crf, 20);
    assert_eq!(cfg.output.video_codec, "libx264");
    assert_eq!(cfg.timing.crossfade_mode, CrossfadeMode::Overlap);
    assert_eq!(cfg.title.top_padding_px, 50);
}

#[test]
fn env_overrides_apply() {
    let cfg = MontageConfig::default()
        .with_overrides_from(|k| match k {
            "MONTAGE_WORKERS" => Some("3".to_string()),
            "MONTAGE_FONT_PATH" => Some("/fonts/a.ttf".to_string()),
            _ => None,
        })
        .unwrap();
    assert_eq!(cfg.workers, Some(3));
    assert_eq!(cfg.resolve_font_path(), Some(PathBuf::from("/fonts/a.ttf")));
}

#[test]
fn env_override_rejects_garbage_workers() {
    let err = MontageConfig::default()
        .with_overrides_from(|k| (k == "MONTAGE_WORKERS").then(|| "many".to_string()))
        .unwrap_err();
    assert!(err.to_string().contains("MONTAGE_WORKERS"));
}

#[test]
fn validate_rejects_odd_canvas() {
    let mut cfg = MontageConfig::default();
    cfg.output.canvas.width = 721;
    assert!(cfg.validate().is_err());
}
