use std::sync::{Arc, Mutex};

use super::*;
use crate::config::MontageConfig;

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn renderer() -> Option<CaptionRenderer> {
    let path = MontageConfig::default().resolve_font_path()?;
    CaptionRenderer::from_font_file(&path).ok()
}

fn canvas() -> Canvas {
    Canvas {
        width: 360,
        height: 640,
    }
}

#[test]
fn text_only_card_without_logo() {
    let Some(mut r) = renderer() else {
        return;
    };
    let card = build_watermark_card(&mut r, &WatermarkStyle::default(), canvas()).unwrap();
    assert_eq!(card.logo, LogoOutcome::NotConfigured);
    assert!(card.frame.fits(canvas()));
    assert_eq!(card.frame.pixel(0, 0), [0, 0, 0, 255]);
    let middle_row = (canvas().height / 2) as usize * canvas().width as usize * 4;
    let row = &card.frame.data[middle_row - 40 * 360 * 4..middle_row + 40 * 360 * 4];
    assert!(row.chunks_exact(4).any(|px| px[0] > 200));
}

#[test]
fn missing_logo_falls_back_to_text() {
    let Some(mut r) = renderer() else {
        return;
    };
    let style = WatermarkStyle {
        logo_path: Some("/nonexistent/logo.png".into()),
        ..WatermarkStyle::default()
    };
    let card = build_watermark_card(&mut r, &style, canvas()).unwrap();
    assert!(matches!(card.logo, LogoOutcome::Missing(_)));
}

#[test]
fn logo_is_stacked_above_caption() {
    let Some(mut r) = renderer() else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let logo = dir.path().join("logo.png");
    image::RgbaImage::from_pixel(10, 10, image::Rgba([255, 0, 0, 255]))
        .save(&logo)
        .unwrap();
    let style = WatermarkStyle {
        logo_path: Some(logo),
        ..WatermarkStyle::default()
    };
    let card = build_watermark_card(&mut r, &style, canvas()).unwrap();
    assert_eq!(card.logo, LogoOutcome::Drawn);

    let red_rows: Vec<u32> = (0..canvas().height)
        .filter(|&y| {
            let px = card.frame.pixel(180, y);
            px[0] > 250 && px[1] < 5
        })
        .collect();
    assert_eq!(red_rows.len(), 120);
    assert!(red_rows[0] < canvas().height / 2);
}

#[test]
fn unreadable_logo_is_reported_not_fatal() {
    let Some(mut r) = renderer() else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let logo = dir.path().join("logo.png");
    std::fs::write(&logo, b"nope").unwrap();
    let style = WatermarkStyle {
        logo_path: Some(logo),
        ..WatermarkStyle::default()
    };

    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer({
            let logs = logs.clone();
            move || logs.clone()
        })
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let card = tracing::subscriber::with_default(subscriber, || {
        build_watermark_card(&mut r, &style, canvas())
    })
    .unwrap();
    assert!(matches!(card.logo, LogoOutcome::Unreadable(_)));

    // The caller files the outcome in the job report, which does the logging.
    let logged = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(!logged.contains("WARN"), "{logged}");
}
