//! Helpers shared by the integration tests

#![allow(dead_code)]

use cardforge::{CardRecord, RendererConfig};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::PathBuf;

pub fn font_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

pub fn config() -> RendererConfig {
    RendererConfig {
        bold_font: font_dir().join("DejaVuSans-Bold.ttf"),
        regular_font: font_dir().join("DejaVuSans.ttf"),
        logo_timeout_ms: 500,
        ..Default::default()
    }
}

pub fn lee() -> CardRecord {
    CardRecord {
        name: "Lee".into(),
        title: None,
        company: None,
        phone: Some("010-1234-5678".into()),
        email: Some("a@b.com".into()),
        logo_url: None,
    }
}

pub fn solid_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cardforge-{}-{}", tag, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
