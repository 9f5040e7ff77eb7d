//! Logo compositing.
//!
//! Fetching, decoding and resizing can each fail; any failure leaves the
//! canvas exactly as it was and is only logged.

use crate::rendering::layout::{self, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::{Error, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbImage, RgbaImage};

/// Where logo bytes come from.
///
/// Implementations must return within a bounded time; the renderer calls
/// `fetch` once per render and never retries.
pub trait LogoSource: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// A source that answers every request with the same bytes (or the same failure)
#[derive(Debug, Clone)]
pub struct StaticLogoSource {
    bytes: Option<Vec<u8>>,
}

impl StaticLogoSource {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes: Some(bytes) }
    }

    /// A source where every fetch fails, as if the host were unreachable
    pub fn unreachable() -> Self {
        Self { bytes: None }
    }
}

impl LogoSource for StaticLogoSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.bytes
            .clone()
            .ok_or_else(|| Error::NetworkError(format!("{} is unreachable", url)))
    }
}

/// Fetches logos with a blocking HTTP client
#[cfg(feature = "http")]
pub struct HttpLogoSource {
    client: reqwest::blocking::Client,
    max_bytes: u64,
}

#[cfg(feature = "http")]
impl HttpLogoSource {
    pub fn new(config: &crate::RendererConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_millis(config.logo_timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                Error::InitializationError(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client, max_bytes: config.max_logo_bytes })
    }
}

#[cfg(feature = "http")]
impl LogoSource for HttpLogoSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        use std::io::Read;

        let parsed = url::Url::parse(url)
            .map_err(|e| Error::NetworkError(format!("Invalid logo URL {}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::NetworkError(format!(
                "Unsupported logo URL scheme: {}",
                parsed.scheme()
            )));
        }

        let res = self
            .client
            .get(parsed)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::NetworkError(format!("HTTP GET failed: {}", e)))?;

        if res.content_length().is_some_and(|len| len > self.max_bytes) {
            return Err(Error::NetworkError(format!(
                "Logo exceeds {} bytes",
                self.max_bytes
            )));
        }

        // read one byte past the limit to detect oversized bodies without a length header
        let mut body = Vec::new();
        res.take(self.max_bytes + 1)
            .read_to_end(&mut body)
            .map_err(|e| Error::NetworkError(format!("Failed to read logo body: {}", e)))?;
        if body.len() as u64 > self.max_bytes {
            return Err(Error::NetworkError(format!(
                "Logo exceeds {} bytes",
                self.max_bytes
            )));
        }
        Ok(body)
    }
}

/// Decode logo bytes and shrink them into the logo box.
pub fn prepare_logo(bytes: &[u8]) -> Result<RgbaImage> {
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    let (w, h) = decoded.dimensions();
    if w == 0 || h == 0 {
        return Err(Error::DecodeError("logo has no pixels".into()));
    }
    let (tw, th) = layout::thumbnail_size(w, h);
    if (tw, th) == (w, h) {
        return Ok(decoded);
    }
    Ok(imageops::resize(&decoded, tw, th, FilterType::Lanczos3))
}

/// Alpha-composite a prepared logo over the card.
///
/// The canvas goes RGB -> RGBA, gets a transparent full-size layer holding
/// the logo blended over it, and is flattened back to RGB.
pub fn blend_logo(canvas: RgbImage, logo: &RgbaImage) -> RgbImage {
    let (x, y) = layout::logo_origin(logo.width(), logo.height());

    let mut layer = RgbaImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, Rgba([255, 255, 255, 0]));
    imageops::replace(&mut layer, logo, x, y);

    let mut base = DynamicImage::ImageRgb8(canvas).to_rgba8();
    imageops::overlay(&mut base, &layer, 0, 0);
    DynamicImage::ImageRgba8(base).to_rgb8()
}

/// Fetch, decode and blend the logo at `url`, or hand the canvas back untouched.
pub fn composite_logo(canvas: RgbImage, url: Option<&str>, source: &dyn LogoSource) -> RgbImage {
    let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
        return canvas;
    };

    match source.fetch(url).and_then(|bytes| prepare_logo(&bytes)) {
        Ok(logo) => {
            log::debug!("compositing {}x{} logo from {}", logo.width(), logo.height(), url);
            blend_logo(canvas, &logo)
        }
        Err(e) => {
            log::warn!("skipping logo {}: {}", url, e);
            canvas
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::raster::new_canvas;
    use image::{ImageFormat, Rgb};
    use std::io::Cursor;

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn absent_or_blank_url_leaves_canvas_alone() {
        let source = StaticLogoSource::new(png_bytes(&RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]))));
        let out = composite_logo(new_canvas(), None, &source);
        assert_eq!(out, new_canvas());
        let out = composite_logo(new_canvas(), Some("  "), &source);
        assert_eq!(out, new_canvas());
    }

    #[test]
    fn fetch_failure_leaves_canvas_alone() {
        let out = composite_logo(new_canvas(), Some("http://x/logo.png"), &StaticLogoSource::unreachable());
        assert_eq!(out, new_canvas());
    }

    #[test]
    fn garbage_bytes_leave_canvas_alone() {
        let source = StaticLogoSource::new(b"<html>not an image</html>".to_vec());
        let out = composite_logo(new_canvas(), Some("http://x/logo.png"), &source);
        assert_eq!(out, new_canvas());
    }

    #[test]
    fn large_logo_is_thumbnailed() {
        let logo = prepare_logo(&png_bytes(&RgbaImage::from_pixel(800, 200, Rgba([255, 0, 0, 255])))).unwrap();
        assert_eq!(logo.dimensions(), (200, 50));
    }

    #[test]
    fn small_logo_keeps_size() {
        let logo = prepare_logo(&png_bytes(&RgbaImage::from_pixel(40, 30, Rgba([0, 255, 0, 255])))).unwrap();
        assert_eq!(logo.dimensions(), (40, 30));
    }

    #[test]
    fn opaque_logo_replaces_pixels_at_origin() {
        let logo = RgbaImage::from_pixel(40, 30, Rgba([255, 0, 0, 255]));
        let out = blend_logo(new_canvas(), &logo);
        // (300-40)/2 = 130, (591-30)/2 - 100 = 180
        assert_eq!(*out.get_pixel(130, 180), Rgb([255, 0, 0]));
        assert_eq!(*out.get_pixel(169, 209), Rgb([255, 0, 0]));
        assert_eq!(*out.get_pixel(129, 180), Rgb([255, 255, 255]));
        assert_eq!(*out.get_pixel(170, 209), Rgb([255, 255, 255]));
    }

    #[test]
    fn transparent_logo_pixels_show_canvas() {
        let logo = RgbaImage::from_pixel(40, 30, Rgba([255, 0, 0, 0]));
        let mut canvas = new_canvas();
        canvas.put_pixel(130, 180, Rgb([25, 44, 78]));
        let out = blend_logo(canvas.clone(), &logo);
        assert_eq!(out, canvas);
    }
}
