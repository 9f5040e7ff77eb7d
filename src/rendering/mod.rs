//! Card rendering pipeline

pub mod fonts;
pub mod layout;
pub mod logo;
pub mod paint;
pub mod raster;

use crate::{CardRecord, RendererConfig, Result};
use fonts::FontSet;
use image::RgbImage;
use logo::LogoSource;

/// Renders cards. Cheap to share: fonts are read-only and each render owns
/// its canvas, so one renderer can serve many threads at once.
pub struct CardRenderer {
    fonts: FontSet,
    logos: Option<Box<dyn LogoSource>>,
}

impl CardRenderer {
    /// Load fonts and build the logo fetcher described by `config`.
    ///
    /// Fails if the fonts cannot be loaded; a renderer without fonts is never handed out.
    pub fn new(config: RendererConfig) -> Result<Self> {
        config.validate()?;
        let fonts = FontSet::load(&config.bold_font, &config.regular_font)?;
        let logos = if config.enable_logos { default_logo_source(&config)? } else { None };
        Ok(Self { fonts, logos })
    }

    /// Renderer over already-loaded fonts that never fetches logos
    pub fn from_fonts(fonts: FontSet) -> Self {
        Self { fonts, logos: None }
    }

    pub fn with_logo_source(mut self, source: impl LogoSource + 'static) -> Self {
        self.logos = Some(Box::new(source));
        self
    }

    /// Wrap the current logo source. Does nothing when logo fetching is disabled.
    pub fn layer_logo_source<F, S>(mut self, wrap: F) -> Self
    where
        F: FnOnce(Box<dyn LogoSource>) -> S,
        S: LogoSource + 'static,
    {
        if let Some(inner) = self.logos.take() {
            self.logos = Some(Box::new(wrap(inner)));
        }
        self
    }

    /// Draw the card without encoding it.
    pub fn compose(&self, record: &CardRecord) -> RgbImage {
        let mut canvas = raster::new_canvas();
        raster::execute(&mut canvas, &paint::sidebar_commands(), &self.fonts);

        let mut canvas = match (&self.logos, record.logo()) {
            (Some(source), url @ Some(_)) => logo::composite_logo(canvas, url, &**source),
            (None, Some(url)) => {
                log::warn!("logo fetching is disabled; ignoring {}", url);
                canvas
            }
            _ => canvas,
        };

        raster::execute(&mut canvas, &paint::text_commands(record), &self.fonts);
        canvas
    }

    /// Render `record` to PNG bytes.
    pub fn render(&self, record: &CardRecord) -> Result<Vec<u8>> {
        log::debug!("rendering card for {:?}", record.name);
        raster::encode_png(&self.compose(record))
    }
}

#[cfg(feature = "http")]
fn default_logo_source(config: &RendererConfig) -> Result<Option<Box<dyn LogoSource>>> {
    Ok(Some(Box::new(logo::HttpLogoSource::new(config)?)))
}

#[cfg(not(feature = "http"))]
fn default_logo_source(_config: &RendererConfig) -> Result<Option<Box<dyn LogoSource>>> {
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::layout::THEME;
    use crate::rendering::logo::StaticLogoSource;
    use image::Rgb;

    fn renderer() -> CardRenderer {
        let dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts");
        let fonts = FontSet::load(&dir.join("DejaVuSans-Bold.ttf"), &dir.join("DejaVuSans.ttf")).unwrap();
        CardRenderer::from_fonts(fonts)
    }

    #[test]
    fn sidebar_is_solid_without_logo() {
        let card = renderer().compose(&CardRecord { name: "Lee".into(), ..Default::default() });
        for y in 0..591 {
            for x in 0..=300 {
                assert_eq!(*card.get_pixel(x, y), THEME.primary, "pixel ({}, {})", x, y);
            }
        }
        assert_eq!(*card.get_pixel(301, 0), Rgb([255, 255, 255]));
    }

    #[test]
    fn name_is_drawn_near_its_anchor() {
        let card = renderer().compose(&CardRecord { name: "Lee".into(), ..Default::default() });
        let inked = (200..280)
            .flat_map(|y| (350..520).map(move |x| (x, y)))
            .any(|(x, y)| *card.get_pixel(x, y) != Rgb([255, 255, 255]));
        assert!(inked);
    }

    #[test]
    fn missing_logo_source_ignores_logo_url() {
        let r = renderer();
        let with_url = CardRecord {
            name: "Lee".into(),
            logo_url: Some("http://127.0.0.1:9/logo.png".into()),
            ..Default::default()
        };
        let without = CardRecord { logo_url: None, ..with_url.clone() };
        assert_eq!(r.compose(&with_url), r.compose(&without));
    }

    #[test]
    fn layered_source_only_applies_when_logos_are_enabled() {
        let logo = {
            let mut out = std::io::Cursor::new(Vec::new());
            image::RgbaImage::from_pixel(20, 20, image::Rgba([255, 0, 0, 255]))
                .write_to(&mut out, image::ImageFormat::Png)
                .unwrap();
            out.into_inner()
        };
        let record = CardRecord {
            name: "Lee".into(),
            logo_url: Some("http://logo.test/a.png".into()),
            ..Default::default()
        };

        let disabled = renderer().layer_logo_source(|_| StaticLogoSource::new(logo.clone()));
        assert_eq!(*disabled.compose(&record).get_pixel(150, 195), THEME.primary);

        let enabled = renderer()
            .with_logo_source(StaticLogoSource::unreachable())
            .layer_logo_source(|_| StaticLogoSource::new(logo.clone()));
        // 20x20 logo at ((300-20)/2, (591-20)/2 - 100) = (140, 185)
        assert_eq!(*enabled.compose(&record).get_pixel(150, 195), Rgb([255, 0, 0]));
    }

    #[test]
    fn failing_source_renders_like_no_logo() {
        let r = renderer().with_logo_source(StaticLogoSource::unreachable());
        let with_url = CardRecord {
            name: "Lee".into(),
            logo_url: Some("http://logo.invalid/a.png".into()),
            ..Default::default()
        };
        let without = CardRecord { logo_url: None, ..with_url.clone() };
        assert_eq!(r.render(&with_url).unwrap(), r.render(&without).unwrap());
    }
}
