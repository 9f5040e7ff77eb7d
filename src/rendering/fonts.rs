//! Font resources shared by every render.
//!
//! A [`FontSet`] is loaded once when the renderer is built and is read-only
//! afterwards, so it can be shared across threads without locking.

use crate::rendering::layout::{CONTACT_FONT_SIZE, NAME_FONT_SIZE, TITLE_FONT_SIZE};
use crate::{Error, Result};
use ab_glyph::{Font, FontArc, PxScale};
use std::path::Path;

/// A font face paired with the scale it is drawn at
#[derive(Clone, Debug)]
pub struct SizedFont {
    pub font: FontArc,
    pub scale: PxScale,
}

impl SizedFont {
    /// Size the face so that one em spans `px_per_em` pixels.
    pub fn new(font: FontArc, px_per_em: f32) -> Self {
        // PxScale is the ascent-to-descent height, not the em size
        let units_per_em = font.units_per_em().unwrap_or(1000.0);
        let height = px_per_em * font.height_unscaled() / units_per_em;
        Self { font, scale: PxScale::from(height) }
    }
}

/// The three faces used on a card
#[derive(Clone, Debug)]
pub struct FontSet {
    pub name: SizedFont,
    pub title: SizedFont,
    pub contact: SizedFont,
}

impl FontSet {
    /// Load the bold and regular faces from disk.
    ///
    /// A missing or corrupt file is fatal: no card can be drawn without fonts.
    pub fn load(bold: &Path, regular: &Path) -> Result<Self> {
        let bold = load_font(bold)?;
        let regular = load_font(regular)?;
        Ok(Self::from_fonts(bold, regular))
    }

    pub fn from_fonts(bold: FontArc, regular: FontArc) -> Self {
        Self {
            name: SizedFont::new(bold, NAME_FONT_SIZE),
            title: SizedFont::new(regular.clone(), TITLE_FONT_SIZE),
            contact: SizedFont::new(regular, CONTACT_FONT_SIZE),
        }
    }
}

fn load_font(path: &Path) -> Result<FontArc> {
    let data = std::fs::read(path).map_err(|e| Error::FontError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let font = FontArc::try_from_vec(data).map_err(|e| Error::FontError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    log::debug!("loaded font {:?}", path);
    Ok(font)
}
