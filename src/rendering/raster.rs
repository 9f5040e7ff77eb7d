//! Rasterizer: executes paint commands on an RGB canvas and encodes PNG

use crate::rendering::fonts::FontSet;
use crate::rendering::layout::{BACKGROUND, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::rendering::paint::{FontRole, PaintCommand};
use crate::{Error, Result};
use image::{ImageFormat, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use std::io::Cursor;

/// Fresh white card canvas
pub fn new_canvas() -> RgbImage {
    RgbImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, BACKGROUND)
}

pub fn execute(canvas: &mut RgbImage, commands: &[PaintCommand], fonts: &FontSet) {
    for cmd in commands {
        match cmd {
            PaintCommand::SolidRect { rect, color } => {
                if rect.width == 0 || rect.height == 0 {
                    continue;
                }
                let r = imageproc::rect::Rect::at(rect.x, rect.y).of_size(rect.width, rect.height);
                draw_filled_rect_mut(canvas, r, *color);
            }
            PaintCommand::Text { x, y, text, role, color } => {
                if text.is_empty() {
                    continue;
                }
                let face = match role {
                    FontRole::Name => &fonts.name,
                    FontRole::Title => &fonts.title,
                    FontRole::Contact => &fonts.contact,
                };
                draw_text_mut(canvas, *color, *x, *y, face.scale, &face.font, text);
            }
        }
    }
}

/// Encode the canvas as PNG into a fresh buffer
pub fn encode_png(canvas: &RgbImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    canvas
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| Error::RenderError(format!("PNG encode failed: {}", e)))?;
    Ok(out.into_inner())
}
