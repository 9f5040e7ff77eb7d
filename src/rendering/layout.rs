//! Fixed card geometry and palette.
//!
//! Every position used by the renderer is one of these constants; nothing is
//! re-derived from text metrics at render time.

use image::Rgb;

pub const CANVAS_WIDTH: u32 = 1063;
pub const CANVAS_HEIGHT: u32 = 591;
pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Card palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub primary: Rgb<u8>,
    pub secondary: Rgb<u8>,
    pub divider: Rgb<u8>,
}

pub const THEME: Theme = Theme {
    primary: Rgb([25, 44, 78]),
    secondary: Rgb([100, 100, 100]),
    divider: Rgb([230, 230, 230]),
};

pub const SIDEBAR_WIDTH: u32 = 300;

pub const NAME_X: i32 = 350;
pub const NAME_Y: i32 = 200;
pub const TITLE_OFFSET_Y: i32 = 80;

pub const DIVIDER_OFFSET_Y: i32 = 140;
pub const DIVIDER_MARGIN_RIGHT: i32 = 50;
pub const DIVIDER_STROKE: u32 = 2;

pub const CONTACT_X: i32 = 350;
pub const CONTACT_Y: i32 = 360;
pub const CONTACT_SPACING: i32 = 50;

/// Contact line labels in drawing order
pub const CONTACT_LABELS: [&str; 3] = ["P", "E", "C"];

/// Font sizes in pixels per em
pub const NAME_FONT_SIZE: f32 = 60.0;
pub const TITLE_FONT_SIZE: f32 = 38.0;
pub const CONTACT_FONT_SIZE: f32 = 30.0;

/// Bounding box a logo is shrunk into
pub const LOGO_MAX_WIDTH: u32 = 200;
pub const LOGO_MAX_HEIGHT: u32 = 100;
/// Logo sits this far above the sidebar's vertical center
pub const LOGO_LIFT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Sidebar block. Both edges are inclusive, so it covers columns `0..=300`.
pub fn sidebar_rect() -> Rect {
    Rect { x: 0, y: 0, width: SIDEBAR_WIDTH + 1, height: CANVAS_HEIGHT }
}

/// Divider under the title: from the name column to `width - 50`, two pixels tall.
pub fn divider_rect() -> Rect {
    let x0 = NAME_X;
    let x1 = CANVAS_WIDTH as i32 - DIVIDER_MARGIN_RIGHT;
    Rect {
        x: x0,
        y: NAME_Y + DIVIDER_OFFSET_Y,
        width: (x1 - x0 + 1) as u32,
        height: DIVIDER_STROKE,
    }
}

/// Size of a logo after thumbnailing into the logo box.
///
/// Shrinks only; an image already inside the box keeps its size. The aspect
/// ratio is kept within one pixel of rounding and neither side drops below 1.
pub fn thumbnail_size(width: u32, height: u32) -> (u32, u32) {
    if width <= LOGO_MAX_WIDTH && height <= LOGO_MAX_HEIGHT {
        return (width, height);
    }
    if width == 0 || height == 0 {
        return (width.min(LOGO_MAX_WIDTH), height.min(LOGO_MAX_HEIGHT));
    }

    let scale = f64::min(
        LOGO_MAX_WIDTH as f64 / width as f64,
        LOGO_MAX_HEIGHT as f64 / height as f64,
    );
    let w = ((width as f64 * scale).round() as u32).clamp(1, LOGO_MAX_WIDTH);
    let h = ((height as f64 * scale).round() as u32).clamp(1, LOGO_MAX_HEIGHT);
    (w, h)
}

/// Top-left corner of a scaled logo: centered in the sidebar, lifted above its middle.
pub fn logo_origin(scaled_width: u32, scaled_height: u32) -> (i64, i64) {
    let x = (SIDEBAR_WIDTH as i64 - scaled_width as i64).div_euclid(2);
    let y = (CANVAS_HEIGHT as i64 - scaled_height as i64).div_euclid(2) - LOGO_LIFT;
    (x, y)
}
