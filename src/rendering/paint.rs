//! Paint commands for the fixed-position parts of a card

use crate::rendering::layout::{
    self, Rect, CONTACT_LABELS, CONTACT_SPACING, CONTACT_X, CONTACT_Y, NAME_X, NAME_Y, THEME,
    TITLE_OFFSET_Y,
};
use crate::CardRecord;
use image::Rgb;

/// Which face of the [`FontSet`](crate::FontSet) a text command uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontRole {
    Name,
    Title,
    Contact,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        rect: Rect,
        color: Rgb<u8>,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        role: FontRole,
        color: Rgb<u8>,
    },
}

/// Sidebar block, drawn before anything else
pub fn sidebar_commands() -> Vec<PaintCommand> {
    vec![PaintCommand::SolidRect { rect: layout::sidebar_rect(), color: THEME.primary }]
}

/// Name, title, divider and the three contact lines, in drawing order.
///
/// Missing fields become empty strings so every line keeps its slot.
pub fn text_commands(record: &CardRecord) -> Vec<PaintCommand> {
    let field = |v: &Option<String>| v.clone().unwrap_or_default();

    let mut cmds = vec![
        PaintCommand::Text {
            x: NAME_X,
            y: NAME_Y,
            text: record.name.clone(),
            role: FontRole::Name,
            color: THEME.primary,
        },
        PaintCommand::Text {
            x: NAME_X,
            y: NAME_Y + TITLE_OFFSET_Y,
            text: field(&record.title),
            role: FontRole::Title,
            color: THEME.secondary,
        },
        PaintCommand::SolidRect { rect: layout::divider_rect(), color: THEME.divider },
    ];

    let values = [field(&record.phone), field(&record.email), field(&record.company)];
    for (i, (label, value)) in CONTACT_LABELS.iter().zip(values).enumerate() {
        cmds.push(PaintCommand::Text {
            x: CONTACT_X,
            y: CONTACT_Y + CONTACT_SPACING * i as i32,
            text: format!("{} | {}", label, value),
            role: FontRole::Contact,
            color: THEME.secondary,
        });
    }
    cmds
}
