//! Sticky notes.

use super::{STICKY_COLORS, ToolContext, ToolEffect, ToolHandler, ToolKind, palette_color};
use crate::objects::{
    Group, ObjectStyle, Rectangle, SceneObject, SerializableColor, Shadow, Text, TextAlign,
};
use kurbo::{Point, Vec2};

pub const STICKY_SIZE: f64 = 150.0;
pub const STICKY_CORNER_RADIUS: f64 = 4.0;
pub const STICKY_LABEL: &str = "Note";
pub const STICKY_FONT_SIZE: f64 = 16.0;
const STICKY_TEXT_COLOR: SerializableColor = SerializableColor::new(0x33, 0x33, 0x33, 255);
const STICKY_SHADOW: Shadow = Shadow {
    color: SerializableColor::new(0, 0, 0, 51),
    blur: 8.0,
    offset_x: 2.0,
    offset_y: 2.0,
};

/// Drops a note centered on the pointer. Fills cycle through [`STICKY_COLORS`]
/// by the number of notes placed since the tool was selected.
#[derive(Debug, Default)]
pub struct StickyTool {
    placed: usize,
}

impl StickyTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill of the next note.
    pub fn next_color(&self) -> SerializableColor {
        palette_color(STICKY_COLORS[self.placed % STICKY_COLORS.len()])
    }
}

/// A note group: rounded square plus centered label.
pub fn sticky_note(center: Point, fill: SerializableColor) -> Group {
    let half = STICKY_SIZE / 2.0;
    let square = Rectangle::new(center - Vec2::new(half, half), STICKY_SIZE, STICKY_SIZE)
        .with_corner_radius(STICKY_CORNER_RADIUS)
        .with_style(ObjectStyle {
            shadow: Some(STICKY_SHADOW),
            ..ObjectStyle::filled(fill)
        });
    let label = Text::new(center, STICKY_LABEL)
        .with_font_size(STICKY_FONT_SIZE)
        .with_align(TextAlign::Center)
        .with_color(STICKY_TEXT_COLOR)
        .centered_at(center);
    Group::new(vec![square.into(), label.into()])
}

impl ToolHandler for StickyTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Sticky
    }

    fn pointer_down(&mut self, _ctx: &ToolContext<'_>, point: Point) -> Vec<ToolEffect> {
        let note = sticky_note(point, self.next_color());
        self.placed += 1;
        vec![ToolEffect::Snapshot, ToolEffect::Add(SceneObject::Group(note))]
    }

    fn pointer_move(&mut self, _ctx: &ToolContext<'_>, _point: Point) -> Vec<ToolEffect> {
        Vec::new()
    }

    fn pointer_up(&mut self, _ctx: &ToolContext<'_>, _point: Point) -> Vec<ToolEffect> {
        Vec::new()
    }

    fn is_active(&self) -> bool {
        false
    }
}
