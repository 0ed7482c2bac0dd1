//! Text placement.

use super::{ToolContext, ToolEffect, ToolHandler, ToolKind};
use crate::objects::{DEFAULT_TEXT, Text};
use kurbo::Point;

/// Places a "Type here" text object and starts editing it.
#[derive(Debug, Default)]
pub struct TextTool;

impl TextTool {
    pub fn new() -> Self {
        Self
    }
}

impl ToolHandler for TextTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Text
    }

    fn pointer_down(&mut self, ctx: &ToolContext<'_>, point: Point) -> Vec<ToolEffect> {
        let text = Text::new(point, DEFAULT_TEXT).with_color(ctx.config.stroke_color());
        let id = text.id;
        vec![
            ToolEffect::Snapshot,
            ToolEffect::Add(text.into()),
            ToolEffect::Select(Some(id)),
            ToolEffect::EditText(id),
        ]
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
