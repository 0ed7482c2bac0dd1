//! Object eraser.

use super::{ToolContext, ToolEffect, ToolHandler, ToolKind};
use crate::surface::HitFilter;
use kurbo::Point;

/// Removes the topmost object under the pointer while the button is held.
///
/// Removals are not recorded in history.
#[derive(Debug, Default)]
pub struct EraserTool {
    armed: bool,
}

impl EraserTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ToolHandler for EraserTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Eraser
    }

    fn pointer_down(&mut self, _ctx: &ToolContext<'_>, _point: Point) -> Vec<ToolEffect> {
        self.armed = true;
        Vec::new()
    }

    fn pointer_move(&mut self, ctx: &ToolContext<'_>, point: Point) -> Vec<ToolEffect> {
        if !self.armed {
            return Vec::new();
        }
        ctx.surface
            .hit_test(ctx.document, point, ctx.settings.hit_tolerance, HitFilter::All)
            .map(ToolEffect::Remove)
            .into_iter()
            .collect()
    }

    fn pointer_up(&mut self, _ctx: &ToolContext<'_>, _point: Point) -> Vec<ToolEffect> {
        self.armed = false;
        Vec::new()
    }

    fn is_active(&self) -> bool {
        self.armed
    }
}
