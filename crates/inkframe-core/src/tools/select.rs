//! Selection and drag-to-move.

use super::{ToolContext, ToolEffect, ToolHandler, ToolKind};
use crate::objects::{ObjectId, ObjectPatch};
use crate::surface::HitFilter;
use kurbo::Point;

#[derive(Debug, Clone, Copy)]
struct Drag {
    id: ObjectId,
    last: Point,
    moved: bool,
}

/// Selects the topmost evented object and drags it.
#[derive(Debug, Default)]
pub struct SelectTool {
    drag: Option<Drag>,
}

impl SelectTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ToolHandler for SelectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Select
    }

    fn pointer_down(&mut self, ctx: &ToolContext<'_>, point: Point) -> Vec<ToolEffect> {
        let hit = ctx.surface.hit_test(
            ctx.document,
            point,
            ctx.settings.hit_tolerance,
            HitFilter::Evented,
        );
        self.drag = hit.map(|id| Drag {
            id,
            last: point,
            moved: false,
        });
        vec![ToolEffect::Select(hit)]
    }

    fn pointer_move(&mut self, _ctx: &ToolContext<'_>, point: Point) -> Vec<ToolEffect> {
        let Some(drag) = self.drag.as_mut() else {
            return Vec::new();
        };
        let delta = point - drag.last;
        if delta.x == 0.0 && delta.y == 0.0 {
            return Vec::new();
        }
        let mut effects = Vec::with_capacity(2);
        if !drag.moved {
            // one history entry per drag
            effects.push(ToolEffect::Snapshot);
            drag.moved = true;
        }
        drag.last = point;
        effects.push(ToolEffect::Update {
            id: drag.id,
            patch: ObjectPatch::Translate(delta),
        });
        effects
    }

    fn pointer_up(&mut self, _ctx: &ToolContext<'_>, _point: Point) -> Vec<ToolEffect> {
        self.drag = None;
        Vec::new()
    }

    fn is_active(&self) -> bool {
        self.drag.is_some()
    }
}
