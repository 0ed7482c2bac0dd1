//! Pen and highlighter strokes.

use super::{ToolContext, ToolEffect, ToolHandler, ToolKind};
use crate::objects::{Freehand, ObjectStyle, SceneObject};
use kurbo::Point;

/// Captures a freehand stroke between pointer-down and pointer-up.
///
/// The brush (color and width) is read at pointer-down, so changing it
/// mid-stroke affects the next stroke only.
#[derive(Debug)]
pub struct FreehandTool {
    kind: ToolKind,
    stroke: Option<Freehand>,
}

impl FreehandTool {
    pub fn new(kind: ToolKind) -> Self {
        Self { kind, stroke: None }
    }
}

impl ToolHandler for FreehandTool {
    fn kind(&self) -> ToolKind {
        self.kind
    }

    fn pointer_down(&mut self, ctx: &ToolContext<'_>, point: Point) -> Vec<ToolEffect> {
        let brush = ctx.config.brush_settings();
        let style = ObjectStyle::stroke(brush.color, brush.width);
        self.stroke = Some(Freehand::from_points(vec![point]).with_style(style));
        Vec::new()
    }

    fn pointer_move(&mut self, _ctx: &ToolContext<'_>, point: Point) -> Vec<ToolEffect> {
        if let Some(stroke) = self.stroke.as_mut() {
            stroke.points.push(point);
        }
        Vec::new()
    }

    fn pointer_up(&mut self, ctx: &ToolContext<'_>, point: Point) -> Vec<ToolEffect> {
        let Some(mut stroke) = self.stroke.take() else {
            return Vec::new();
        };
        if stroke.points.last() != Some(&point) {
            stroke.points.push(point);
        }
        if stroke.distinct_points() < 2 {
            log::debug!("Discarding {} stroke with a single point", self.kind);
            return Vec::new();
        }
        stroke.simplify(ctx.settings.stroke_simplify_tolerance);
        vec![ToolEffect::Snapshot, ToolEffect::Add(stroke.into())]
    }

    fn is_active(&self) -> bool {
        self.stroke.is_some()
    }

    fn preview(&self) -> Option<SceneObject> {
        self.stroke.clone().map(SceneObject::Path)
    }
}
