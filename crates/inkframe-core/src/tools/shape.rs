//! Rectangle, circle, line and triangle drawing.

use super::{SHAPE_STROKE_WIDTH, ShapeKind, ToolContext, ToolEffect, ToolHandler, ToolKind};
use crate::objects::{
    Ellipse, Line, ObjectId, ObjectPatch, ObjectStyle, Rectangle, SceneObject, Triangle,
};
use kurbo::{Point, Rect};

#[derive(Debug, Clone, Copy)]
struct Drag {
    id: ObjectId,
    kind: ShapeKind,
    anchor: Point,
}

/// Inserts a zero-size shape at pointer-down and resizes it live until pointer-up.
#[derive(Debug, Default)]
pub struct ShapeTool {
    drag: Option<Drag>,
}

impl ShapeTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn resize(drag: &Drag, point: Point) -> ToolEffect {
        let patch = match drag.kind {
            ShapeKind::Line => ObjectPatch::Endpoints {
                start: drag.anchor,
                end: point,
            },
            ShapeKind::Rectangle | ShapeKind::Circle | ShapeKind::Triangle => {
                ObjectPatch::Frame(Rect::from_points(drag.anchor, point))
            }
        };
        ToolEffect::Update { id: drag.id, patch }
    }
}

/// Zero-size shape of `kind` anchored at `anchor`.
fn seed_shape(kind: ShapeKind, anchor: Point, style: ObjectStyle) -> SceneObject {
    match kind {
        ShapeKind::Rectangle => Rectangle::new(anchor, 0.0, 0.0).with_style(style).into(),
        ShapeKind::Circle => Ellipse::new(anchor, 0.0, 0.0).with_style(style).into(),
        ShapeKind::Line => Line::new(anchor, anchor).with_style(style).into(),
        ShapeKind::Triangle => Triangle::new(anchor, 0.0, 0.0).with_style(style).into(),
    }
}

impl ToolHandler for ShapeTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Shape
    }

    fn pointer_down(&mut self, ctx: &ToolContext<'_>, point: Point) -> Vec<ToolEffect> {
        let kind = ctx.config.shape_kind();
        let style = ObjectStyle::stroke(ctx.config.stroke_color(), SHAPE_STROKE_WIDTH);
        let object = seed_shape(kind, point, style);
        self.drag = Some(Drag {
            id: object.id(),
            kind,
            anchor: point,
        });

        let mut effects = Vec::with_capacity(2);
        if ctx.settings.snapshot_shape_creation {
            effects.push(ToolEffect::Snapshot);
        }
        effects.push(ToolEffect::Add(object));
        effects
    }

    fn pointer_move(&mut self, _ctx: &ToolContext<'_>, point: Point) -> Vec<ToolEffect> {
        match &self.drag {
            Some(drag) => vec![Self::resize(drag, point)],
            None => Vec::new(),
        }
    }

    fn pointer_up(&mut self, _ctx: &ToolContext<'_>, point: Point) -> Vec<ToolEffect> {
        match self.drag.take() {
            Some(drag) => vec![Self::resize(&drag, point)],
            None => Vec::new(),
        }
    }

    fn is_active(&self) -> bool {
        self.drag.is_some()
    }
}
