//! Render and hit-test surface.
//!
//! The surface owns everything about a scene that is not persisted: the view
//! transform, per-object interactivity and the draw list handed to a renderer.

use crate::camera::Camera;
use crate::document::SceneDocument;
use crate::objects::{ObjectId, ObjectStyle, SceneObject, TextAlign};
use kurbo::{Affine, BezPath, Point, Vec2};
use peniko::Color;
use std::collections::HashMap;

/// Whether an object can be selected and receives pointer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interactivity {
    pub selectable: bool,
    pub evented: bool,
}

impl Interactivity {
    pub const ON: Self = Self {
        selectable: true,
        evented: true,
    };
    pub const OFF: Self = Self {
        selectable: false,
        evented: false,
    };
}

/// Which objects a hit test may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitFilter {
    All,
    Evented,
}

/// Stroke parameters of a draw item.
#[derive(Debug, Clone)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
}

/// Drop shadow of a draw item.
#[derive(Debug, Clone)]
pub struct ShadowStyle {
    pub color: Color,
    pub blur: f64,
    pub offset: Vec2,
}

/// One primitive to draw, in scene coordinates.
#[derive(Debug, Clone)]
pub enum DrawItem {
    Shape {
        id: ObjectId,
        path: BezPath,
        stroke: Option<StrokeStyle>,
        fill: Option<Color>,
        shadow: Option<ShadowStyle>,
    },
    Text {
        id: ObjectId,
        position: Point,
        content: String,
        font_size: f64,
        font_family: String,
        align: TextAlign,
        color: Color,
    },
}

impl DrawItem {
    pub fn id(&self) -> ObjectId {
        match self {
            DrawItem::Shape { id, .. } | DrawItem::Text { id, .. } => *id,
        }
    }
}

/// Everything needed to paint one frame of the scene.
#[derive(Debug, Clone)]
pub struct DrawList {
    pub background: Color,
    /// Scene to device transform.
    pub transform: Affine,
    /// Back to front.
    pub items: Vec<DrawItem>,
}

/// View transform, interactivity flags and scene queries.
#[derive(Debug, Clone)]
pub struct Surface {
    pub camera: Camera,
    overrides: HashMap<ObjectId, Interactivity>,
    default: Interactivity,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(Camera::default())
    }
}

impl Surface {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            overrides: HashMap::new(),
            default: Interactivity::OFF,
        }
    }

    /// Map a device point into scene coordinates.
    pub fn to_scene(&self, device_point: Point) -> Point {
        self.camera.to_scene(device_point)
    }

    /// Set every object, present and future, to the same interactivity.
    pub fn set_all_interactive(&mut self, interactive: bool) {
        self.overrides.clear();
        self.default = if interactive {
            Interactivity::ON
        } else {
            Interactivity::OFF
        };
    }

    /// Override the interactivity of one object.
    pub fn register(&mut self, id: ObjectId, interactivity: Interactivity) {
        self.overrides.insert(id, interactivity);
    }

    /// Drop any override kept for a removed object.
    pub fn forget(&mut self, id: ObjectId) {
        self.overrides.remove(&id);
    }

    pub fn interactivity(&self, id: ObjectId) -> Interactivity {
        self.overrides.get(&id).copied().unwrap_or(self.default)
    }

    /// Topmost top-level object containing `point` (scene coordinates).
    pub fn hit_test(
        &self,
        document: &SceneDocument,
        point: Point,
        tolerance: f64,
        filter: HitFilter,
    ) -> Option<ObjectId> {
        document
            .iter()
            .rev()
            .filter(|object| match filter {
                HitFilter::All => true,
                HitFilter::Evented => self.interactivity(object.id()).evented,
            })
            .find(|object| object.contains(point, tolerance))
            .map(SceneObject::id)
    }

    /// Back-to-front draw list. `preview` is drawn on top of the document.
    pub fn draw_list(&self, document: &SceneDocument, preview: Option<&SceneObject>) -> DrawList {
        let mut items = Vec::with_capacity(document.len() + 1);
        for object in document.iter().chain(preview) {
            push_items(object, 1.0, &mut items);
        }
        DrawList {
            background: document.background_color.into(),
            transform: self.camera.transform(),
            items,
        }
    }
}

fn push_items(object: &SceneObject, parent_opacity: f64, out: &mut Vec<DrawItem>) {
    match object {
        SceneObject::Group(group) => {
            let opacity = parent_opacity * group.style.opacity;
            for child in group.children() {
                push_items(child, opacity, out);
            }
        }
        SceneObject::Text(text) => out.push(DrawItem::Text {
            id: object.id(),
            position: text.position,
            content: text.content.clone(),
            font_size: text.font_size,
            font_family: text.font_family.clone(),
            align: text.align,
            color: text
                .style
                .fill_with_opacity(parent_opacity)
                .unwrap_or_else(|| text.style.stroke_with_opacity(parent_opacity)),
        }),
        _ => {
            let style = object.style();
            out.push(DrawItem::Shape {
                id: object.id(),
                path: object.to_path(),
                stroke: stroke_of(style, parent_opacity),
                fill: style.fill_with_opacity(parent_opacity),
                shadow: style.shadow.as_ref().map(|shadow| ShadowStyle {
                    color: shadow.color.into(),
                    blur: shadow.blur,
                    offset: Vec2::new(shadow.offset_x, shadow.offset_y),
                }),
            });
        }
    }
}

fn stroke_of(style: &ObjectStyle, parent_opacity: f64) -> Option<StrokeStyle> {
    style.has_stroke().then(|| StrokeStyle {
        color: style.stroke_with_opacity(parent_opacity),
        width: style.stroke_width,
    })
}
