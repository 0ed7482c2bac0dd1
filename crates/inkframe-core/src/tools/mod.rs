//! Tool system: the active tool and its pointer handler.
//!
//! A handler never touches the document. It reads a [`ToolContext`] and
//! returns a batch of [`ToolEffect`]s that the session applies atomically.

mod eraser;
mod freehand;
mod select;
mod shape;
mod sticky;
mod text;

pub use eraser::EraserTool;
pub use freehand::FreehandTool;
pub use select::SelectTool;
pub use shape::ShapeTool;
pub use sticky::StickyTool;
pub use text::TextTool;

use crate::config::EditorConfig;
use crate::document::SceneDocument;
use crate::objects::{ColorParseError, ObjectId, ObjectPatch, SceneObject, SerializableColor};
use crate::surface::Surface;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Drawing palette offered by the toolbar.
pub const COLORS: [&str; 6] = [
    "#000000", "#FF0000", "#0000FF", "#00AA00", "#FF8800", "#8800FF",
];

/// Sticky note fills, cycled per placed note.
pub const STICKY_COLORS: [&str; 6] = [
    "#FFF176", "#A5D6A7", "#90CAF9", "#F48FB1", "#CE93D8", "#FFCC80",
];

/// Alpha applied to the pen color by the highlighter.
pub const HIGHLIGHTER_ALPHA: u8 = 0x60;
/// Highlighter width relative to the brush width.
pub const HIGHLIGHTER_WIDTH_FACTOR: f64 = 3.0;

pub const MIN_BRUSH_WIDTH: u32 = 1;
pub const MAX_BRUSH_WIDTH: u32 = 20;
pub const DEFAULT_BRUSH_WIDTH: u32 = 3;

/// Stroke width of shapes drawn with the shape tool.
pub const SHAPE_STROKE_WIDTH: f64 = 2.0;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Select,
    #[default]
    Pen,
    Highlighter,
    Eraser,
    Shape,
    Text,
    Sticky,
}

impl ToolKind {
    pub fn all() -> &'static [ToolKind] {
        &[
            ToolKind::Select,
            ToolKind::Pen,
            ToolKind::Highlighter,
            ToolKind::Eraser,
            ToolKind::Shape,
            ToolKind::Text,
            ToolKind::Sticky,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Pen => "pen",
            ToolKind::Highlighter => "highlighter",
            ToolKind::Eraser => "eraser",
            ToolKind::Shape => "shape",
            ToolKind::Text => "text",
            ToolKind::Sticky => "sticky",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shape drawn by the shape tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Circle,
    Line,
    Triangle,
}

/// Rejected toolbar input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolConfigError {
    #[error("brush width {0} outside 1..=20")]
    BrushWidth(u32),
    #[error("stroke color must be #RRGGBB, got {0:?}")]
    Color(String),
}

impl From<ColorParseError> for ToolConfigError {
    fn from(e: ColorParseError) -> Self {
        ToolConfigError::Color(e.0)
    }
}

/// Color and width a new stroke is drawn with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushSettings {
    pub color: SerializableColor,
    pub width: f64,
}

/// Toolbar state. Changed only through explicit selection calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    active_tool: ToolKind,
    stroke_color: SerializableColor,
    brush_width: u32,
    shape_kind: ShapeKind,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            active_tool: ToolKind::Pen,
            stroke_color: SerializableColor::black(),
            brush_width: DEFAULT_BRUSH_WIDTH,
            shape_kind: ShapeKind::Rectangle,
        }
    }
}

impl ToolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_tool(&self) -> ToolKind {
        self.active_tool
    }

    pub fn stroke_color(&self) -> SerializableColor {
        self.stroke_color
    }

    pub fn brush_width(&self) -> u32 {
        self.brush_width
    }

    pub fn shape_kind(&self) -> ShapeKind {
        self.shape_kind
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.active_tool = tool;
    }

    /// Accepts `#RRGGBB` only; the highlighter derives its own alpha.
    pub fn set_stroke_color(&mut self, hex: &str) -> Result<(), ToolConfigError> {
        if hex.len() != 7 {
            return Err(ToolConfigError::Color(hex.to_string()));
        }
        self.stroke_color = SerializableColor::from_hex(hex)?;
        Ok(())
    }

    pub fn set_brush_width(&mut self, width: u32) -> Result<(), ToolConfigError> {
        if !(MIN_BRUSH_WIDTH..=MAX_BRUSH_WIDTH).contains(&width) {
            return Err(ToolConfigError::BrushWidth(width));
        }
        self.brush_width = width;
        Ok(())
    }

    pub fn set_shape_kind(&mut self, kind: ShapeKind) {
        self.shape_kind = kind;
    }

    /// Brush of the active tool. The highlighter is translucent and wider.
    pub fn brush_settings(&self) -> BrushSettings {
        let width = f64::from(self.brush_width);
        if self.active_tool == ToolKind::Highlighter {
            BrushSettings {
                color: self.stroke_color.with_alpha(HIGHLIGHTER_ALPHA),
                width: width * HIGHLIGHTER_WIDTH_FACTOR,
            }
        } else {
            BrushSettings {
                color: self.stroke_color,
                width,
            }
        }
    }
}

/// A scene change requested by a handler.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolEffect {
    /// Record the pre-batch state in history.
    Snapshot,
    Add(SceneObject),
    Update { id: ObjectId, patch: ObjectPatch },
    Remove(ObjectId),
    Select(Option<ObjectId>),
    /// Enter text-edit mode on a text object.
    EditText(ObjectId),
}

/// Read-only view handed to handlers.
#[derive(Clone, Copy)]
pub struct ToolContext<'a> {
    pub document: &'a SceneDocument,
    pub config: &'a ToolConfig,
    pub surface: &'a Surface,
    pub settings: &'a EditorConfig,
}

/// Per-tool interaction state machine. Points are in scene coordinates.
pub trait ToolHandler: fmt::Debug {
    fn kind(&self) -> ToolKind;

    fn pointer_down(&mut self, ctx: &ToolContext<'_>, point: Point) -> Vec<ToolEffect>;

    fn pointer_move(&mut self, ctx: &ToolContext<'_>, point: Point) -> Vec<ToolEffect>;

    fn pointer_up(&mut self, ctx: &ToolContext<'_>, point: Point) -> Vec<ToolEffect>;

    /// Whether a gesture is in progress.
    fn is_active(&self) -> bool;

    /// Object drawn on top of the scene while a gesture is in progress.
    fn preview(&self) -> Option<SceneObject> {
        None
    }
}

/// Fresh handler for a tool.
pub fn handler_for(kind: ToolKind) -> Box<dyn ToolHandler> {
    match kind {
        ToolKind::Select => Box::new(SelectTool::new()),
        ToolKind::Pen | ToolKind::Highlighter => Box::new(FreehandTool::new(kind)),
        ToolKind::Eraser => Box::new(EraserTool::new()),
        ToolKind::Shape => Box::new(ShapeTool::new()),
        ToolKind::Text => Box::new(TextTool::new()),
        ToolKind::Sticky => Box::new(StickyTool::new()),
    }
}

/// Parse one of the built-in palette entries.
pub(crate) fn palette_color(hex: &str) -> SerializableColor {
    SerializableColor::from_hex(hex).unwrap_or(SerializableColor::black())
}

/// Owned context pieces for handler tests.
#[cfg(test)]
pub(crate) struct Bench {
    pub document: SceneDocument,
    pub config: ToolConfig,
    pub surface: Surface,
    pub settings: EditorConfig,
}

#[cfg(test)]
impl Bench {
    pub fn new() -> Self {
        Self {
            document: SceneDocument::new(),
            config: ToolConfig::default(),
            surface: Surface::default(),
            settings: EditorConfig::default(),
        }
    }

    pub fn ctx(&self) -> ToolContext<'_> {
        ToolContext {
            document: &self.document,
            config: &self.config,
            surface: &self.surface,
            settings: &self.settings,
        }
    }

    /// Apply effects the way a session would, without history.
    pub fn apply(&mut self, effects: Vec<ToolEffect>) {
        for effect in effects {
            match effect {
                ToolEffect::Add(object) => {
                    self.document.add_object(object).unwrap();
                }
                ToolEffect::Update { id, patch } => self.document.update_object(id, patch).unwrap(),
                ToolEffect::Remove(id) => {
                    self.document.remove_object(id).unwrap();
                }
                ToolEffect::Select(_) | ToolEffect::Snapshot | ToolEffect::EditText(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ToolConfig::default();
        assert_eq!(config.active_tool(), ToolKind::Pen);
        assert_eq!(config.stroke_color().to_hex(), "#000000");
        assert_eq!(config.brush_width(), 3);
        assert_eq!(config.shape_kind(), ShapeKind::Rectangle);
    }

    #[test]
    fn test_highlighter_brush() {
        let mut config = ToolConfig::default();
        config.set_stroke_color("#112233").unwrap();
        config.set_brush_width(4).unwrap();
        config.set_tool(ToolKind::Highlighter);
        let brush = config.brush_settings();
        assert_eq!(brush.color.to_hex(), "#11223360");
        assert!((brush.width - 12.0).abs() < f64::EPSILON);

        config.set_tool(ToolKind::Pen);
        let brush = config.brush_settings();
        assert_eq!(brush.color.to_hex(), "#112233");
        assert!((brush.width - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_brush_width_range() {
        let mut config = ToolConfig::default();
        assert_eq!(config.set_brush_width(0), Err(ToolConfigError::BrushWidth(0)));
        assert_eq!(config.set_brush_width(21), Err(ToolConfigError::BrushWidth(21)));
        assert!(config.set_brush_width(20).is_ok());
        assert_eq!(config.brush_width(), 20);
    }

    #[test]
    fn test_stroke_color_validation() {
        let mut config = ToolConfig::default();
        assert!(config.set_stroke_color("#11223344").is_err());
        assert!(config.set_stroke_color("red").is_err());
        assert!(config.set_stroke_color("#ff8800").is_ok());
        assert_eq!(config.stroke_color().to_hex(), "#FF8800");
    }

    #[test]
    fn test_palettes_parse() {
        for hex in COLORS.iter().chain(STICKY_COLORS.iter()) {
            assert!(SerializableColor::from_hex(hex).is_ok(), "{hex}");
        }
    }

    #[test]
    fn test_handler_for_kinds() {
        for &kind in ToolKind::all() {
            let handler = handler_for(kind);
            assert_eq!(handler.kind(), kind);
            assert!(!handler.is_active());
        }
    }
}
