//! Text object.

use super::{
    InvalidMutation, ObjectId, ObjectStyle, ObjectTrait, SerializableColor, check_point,
    check_size, rect_contains,
};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default text content inserted by the text tool.
pub const DEFAULT_TEXT: &str = "Type here";
pub const DEFAULT_FONT_FAMILY: &str = "Arial";
pub const DEFAULT_FONT_SIZE: f64 = 20.0;

/// Average glyph advance as a fraction of the font size.
const CHAR_WIDTH_FACTOR: f64 = 0.6;
/// Line height as a fraction of the font size.
const LINE_HEIGHT_FACTOR: f64 = 1.16;

/// Horizontal alignment of each line within the layout box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

/// A block of text. The fill color of its style is the glyph color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ObjectId,
    /// Top-left corner of the layout box.
    pub position: Point,
    pub content: String,
    pub font_size: f64,
    pub font_family: String,
    #[serde(default)]
    pub align: TextAlign,
    pub style: ObjectStyle,
}

impl Text {
    pub fn new(position: Point, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            content: content.into(),
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            align: TextAlign::Left,
            style: ObjectStyle::filled(SerializableColor::black()),
        }
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    /// Set the glyph color.
    pub fn with_color(mut self, color: SerializableColor) -> Self {
        self.style.fill_color = Some(color);
        self
    }

    /// Move the layout box so that its center sits on `center`.
    pub fn centered_at(mut self, center: Point) -> Self {
        let (w, h) = self.layout_size();
        self.position = center - Vec2::new(w / 2.0, h / 2.0);
        self
    }

    /// Glyph color, black when unset.
    pub fn color(&self) -> SerializableColor {
        self.style.fill_color.unwrap_or(SerializableColor::black())
    }

    pub fn line_count(&self) -> usize {
        self.content.lines().count().max(1)
    }

    /// Estimated layout size. There is no font shaping in the engine, so the
    /// width assumes an average glyph advance.
    pub fn layout_size(&self) -> (f64, f64) {
        let longest = self
            .content
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        (
            longest as f64 * self.font_size * CHAR_WIDTH_FACTOR,
            self.line_count() as f64 * self.font_size * LINE_HEIGHT_FACTOR,
        )
    }
}

impl ObjectTrait for Text {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let (w, h) = self.layout_size();
        Rect::from_origin_size(self.position, (w, h))
    }

    fn contains(&self, point: Point, tolerance: f64) -> bool {
        rect_contains(self.bounds().inflate(tolerance, tolerance), point)
    }

    fn to_path(&self) -> BezPath {
        // Glyphs are drawn by the host; the path is the layout box.
        self.bounds().to_path(0.1)
    }

    fn style(&self) -> &ObjectStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ObjectStyle {
        &mut self.style
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    fn validate(&self) -> Result<(), InvalidMutation> {
        check_point("text position", self.position)?;
        check_size("font size", self.font_size)?;
        self.style.validate()
    }
}
