//! Scene objects: the vector primitives a frame is drawn with.

mod ellipse;
mod group;
mod line;
mod path;
mod rectangle;
mod text;
mod triangle;

pub use ellipse::Ellipse;
pub use group::Group;
pub use line::Line;
pub use path::Freehand;
pub use rectangle::Rectangle;
pub use text::{DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_TEXT, Text, TextAlign};
pub use triangle::Triangle;

use kurbo::{BezPath, Point, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for scene objects.
pub type ObjectId = Uuid;

/// A color string that is not `#RRGGBB` or `#RRGGBBAA`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex color: {0:?}")]
pub struct ColorParseError(pub String);

/// Serializable color representation (RGBA8), persisted as a hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (case-insensitive).
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let invalid = || ColorParseError(hex.to_string());
        let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
        if !matches!(digits.len(), 6 | 8) || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        let a = if digits.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// Format as `#RRGGBB` when opaque, `#RRGGBBAA` otherwise.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Same color with the alpha channel replaced.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }
}

impl fmt::Display for SerializableColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for SerializableColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<SerializableColor> for String {
    fn from(color: SerializableColor) -> Self {
        color.to_hex()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Drop shadow drawn beneath an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: SerializableColor,
    pub blur: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Style properties shared by every object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectStyle {
    /// Stroke color.
    pub stroke_color: SerializableColor,
    /// Stroke width in scene units (0 = no stroke).
    pub stroke_width: f64,
    /// Fill color (None = transparent).
    #[serde(default)]
    pub fill_color: Option<SerializableColor>,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
}

fn default_opacity() -> f64 {
    1.0
}

impl Default for ObjectStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            stroke_width: 2.0,
            fill_color: None,
            opacity: 1.0,
            shadow: None,
        }
    }
}

impl ObjectStyle {
    /// Stroke-only style.
    pub fn stroke(color: SerializableColor, width: f64) -> Self {
        Self {
            stroke_color: color,
            stroke_width: width,
            ..Self::default()
        }
    }

    /// Fill-only style.
    pub fn filled(color: SerializableColor) -> Self {
        Self {
            stroke_width: 0.0,
            fill_color: Some(color),
            ..Self::default()
        }
    }

    /// Whether a visible stroke is drawn.
    pub fn has_stroke(&self) -> bool {
        self.stroke_width > 0.0 && self.stroke_color.a > 0
    }

    /// Get the stroke color with opacity applied.
    pub fn stroke_with_opacity(&self, parent_opacity: f64) -> Color {
        with_opacity(self.stroke_color, self.opacity * parent_opacity)
    }

    /// Get the fill color with opacity applied.
    pub fn fill_with_opacity(&self, parent_opacity: f64) -> Option<Color> {
        self.fill_color
            .map(|c| with_opacity(c, self.opacity * parent_opacity))
    }

    pub fn validate(&self) -> Result<(), InvalidMutation> {
        check_size("stroke width", self.stroke_width)?;
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(InvalidMutation::Opacity(self.opacity));
        }
        if let Some(shadow) = &self.shadow {
            check_size("shadow blur", shadow.blur)?;
            check_finite("shadow offset", shadow.offset_x)?;
            check_finite("shadow offset", shadow.offset_y)?;
        }
        Ok(())
    }
}

fn with_opacity(color: SerializableColor, opacity: f64) -> Color {
    let alpha = (f64::from(color.a) * opacity).round().clamp(0.0, 255.0) as u8;
    Color::from_rgba8(color.r, color.g, color.b, alpha)
}

/// Reasons a mutation is refused before it reaches the document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidMutation {
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
    #[error("negative {0}")]
    Negative(&'static str),
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("opacity {0} outside 0..=1")]
    Opacity(f64),
    #[error("duplicate object id {0}")]
    DuplicateId(ObjectId),
    #[error("{patch} does not apply to {kind}")]
    UnsupportedPatch {
        patch: &'static str,
        kind: &'static str,
    },
}

pub(crate) fn check_finite(label: &'static str, value: f64) -> Result<(), InvalidMutation> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(InvalidMutation::NonFinite(label))
    }
}

pub(crate) fn check_point(label: &'static str, point: Point) -> Result<(), InvalidMutation> {
    check_finite(label, point.x)?;
    check_finite(label, point.y)
}

pub(crate) fn check_size(label: &'static str, value: f64) -> Result<(), InvalidMutation> {
    check_finite(label, value)?;
    if value < 0.0 {
        return Err(InvalidMutation::Negative(label));
    }
    Ok(())
}

/// Closed containment test (kurbo's `Rect::contains` excludes the far edges).
pub(crate) fn rect_contains(rect: kurbo::Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    (point - (a + seg * t)).hypot()
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => (point - *only).hypot(),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Common behaviour of all scene objects.
pub trait ObjectTrait {
    /// Get the unique identifier.
    fn id(&self) -> ObjectId;

    /// Get the bounding box in scene coordinates.
    fn bounds(&self) -> kurbo::Rect;

    /// Check whether a scene point lies within the object's geometry.
    fn contains(&self, point: Point, tolerance: f64) -> bool;

    /// Get the path representation for rendering.
    fn to_path(&self) -> BezPath;

    fn style(&self) -> &ObjectStyle;

    fn style_mut(&mut self) -> &mut ObjectStyle;

    /// Move the object by a scene-space delta.
    fn translate(&mut self, delta: Vec2);

    /// Reject geometry that cannot be serialized or drawn.
    fn validate(&self) -> Result<(), InvalidMutation>;
}

/// A partial update applied by [`crate::SceneDocument::update_object`].
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectPatch {
    /// Move by a delta (all variants).
    Translate(Vec2),
    /// Set the bounding frame (rect, triangle, ellipse); moves text to the frame origin.
    Frame(kurbo::Rect),
    /// Set both endpoints (line).
    Endpoints { start: Point, end: Point },
    StrokeColor(SerializableColor),
    StrokeWidth(f64),
    Fill(Option<SerializableColor>),
    Opacity(f64),
    /// Replace text content (text).
    Content(String),
}

impl ObjectPatch {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectPatch::Translate(_) => "translate",
            ObjectPatch::Frame(_) => "frame",
            ObjectPatch::Endpoints { .. } => "endpoints",
            ObjectPatch::StrokeColor(_) => "stroke color",
            ObjectPatch::StrokeWidth(_) => "stroke width",
            ObjectPatch::Fill(_) => "fill",
            ObjectPatch::Opacity(_) => "opacity",
            ObjectPatch::Content(_) => "content",
        }
    }
}

/// Tagged union of every object kind (the serialized form).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SceneObject {
    Path(Freehand),
    Rect(Rectangle),
    Ellipse(Ellipse),
    Line(Line),
    Triangle(Triangle),
    Text(Text),
    Group(Group),
}

impl SceneObject {
    pub fn id(&self) -> ObjectId {
        match self {
            SceneObject::Path(o) => o.id(),
            SceneObject::Rect(o) => o.id(),
            SceneObject::Ellipse(o) => o.id(),
            SceneObject::Line(o) => o.id(),
            SceneObject::Triangle(o) => o.id(),
            SceneObject::Text(o) => o.id(),
            SceneObject::Group(o) => o.id(),
        }
    }

    pub fn bounds(&self) -> kurbo::Rect {
        match self {
            SceneObject::Path(o) => o.bounds(),
            SceneObject::Rect(o) => o.bounds(),
            SceneObject::Ellipse(o) => o.bounds(),
            SceneObject::Line(o) => o.bounds(),
            SceneObject::Triangle(o) => o.bounds(),
            SceneObject::Text(o) => o.bounds(),
            SceneObject::Group(o) => o.bounds(),
        }
    }

    pub fn contains(&self, point: Point, tolerance: f64) -> bool {
        match self {
            SceneObject::Path(o) => o.contains(point, tolerance),
            SceneObject::Rect(o) => o.contains(point, tolerance),
            SceneObject::Ellipse(o) => o.contains(point, tolerance),
            SceneObject::Line(o) => o.contains(point, tolerance),
            SceneObject::Triangle(o) => o.contains(point, tolerance),
            SceneObject::Text(o) => o.contains(point, tolerance),
            SceneObject::Group(o) => o.contains(point, tolerance),
        }
    }

    pub fn to_path(&self) -> BezPath {
        match self {
            SceneObject::Path(o) => o.to_path(),
            SceneObject::Rect(o) => o.to_path(),
            SceneObject::Ellipse(o) => o.to_path(),
            SceneObject::Line(o) => o.to_path(),
            SceneObject::Triangle(o) => o.to_path(),
            SceneObject::Text(o) => o.to_path(),
            SceneObject::Group(o) => o.to_path(),
        }
    }

    pub fn style(&self) -> &ObjectStyle {
        match self {
            SceneObject::Path(o) => o.style(),
            SceneObject::Rect(o) => o.style(),
            SceneObject::Ellipse(o) => o.style(),
            SceneObject::Line(o) => o.style(),
            SceneObject::Triangle(o) => o.style(),
            SceneObject::Text(o) => o.style(),
            SceneObject::Group(o) => o.style(),
        }
    }

    pub fn style_mut(&mut self) -> &mut ObjectStyle {
        match self {
            SceneObject::Path(o) => o.style_mut(),
            SceneObject::Rect(o) => o.style_mut(),
            SceneObject::Ellipse(o) => o.style_mut(),
            SceneObject::Line(o) => o.style_mut(),
            SceneObject::Triangle(o) => o.style_mut(),
            SceneObject::Text(o) => o.style_mut(),
            SceneObject::Group(o) => o.style_mut(),
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        match self {
            SceneObject::Path(o) => o.translate(delta),
            SceneObject::Rect(o) => o.translate(delta),
            SceneObject::Ellipse(o) => o.translate(delta),
            SceneObject::Line(o) => o.translate(delta),
            SceneObject::Triangle(o) => o.translate(delta),
            SceneObject::Text(o) => o.translate(delta),
            SceneObject::Group(o) => o.translate(delta),
        }
    }

    pub fn validate(&self) -> Result<(), InvalidMutation> {
        match self {
            SceneObject::Path(o) => o.validate(),
            SceneObject::Rect(o) => o.validate(),
            SceneObject::Ellipse(o) => o.validate(),
            SceneObject::Line(o) => o.validate(),
            SceneObject::Triangle(o) => o.validate(),
            SceneObject::Text(o) => o.validate(),
            SceneObject::Group(o) => o.validate(),
        }
    }

    /// Serialized tag of this variant.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SceneObject::Path(_) => "path",
            SceneObject::Rect(_) => "rect",
            SceneObject::Ellipse(_) => "ellipse",
            SceneObject::Line(_) => "line",
            SceneObject::Triangle(_) => "triangle",
            SceneObject::Text(_) => "text",
            SceneObject::Group(_) => "group",
        }
    }

    /// Top-left corner of the object's bounds (fabric-style left/top).
    pub fn position(&self) -> Point {
        self.bounds().origin()
    }

    /// Push this object's id and every nested child id.
    pub fn collect_ids(&self, out: &mut Vec<ObjectId>) {
        out.push(self.id());
        if let SceneObject::Group(group) = self {
            for child in group.children() {
                child.collect_ids(out);
            }
        }
    }

    /// Check if this object is a group.
    pub fn is_group(&self) -> bool {
        matches!(self, SceneObject::Group(_))
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            SceneObject::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            SceneObject::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Apply a patch in place. Callers that need atomicity patch a copy and
    /// validate it before swapping it in.
    pub fn apply_patch(&mut self, patch: ObjectPatch) -> Result<(), InvalidMutation> {
        let unsupported = |patch: &ObjectPatch, kind: &'static str| {
            Err(InvalidMutation::UnsupportedPatch {
                patch: patch.name(),
                kind,
            })
        };
        match patch {
            ObjectPatch::Translate(delta) => self.translate(delta),
            ObjectPatch::StrokeColor(color) => self.style_mut().stroke_color = color,
            ObjectPatch::StrokeWidth(width) => self.style_mut().stroke_width = width,
            ObjectPatch::Fill(fill) => self.style_mut().fill_color = fill,
            ObjectPatch::Opacity(opacity) => self.style_mut().opacity = opacity,
            ObjectPatch::Frame(frame) => match self {
                SceneObject::Rect(r) => r.set_frame(frame),
                SceneObject::Triangle(t) => t.set_frame(frame),
                SceneObject::Ellipse(e) => e.set_frame(frame),
                SceneObject::Text(t) => t.position = frame.origin(),
                other => return unsupported(&ObjectPatch::Frame(frame), other.kind_name()),
            },
            ObjectPatch::Endpoints { start, end } => match self {
                SceneObject::Line(l) => {
                    l.start = start;
                    l.end = end;
                }
                other => {
                    return unsupported(&ObjectPatch::Endpoints { start, end }, other.kind_name());
                }
            },
            ObjectPatch::Content(content) => match self {
                SceneObject::Text(t) => t.content = content,
                other => return unsupported(&ObjectPatch::Content(content), other.kind_name()),
            },
        }
        Ok(())
    }
}

impl From<Freehand> for SceneObject {
    fn from(o: Freehand) -> Self {
        SceneObject::Path(o)
    }
}

impl From<Rectangle> for SceneObject {
    fn from(o: Rectangle) -> Self {
        SceneObject::Rect(o)
    }
}

impl From<Ellipse> for SceneObject {
    fn from(o: Ellipse) -> Self {
        SceneObject::Ellipse(o)
    }
}

impl From<Line> for SceneObject {
    fn from(o: Line) -> Self {
        SceneObject::Line(o)
    }
}

impl From<Triangle> for SceneObject {
    fn from(o: Triangle) -> Self {
        SceneObject::Triangle(o)
    }
}

impl From<Text> for SceneObject {
    fn from(o: Text) -> Self {
        SceneObject::Text(o)
    }
}

impl From<Group> for SceneObject {
    fn from(o: Group) -> Self {
        SceneObject::Group(o)
    }
}
