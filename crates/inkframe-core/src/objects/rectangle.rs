//! Rectangle object.

use super::{
    InvalidMutation, ObjectId, ObjectStyle, ObjectTrait, check_point, check_size, rect_contains,
};
use kurbo::{BezPath, Point, Rect, RoundedRect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A rectangle with optional rounded corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ObjectId,
    /// Top-left corner position.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Corner radius (0 = sharp corners).
    #[serde(default)]
    pub corner_radius: f64,
    /// Style properties.
    pub style: ObjectStyle,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width,
            height,
            corner_radius: 0.0,
            style: ObjectStyle::default(),
        }
    }

    /// Create a rectangle from two corner points, normalizing the drag direction.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let frame = Rect::from_points(p1, p2);
        Self::new(frame.origin(), frame.width(), frame.height())
    }

    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = radius;
        self
    }

    pub fn with_style(mut self, style: ObjectStyle) -> Self {
        self.style = style;
        self
    }

    /// Get the rectangle as a kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::from_origin_size(self.position, (self.width, self.height))
    }

    pub(crate) fn set_frame(&mut self, frame: Rect) {
        let frame = frame.abs();
        self.position = frame.origin();
        self.width = frame.width();
        self.height = frame.height();
    }
}

impl ObjectTrait for Rectangle {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn contains(&self, point: Point, tolerance: f64) -> bool {
        let grow = tolerance + self.style.stroke_width / 2.0;
        rect_contains(self.as_rect().inflate(grow, grow), point)
    }

    fn to_path(&self) -> BezPath {
        if self.corner_radius > 0.0 {
            RoundedRect::from_rect(self.as_rect(), self.corner_radius).to_path(0.1)
        } else {
            self.as_rect().to_path(0.1)
        }
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
        check_point("rect position", self.position)?;
        check_size("rect width", self.width)?;
        check_size("rect height", self.height)?;
        check_size("corner radius", self.corner_radius)?;
        self.style.validate()
    }
}
