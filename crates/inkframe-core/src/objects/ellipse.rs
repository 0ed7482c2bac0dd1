//! Ellipse object.

use super::{InvalidMutation, ObjectId, ObjectStyle, ObjectTrait, check_point, check_size};
use kurbo::{BezPath, Ellipse as KurboEllipse, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An axis-aligned ellipse positioned by the top-left of its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub(crate) id: ObjectId,
    /// Top-left corner of the bounding box.
    pub position: Point,
    /// Horizontal radius.
    pub radius_x: f64,
    /// Vertical radius.
    pub radius_y: f64,
    /// Style properties.
    pub style: ObjectStyle,
}

impl Ellipse {
    pub fn new(position: Point, radius_x: f64, radius_y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            radius_x,
            radius_y,
            style: ObjectStyle::default(),
        }
    }

    /// Create an ellipse inscribed in a bounding rectangle.
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.origin(), rect.width() / 2.0, rect.height() / 2.0)
    }

    pub fn with_style(mut self, style: ObjectStyle) -> Self {
        self.style = style;
        self
    }

    pub fn center(&self) -> Point {
        self.position + Vec2::new(self.radius_x, self.radius_y)
    }

    /// Get as a kurbo Ellipse.
    pub fn as_kurbo(&self) -> KurboEllipse {
        KurboEllipse::new(self.center(), (self.radius_x, self.radius_y), 0.0)
    }

    pub(crate) fn set_frame(&mut self, frame: Rect) {
        let frame = frame.abs();
        self.position = frame.origin();
        self.radius_x = frame.width() / 2.0;
        self.radius_y = frame.height() / 2.0;
    }
}

impl ObjectTrait for Ellipse {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, (self.radius_x * 2.0, self.radius_y * 2.0))
    }

    fn contains(&self, point: Point, tolerance: f64) -> bool {
        let grow = tolerance + self.style.stroke_width / 2.0;
        let rx = self.radius_x + grow;
        let ry = self.radius_y + grow;
        if rx <= f64::EPSILON || ry <= f64::EPSILON {
            return false;
        }
        let center = self.center();
        let dx = (point.x - center.x) / rx;
        let dy = (point.y - center.y) / ry;
        dx * dx + dy * dy <= 1.0
    }

    fn to_path(&self) -> BezPath {
        self.as_kurbo().to_path(0.1)
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
        check_point("ellipse position", self.position)?;
        check_size("ellipse radius", self.radius_x)?;
        check_size("ellipse radius", self.radius_y)?;
        self.style.validate()
    }
}
