//! Isosceles triangle inscribed in its bounding box.

use super::{
    InvalidMutation, ObjectId, ObjectStyle, ObjectTrait, check_point, check_size,
    point_to_polyline_dist,
};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A triangle with its apex at the top-center of the box and its base along the bottom edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub(crate) id: ObjectId,
    /// Top-left corner of the bounding box.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Style properties.
    pub style: ObjectStyle,
}

impl Triangle {
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width,
            height,
            style: ObjectStyle::default(),
        }
    }

    pub fn with_style(mut self, style: ObjectStyle) -> Self {
        self.style = style;
        self
    }

    /// Apex, bottom-right, bottom-left.
    pub fn vertices(&self) -> [Point; 3] {
        let Point { x, y } = self.position;
        [
            Point::new(x + self.width / 2.0, y),
            Point::new(x + self.width, y + self.height),
            Point::new(x, y + self.height),
        ]
    }

    pub(crate) fn set_frame(&mut self, frame: Rect) {
        let frame = frame.abs();
        self.position = frame.origin();
        self.width = frame.width();
        self.height = frame.height();
    }
}

impl ObjectTrait for Triangle {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, (self.width, self.height))
    }

    fn contains(&self, point: Point, tolerance: f64) -> bool {
        let [a, b, c] = self.vertices();
        let d1 = (b - a).cross(point - a);
        let d2 = (c - b).cross(point - b);
        let d3 = (a - c).cross(point - c);
        let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
        let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
        if !(has_neg && has_pos) && self.width > 0.0 && self.height > 0.0 {
            return true;
        }
        let grow = tolerance + self.style.stroke_width / 2.0;
        point_to_polyline_dist(point, &[a, b, c, a]) <= grow
    }

    fn to_path(&self) -> BezPath {
        let [a, b, c] = self.vertices();
        let mut path = BezPath::new();
        path.move_to(a);
        path.line_to(b);
        path.line_to(c);
        path.close_path();
        path
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
        check_point("triangle position", self.position)?;
        check_size("triangle width", self.width)?;
        check_size("triangle height", self.height)?;
        self.style.validate()
    }
}
