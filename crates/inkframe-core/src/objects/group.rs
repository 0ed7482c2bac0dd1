//! Group of objects moved and drawn as a unit.

use super::{InvalidMutation, ObjectId, ObjectStyle, ObjectTrait, SceneObject};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A group exclusively owns its children. Groups may nest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub(crate) id: ObjectId,
    /// Children in back-to-front order.
    pub children: Vec<SceneObject>,
    /// Only the opacity is used; it multiplies into every child.
    pub style: ObjectStyle,
}

impl Group {
    pub fn new(children: Vec<SceneObject>) -> Self {
        Self {
            id: Uuid::new_v4(),
            children,
            style: ObjectStyle {
                stroke_width: 0.0,
                ..ObjectStyle::default()
            },
        }
    }

    pub fn children(&self) -> &[SceneObject] {
        &self.children
    }

    /// Find a descendant by id.
    pub fn find(&self, id: ObjectId) -> Option<&SceneObject> {
        for child in &self.children {
            if child.id() == id {
                return Some(child);
            }
            if let SceneObject::Group(group) = child {
                if let Some(found) = group.find(id) {
                    return Some(found);
                }
            }
        }
        None
    }
}

impl ObjectTrait for Group {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let mut iter = self.children.iter();
        let Some(first) = iter.next() else {
            return Rect::ZERO;
        };
        iter.fold(first.bounds(), |acc, child| acc.union(child.bounds()))
    }

    fn contains(&self, point: Point, tolerance: f64) -> bool {
        self.children
            .iter()
            .any(|child| child.contains(point, tolerance))
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for child in &self.children {
            path.extend(child.to_path().elements().iter().copied());
        }
        path
    }

    fn style(&self) -> &ObjectStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ObjectStyle {
        &mut self.style
    }

    fn translate(&mut self, delta: Vec2) {
        for child in &mut self.children {
            child.translate(delta);
        }
    }

    fn validate(&self) -> Result<(), InvalidMutation> {
        if self.children.is_empty() {
            return Err(InvalidMutation::Empty("group children"));
        }
        for child in &self.children {
            child.validate()?;
        }
        self.style.validate()
    }
}
